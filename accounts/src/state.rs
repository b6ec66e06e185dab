//! Accounts state: the stored profile and the authentication flow machine.
//!
//! The auth flow is an explicit finite-state machine with a generation
//! counter. Every flow start bumps the generation; terminal actions carry
//! the generation they belong to and the reducer drops stale ones. This
//! replaces boolean submitted/complete markers and their edge-detection
//! fragility: an abandoned flow's in-flight results can never mutate state.

use crate::model::{PublicUser, ThirdPartyProvider, UserId};
use fitsync_core::error::DataError;
use fitsync_core::status::RequestStatus;
use fitsync_macros::State;
use serde::{Deserialize, Serialize};

/// How the current authentication flow was started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthMode {
    /// Email/password registration; carries the chosen display name until
    /// the profile record is created.
    SignUp {
        /// Display name for the fresh profile.
        display_name: String,
    },
    /// Email/password login.
    SignIn,
    /// Third-party provider login.
    ThirdParty {
        /// The provider used.
        provider: ThirdPartyProvider,
    },
}

/// Phase of the authentication workflow.
///
/// Transitions:
///
/// ```text
/// Idle -> Authenticating -> SavingProfile -> Complete
///                                         -> AwaitingVerification -> Complete
/// any phase -> Failed (terminal error) or Idle (cancel)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum AuthPhase {
    /// No flow in progress.
    #[default]
    Idle,
    /// Credentials or provider handshake submitted to the gateway.
    Authenticating {
        /// How the flow was started.
        mode: AuthMode,
    },
    /// Creating or refreshing the stored profile record.
    SavingProfile,
    /// Polling the gateway until the email address is verified.
    AwaitingVerification {
        /// The account being verified.
        user_id: UserId,
    },
    /// The workflow finished; the profile is in `current_user`.
    Complete,
    /// The workflow failed terminally.
    Failed {
        /// Normalized failure.
        error: DataError,
    },
}

/// The authentication flow machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthFlow {
    /// Current phase.
    pub phase: AuthPhase,
    /// Flow generation; terminal actions from older generations are stale.
    pub generation: u64,
}

impl AuthFlow {
    /// Start a new flow, invalidating any in-flight results of the old one.
    ///
    /// Returns the new generation for the flow's effects to carry.
    pub fn begin(&mut self, mode: AuthMode) -> u64 {
        self.generation += 1;
        self.phase = AuthPhase::Authenticating { mode };
        self.generation
    }

    /// Tear the flow down; in-flight results become stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.phase = AuthPhase::Idle;
    }

    /// Whether a carried generation belongs to a superseded flow.
    #[must_use]
    pub const fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation
    }

    /// Whether a flow is between start and terminal phase.
    #[must_use]
    pub const fn in_progress(&self) -> bool {
        matches!(
            self.phase,
            AuthPhase::Authenticating { .. }
                | AuthPhase::SavingProfile
                | AuthPhase::AwaitingVerification { .. }
        )
    }
}

/// Root state for the accounts domain.
#[derive(State, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountsState {
    /// The signed-in user's stored profile, once loaded or established.
    pub current_user: Option<PublicUser>,
    /// The authentication workflow machine.
    pub auth: AuthFlow,
    /// Status of profile loads.
    pub load: RequestStatus,
    /// Status of profile updates.
    pub save: RequestStatus,
    /// Status of password reset requests.
    pub reset: RequestStatus,
    /// Status of logout.
    pub logout: RequestStatus,
    /// Version counter for selector memoization.
    #[epoch]
    pub epoch: u64,
}

impl AccountsState {
    /// Reset the slice to its initial value.
    ///
    /// The generation and epoch keep counting so stale effect results and
    /// memoized selectors stay correct across the reset.
    pub fn purge(&mut self) {
        let generation = self.auth.generation;
        let epoch = self.epoch;
        *self = Self::default();
        self.auth.generation = generation + 1;
        self.epoch = epoch;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_bumps_generation_and_phase() {
        let mut flow = AuthFlow::default();
        let generation = flow.begin(AuthMode::SignIn);
        assert_eq!(generation, 1);
        assert!(flow.in_progress());
        assert!(!flow.is_stale(generation));
    }

    #[test]
    fn cancel_invalidates_in_flight_results() {
        let mut flow = AuthFlow::default();
        let generation = flow.begin(AuthMode::SignIn);
        flow.cancel();
        assert!(flow.is_stale(generation));
        assert_eq!(flow.phase, AuthPhase::Idle);
    }

    #[test]
    fn purge_keeps_generation_monotone() {
        let mut state = AccountsState::default();
        let generation = state.auth.begin(AuthMode::SignIn);
        state.purge();
        assert!(state.auth.is_stale(generation));
        assert!(state.current_user.is_none());
        assert_eq!(state.auth.phase, AuthPhase::Idle);
    }
}
