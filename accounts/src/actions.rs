//! Account actions.
//!
//! Workflow actions carry the flow generation they belong to; the reducer
//! drops terminal actions from superseded flows, which is what makes
//! `CancelFlow` a real teardown rather than a UI convention.

use crate::model::{AuthUser, PublicUser, ThirdPartyProvider, UserId};
use fitsync_core::entity::EntityUpdate;
use fitsync_core::error::DataError;
use fitsync_macros::Action;
use serde::{Deserialize, Serialize};

/// Partial update addressed to the stored profile.
pub type UserUpdate = EntityUpdate<PublicUser>;

/// Actions on the accounts domain.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AccountsAction {
    // ═══════════════════════════════════════════════════════════════════
    // Authentication workflows
    // ═══════════════════════════════════════════════════════════════════
    /// Start the registration workflow.
    #[request]
    SignUpRequested {
        /// Email address.
        email: String,
        /// Password.
        password: String,
        /// Display name for the fresh profile.
        display_name: String,
    },

    /// Start the login workflow.
    #[request]
    SignInRequested {
        /// Email address.
        email: String,
        /// Password.
        password: String,
    },

    /// Start the third-party login workflow.
    #[request]
    ThirdPartyRequested {
        /// The provider to use.
        provider: ThirdPartyProvider,
    },

    /// The gateway authenticated the principal (workflow step 1).
    #[completion]
    Authenticated {
        /// Flow generation this result belongs to.
        generation: u64,
        /// The authenticated principal.
        user: AuthUser,
    },

    /// The gateway rejected the attempt.
    #[failure]
    AuthFailed {
        /// Flow generation this result belongs to.
        generation: u64,
        /// Normalized failure.
        error: DataError,
    },

    /// The profile record was created or refreshed (workflow step 2).
    #[completion]
    ProfileSaved {
        /// Flow generation this result belongs to.
        generation: u64,
        /// The stored profile.
        user: PublicUser,
    },

    /// Creating or refreshing the profile record failed mid-workflow.
    #[failure]
    ProfileSaveFailed {
        /// Flow generation this result belongs to.
        generation: u64,
        /// Normalized failure.
        error: DataError,
    },

    /// Poll the gateway for email verification (self-dispatched on a delay).
    #[request]
    VerificationPollRequested {
        /// Flow generation this poll belongs to.
        generation: u64,
    },

    /// One verification poll finished.
    #[completion]
    VerificationPolled {
        /// Flow generation this result belongs to.
        generation: u64,
        /// Whether the email address is now verified.
        verified: bool,
    },

    /// A verification poll failed.
    #[failure]
    VerificationPollFailed {
        /// Flow generation this result belongs to.
        generation: u64,
        /// Normalized failure.
        error: DataError,
    },

    /// Tear down the running workflow; in-flight results become stale.
    CancelFlow,

    // ═══════════════════════════════════════════════════════════════════
    // Session management
    // ═══════════════════════════════════════════════════════════════════
    /// End the session.
    #[request]
    LogoutRequested,
    /// Session ended; the slice resets.
    #[completion]
    LogoutCompleted,
    /// Logout failed.
    #[failure]
    LogoutFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Send a password reset email.
    #[request]
    ResetPasswordRequested {
        /// Email address.
        email: String,
    },
    /// Reset email sent.
    #[completion]
    ResetPasswordCompleted,
    /// Reset email failed.
    #[failure]
    ResetPasswordFailed {
        /// Normalized failure.
        error: DataError,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Profile record, outside the auth workflow
    // ═══════════════════════════════════════════════════════════════════
    /// Load the stored profile.
    #[request]
    ProfileLoadRequested {
        /// Which account.
        id: UserId,
    },
    /// Profile loaded.
    #[completion]
    ProfileLoadCompleted {
        /// The stored profile.
        user: PublicUser,
    },
    /// Profile load failed.
    #[failure]
    ProfileLoadFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Update the stored profile (account settings).
    #[request]
    ProfileUpdateRequested {
        /// The partial update.
        update: UserUpdate,
    },
    /// Update applied remotely; merged locally.
    #[completion]
    ProfileUpdateCompleted {
        /// The applied partial, echoed by the service.
        update: UserUpdate,
    },
    /// Profile update failed.
    #[failure]
    ProfileUpdateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Reset the slice to its initial value.
    Purged,
}
