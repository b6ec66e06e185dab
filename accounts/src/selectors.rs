//! Memoized read projections over [`AccountsState`].

use crate::model::PublicUser;
use crate::state::{AccountsState, AuthPhase};
use fitsync_core::error::DataError;
use fitsync_core::selector::Selector;

/// The signed-in user's profile, if established.
#[must_use]
pub fn current_user() -> Selector<AccountsState, Option<PublicUser>> {
    Selector::new(AccountsState::epoch, |s| s.current_user.clone())
}

/// Whether a signed-in, verified user is present.
#[must_use]
pub fn is_signed_in() -> Selector<AccountsState, bool> {
    Selector::new(AccountsState::epoch, |s| s.current_user.is_some())
}

/// The current auth workflow phase.
#[must_use]
pub fn auth_phase() -> Selector<AccountsState, AuthPhase> {
    Selector::new(AccountsState::epoch, |s| s.auth.phase.clone())
}

/// Whether an auth workflow is between start and terminal phase.
#[must_use]
pub fn auth_in_progress() -> Selector<AccountsState, bool> {
    Selector::new(AccountsState::epoch, |s| s.auth.in_progress())
}

/// The terminal error of a failed auth workflow, if any.
#[must_use]
pub fn auth_error() -> Selector<AccountsState, Option<DataError>> {
    Selector::new(AccountsState::epoch, |s| match &s.auth.phase {
        AuthPhase::Failed { error } => Some(error.clone()),
        _ => None,
    })
}

/// Whether a profile load is in flight.
#[must_use]
pub fn profile_load_processing() -> Selector<AccountsState, bool> {
    Selector::new(AccountsState::epoch, |s| s.load.processing())
}

/// Whether a profile update is in flight.
#[must_use]
pub fn profile_save_processing() -> Selector<AccountsState, bool> {
    Selector::new(AccountsState::epoch, |s| s.save.processing())
}

/// The last profile update failure, if any.
#[must_use]
pub fn profile_save_error() -> Selector<AccountsState, Option<DataError>> {
    Selector::new(AccountsState::epoch, |s| s.save.error().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AuthMode;

    #[test]
    fn auth_error_projects_only_failed_phase() {
        let mut state = AccountsState::default();
        let errors = auth_error();
        assert!(errors.select(&state).is_none());

        state.auth.begin(AuthMode::SignIn);
        state.auth.phase = AuthPhase::Failed {
            error: DataError::unauthenticated("bad credentials"),
        };
        state.touch();
        assert!(errors.select(&state).is_some());
    }

    #[test]
    fn in_progress_tracks_phases() {
        let mut state = AccountsState::default();
        let in_progress = auth_in_progress();
        assert!(!in_progress.select(&state));

        state.auth.begin(AuthMode::SignIn);
        state.touch();
        assert!(in_progress.select(&state));

        state.auth.phase = AuthPhase::Complete;
        state.touch();
        assert!(!in_progress.select(&state));
    }
}
