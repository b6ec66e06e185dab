//! Accounts reducer.
//!
//! Drives the authentication workflows as an explicit state machine:
//! authenticate, create-or-refresh the profile record, then poll for email
//! verification when needed. Terminal actions carry their flow generation;
//! anything from a superseded flow is dropped, so cancellation and restart
//! can never interleave with stragglers.
//!
//! # Failure policy
//!
//! - Gateway rejection before anything was established: flow fails, the
//!   user is notified.
//! - Failure after authentication succeeded (profile save, verification
//!   poll): flow fails, a corrective logout tears the half-established
//!   identity down, then the user is notified.
//! - Stored data is never rolled back; failures only settle status flags.

use crate::actions::AccountsAction;
use crate::environment::AccountsEnvironment;
use crate::keys;
use crate::model::{AuthUser, PublicUser, UserChanges, default_display_name};
use crate::providers::AuthGateway;
use crate::state::{AccountsState, AuthMode, AuthPhase};
use fitsync_core::effect::Effect;
use fitsync_core::entity::{Entity, EntityUpdate};
use fitsync_core::environment::Notifier;
use fitsync_core::reducer::Reducer;
use fitsync_core::service::EntityData;
use fitsync_core::{SmallVec, future_call, serial_call, smallvec, supersede_call};
use std::sync::Arc;
use std::time::Duration;

/// Accounts reducer.
#[derive(Debug, Clone)]
pub struct AccountsReducer<G, U, N> {
    /// Interval between email-verification polls.
    poll_interval: Duration,
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(G, U, N)>,
}

impl<G, U, N> AccountsReducer<G, U, N> {
    /// Create a new accounts reducer with the default poll interval (5s).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Create a reducer with a custom verification poll interval.
    #[must_use]
    pub const fn with_poll_interval(interval: Duration) -> Self {
        Self {
            poll_interval: interval,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<G, U, N> Default for AccountsReducer<G, U, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G, U, N> Reducer for AccountsReducer<G, U, N>
where
    G: AuthGateway,
    U: EntityData<Entity = PublicUser>,
    N: Notifier + Clone + 'static,
{
    type State = AccountsState;
    type Action = AccountsAction;
    type Environment = AccountsEnvironment<G, U, N>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Workflow step 1: authenticate
            // ═══════════════════════════════════════════════════════════════
            AccountsAction::SignUpRequested { email, password, display_name } => {
                let generation = state.auth.begin(AuthMode::SignUp { display_name });
                state.touch();

                smallvec![future_call! {
                    call: {
                        let gateway = env.gateway.clone();
                        async move { gateway.sign_up(&email, &password).await }
                    },
                    on_success: |user| Some(AccountsAction::Authenticated { generation, user }),
                    on_failure: |error| Some(AccountsAction::AuthFailed { generation, error }),
                }]
            },

            AccountsAction::SignInRequested { email, password } => {
                let generation = state.auth.begin(AuthMode::SignIn);
                state.touch();

                smallvec![future_call! {
                    call: {
                        let gateway = env.gateway.clone();
                        async move { gateway.sign_in(&email, &password).await }
                    },
                    on_success: |user| Some(AccountsAction::Authenticated { generation, user }),
                    on_failure: |error| Some(AccountsAction::AuthFailed { generation, error }),
                }]
            },

            AccountsAction::ThirdPartyRequested { provider } => {
                let generation = state.auth.begin(AuthMode::ThirdParty { provider });
                state.touch();

                smallvec![future_call! {
                    call: {
                        let gateway = env.gateway.clone();
                        async move { gateway.third_party(provider).await }
                    },
                    on_success: |user| Some(AccountsAction::Authenticated { generation, user }),
                    on_failure: |error| Some(AccountsAction::AuthFailed { generation, error }),
                }]
            },

            // ═══════════════════════════════════════════════════════════════
            // Workflow step 2: create-or-refresh the profile record
            // ═══════════════════════════════════════════════════════════════
            AccountsAction::Authenticated { generation, user } => {
                if state.auth.is_stale(generation) {
                    tracing::debug!(generation, "Dropping stale authentication result");
                    return SmallVec::new();
                }
                let AuthPhase::Authenticating { mode } = &state.auth.phase else {
                    tracing::warn!("Authenticated outside an authenticating flow");
                    return SmallVec::new();
                };

                let display_name = match mode {
                    AuthMode::SignUp { display_name } => display_name.clone(),
                    AuthMode::SignIn | AuthMode::ThirdParty { .. } => default_display_name(&user),
                };
                state.auth.phase = AuthPhase::SavingProfile;
                state.touch();

                smallvec![Self::save_profile_effect(env, generation, user, display_name)]
            },

            AccountsAction::ProfileSaved { generation, user } => {
                if state.auth.is_stale(generation) {
                    tracing::debug!(generation, "Dropping stale profile save");
                    return SmallVec::new();
                }

                state.current_user = Some(user.clone());
                if user.email_verified {
                    state.auth.phase = AuthPhase::Complete;
                    state.touch();
                    SmallVec::new()
                } else {
                    state.auth.phase = AuthPhase::AwaitingVerification { user_id: user.id };
                    state.touch();
                    smallvec![Effect::Delay {
                        duration: self.poll_interval,
                        action: Box::new(AccountsAction::VerificationPollRequested { generation }),
                    }]
                }
            },

            // ═══════════════════════════════════════════════════════════════
            // Workflow step 3: poll until the email address is verified
            // ═══════════════════════════════════════════════════════════════
            AccountsAction::VerificationPollRequested { generation } => {
                if state.auth.is_stale(generation)
                    || !matches!(state.auth.phase, AuthPhase::AwaitingVerification { .. })
                {
                    return SmallVec::new();
                }

                smallvec![future_call! {
                    call: {
                        let gateway = env.gateway.clone();
                        async move { gateway.reload().await }
                    },
                    on_success: |user| Some(AccountsAction::VerificationPolled {
                        generation,
                        verified: user.email_verified,
                    }),
                    on_failure: |error| Some(AccountsAction::VerificationPollFailed {
                        generation,
                        error,
                    }),
                }]
            },

            AccountsAction::VerificationPolled { generation, verified } => {
                if state.auth.is_stale(generation) {
                    return SmallVec::new();
                }

                if verified {
                    if let Some(user) = state.current_user.as_mut() {
                        user.email_verified = true;
                    }
                    state.auth.phase = AuthPhase::Complete;
                    state.touch();
                    SmallVec::new()
                } else {
                    smallvec![Effect::Delay {
                        duration: self.poll_interval,
                        action: Box::new(AccountsAction::VerificationPollRequested { generation }),
                    }]
                }
            },

            // ═══════════════════════════════════════════════════════════════
            // Workflow failures
            // ═══════════════════════════════════════════════════════════════
            AccountsAction::AuthFailed { generation, error } => {
                if state.auth.is_stale(generation) {
                    return SmallVec::new();
                }
                tracing::warn!(%error, "Authentication failed");

                let notifier = env.notifier.clone();
                let message = format!("Authentication failed: {error}");
                state.auth.phase = AuthPhase::Failed { error };
                state.touch();

                smallvec![Effect::future(async move {
                    notifier.notify(&message);
                    None
                })]
            },

            AccountsAction::ProfileSaveFailed { generation, error }
            | AccountsAction::VerificationPollFailed { generation, error } => {
                if state.auth.is_stale(generation) {
                    return SmallVec::new();
                }
                tracing::warn!(%error, "Auth workflow failed past authentication");

                // The gateway session exists but the account is only half
                // established; tear it down before surfacing the failure.
                let gateway = env.gateway.clone();
                let notifier = env.notifier.clone();
                let message = format!("Account setup failed: {error}");
                state.auth.phase = AuthPhase::Failed { error };
                state.touch();

                smallvec![Effect::future(async move {
                    if let Err(logout_error) = gateway.logout().await {
                        tracing::warn!(%logout_error, "Corrective logout failed");
                    }
                    notifier.notify(&message);
                    None
                })]
            },

            AccountsAction::CancelFlow => {
                state.auth.cancel();
                state.touch();
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Session management
            // ═══════════════════════════════════════════════════════════════
            AccountsAction::LogoutRequested => {
                state.logout.start();
                state.touch();

                smallvec![future_call! {
                    call: {
                        let gateway = env.gateway.clone();
                        async move { gateway.logout().await }
                    },
                    on_success: |_done| Some(AccountsAction::LogoutCompleted),
                    on_failure: |error| Some(AccountsAction::LogoutFailed { error }),
                }]
            },

            AccountsAction::LogoutCompleted => {
                // Logging out discards the whole slice; training slices are
                // purged by the embedding application.
                state.purge();
                SmallVec::new()
            },

            AccountsAction::LogoutFailed { error } => {
                state.logout.fail(error);
                state.touch();
                SmallVec::new()
            },

            AccountsAction::ResetPasswordRequested { email } => {
                state.reset.start();
                state.touch();

                smallvec![future_call! {
                    call: {
                        let gateway = env.gateway.clone();
                        async move { gateway.reset_password(&email).await }
                    },
                    on_success: |_done| Some(AccountsAction::ResetPasswordCompleted),
                    on_failure: |error| Some(AccountsAction::ResetPasswordFailed { error }),
                }]
            },

            AccountsAction::ResetPasswordCompleted => {
                state.reset.complete();
                state.touch();
                SmallVec::new()
            },

            AccountsAction::ResetPasswordFailed { error } => {
                state.reset.fail(error);
                state.touch();
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Profile record, outside the auth workflow
            // ═══════════════════════════════════════════════════════════════
            AccountsAction::ProfileLoadRequested { id } => {
                state.load.start();
                state.touch();

                smallvec![supersede_call! {
                    key: keys::USER_FETCH,
                    call: {
                        let users = env.users.clone();
                        async move { users.fetch_one(id).await }
                    },
                    on_success: |user| Some(AccountsAction::ProfileLoadCompleted { user }),
                    on_failure: |error| Some(AccountsAction::ProfileLoadFailed { error }),
                }]
            },

            AccountsAction::ProfileLoadCompleted { user } => {
                state.current_user = Some(user);
                state.load.complete();
                state.touch();
                SmallVec::new()
            },

            AccountsAction::ProfileLoadFailed { error } => {
                state.load.fail(error);
                state.touch();
                SmallVec::new()
            },

            AccountsAction::ProfileUpdateRequested { update } => {
                state.save.start();
                state.touch();

                smallvec![serial_call! {
                    key: keys::USER_WRITE,
                    call: {
                        let users = env.users.clone();
                        async move { users.update(update).await }
                    },
                    on_success: |update| Some(AccountsAction::ProfileUpdateCompleted { update }),
                    on_failure: |error| Some(AccountsAction::ProfileUpdateFailed { error }),
                }]
            },

            AccountsAction::ProfileUpdateCompleted { update } => {
                if let Some(user) = state.current_user.as_mut() {
                    if user.id == update.id {
                        user.apply(&update.changes);
                    }
                }
                state.save.complete();
                state.touch();
                SmallVec::new()
            },

            AccountsAction::ProfileUpdateFailed { error } => {
                state.save.fail(error);
                state.touch();
                SmallVec::new()
            },

            AccountsAction::Purged => {
                state.purge();
                SmallVec::new()
            },
        }
    }
}

impl<G, U, N> AccountsReducer<G, U, N>
where
    G: AuthGateway,
    U: EntityData<Entity = PublicUser>,
    N: Notifier + Clone + 'static,
{
    /// Create-or-refresh effect for the profile record.
    ///
    /// An existing record is refreshed (verification state, avatar); a
    /// missing one is created from the authenticated principal.
    fn save_profile_effect(
        env: &AccountsEnvironment<G, U, N>,
        generation: u64,
        user: AuthUser,
        display_name: String,
    ) -> Effect<AccountsAction> {
        let users = env.users.clone();
        let clock = Arc::clone(&env.clock);

        let profile = PublicUser {
            id: user.id,
            email: user.email,
            display_name,
            avatar_url: user.avatar_url,
            is_admin: false,
            email_verified: user.email_verified,
            created_at: clock.now(),
            updated_at: clock.now(),
        };

        Effect::serial(keys::USER_WRITE, async move {
            match users.fetch_one(profile.id.clone()).await {
                Ok(mut existing) => {
                    let changes = UserChanges {
                        display_name: None,
                        avatar_url: profile.avatar_url.clone(),
                        email_verified: Some(profile.email_verified),
                        updated_at: Some(clock.now()),
                    };
                    match users.update(EntityUpdate::new(existing.id.clone(), changes)).await {
                        Ok(update) => {
                            existing.apply(&update.changes);
                            Some(AccountsAction::ProfileSaved { generation, user: existing })
                        },
                        Err(error) => {
                            Some(AccountsAction::ProfileSaveFailed { generation, error })
                        },
                    }
                },
                Err(error) if error.is_not_found() => match users.create(profile).await {
                    Ok(user) => Some(AccountsAction::ProfileSaved { generation, user }),
                    Err(error) => Some(AccountsAction::ProfileSaveFailed { generation, error }),
                },
                Err(error) => Some(AccountsAction::ProfileSaveFailed { generation, error }),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockAuthGateway, MockUserData, test_principal};
    use crate::model::UserId;
    use fitsync_core::environment::LogNotifier;
    use fitsync_core::error::DataError;
    use fitsync_testing::{ReducerTest, assertions, test_clock};

    type TestReducer = AccountsReducer<MockAuthGateway, MockUserData, LogNotifier>;
    type TestEnv = AccountsEnvironment<MockAuthGateway, MockUserData, LogNotifier>;

    fn test_env() -> TestEnv {
        AccountsEnvironment::new(
            MockAuthGateway::new(test_principal("u-1", "casey@example.com")),
            MockUserData::new(),
            LogNotifier,
            Arc::new(test_clock()),
        )
    }

    fn profile(verified: bool) -> PublicUser {
        let now = chrono::Utc::now();
        PublicUser {
            id: UserId::new("u-1"),
            email: "casey@example.com".to_string(),
            display_name: "casey".to_string(),
            avatar_url: None,
            is_admin: false,
            email_verified: verified,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sign_in_requested_begins_a_new_flow() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(AccountsState::default())
            .when_action(AccountsAction::SignInRequested {
                email: "casey@example.com".to_string(),
                password: "pw".to_string(),
            })
            .then_state(|state| {
                assert!(matches!(state.auth.phase, AuthPhase::Authenticating { .. }));
                assert_eq!(state.auth.generation, 1);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn stale_authentication_result_is_dropped() {
        let mut state = AccountsState::default();
        let old_generation = state.auth.begin(AuthMode::SignIn);
        state.auth.cancel();

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AccountsAction::Authenticated {
                generation: old_generation,
                user: test_principal("u-1", "casey@example.com"),
            })
            .then_state(|state| {
                assert_eq!(state.auth.phase, AuthPhase::Idle);
                assert!(state.current_user.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn authenticated_moves_to_saving_profile() {
        let mut state = AccountsState::default();
        let generation = state.auth.begin(AuthMode::SignUp {
            display_name: "Casey".to_string(),
        });

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AccountsAction::Authenticated {
                generation,
                user: test_principal("u-1", "casey@example.com"),
            })
            .then_state(|state| {
                assert_eq!(state.auth.phase, AuthPhase::SavingProfile);
            })
            .then_effects(|effects| {
                assertions::assert_has_serial_effect_for(effects, keys::USER_WRITE);
            })
            .run();
    }

    #[test]
    fn verified_profile_completes_the_flow() {
        let mut state = AccountsState::default();
        let generation = state.auth.begin(AuthMode::SignIn);
        state.auth.phase = AuthPhase::SavingProfile;

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AccountsAction::ProfileSaved { generation, user: profile(true) })
            .then_state(|state| {
                assert_eq!(state.auth.phase, AuthPhase::Complete);
                assert!(state.current_user.as_ref().is_some_and(|u| u.email_verified));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn unverified_profile_schedules_a_verification_poll() {
        let mut state = AccountsState::default();
        let generation = state.auth.begin(AuthMode::SignIn);
        state.auth.phase = AuthPhase::SavingProfile;

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AccountsAction::ProfileSaved { generation, user: profile(false) })
            .then_state(|state| {
                assert!(matches!(state.auth.phase, AuthPhase::AwaitingVerification { .. }));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assert!(matches!(effects[0], Effect::Delay { .. }));
            })
            .run();
    }

    #[test]
    fn profile_save_failure_fails_flow_with_corrective_effect() {
        let mut state = AccountsState::default();
        let generation = state.auth.begin(AuthMode::SignIn);
        state.auth.phase = AuthPhase::SavingProfile;

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AccountsAction::ProfileSaveFailed {
                generation,
                error: DataError::permission_denied("profile writes disabled"),
            })
            .then_state(|state| {
                assert!(matches!(state.auth.phase, AuthPhase::Failed { .. }));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn logout_completed_purges_the_slice() {
        let mut state = AccountsState::default();
        state.current_user = Some(profile(true));
        state.auth.phase = AuthPhase::Complete;

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AccountsAction::LogoutCompleted)
            .then_state(|state| {
                assert!(state.current_user.is_none());
                assert_eq!(state.auth.phase, AuthPhase::Idle);
                assert!(state.logout.is_settled());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn profile_update_completed_applies_matching_changes() {
        let mut state = AccountsState::default();
        state.current_user = Some(profile(true));

        let update = EntityUpdate::new(
            UserId::new("u-1"),
            UserChanges {
                display_name: Some("Casey R".to_string()),
                ..UserChanges::default()
            },
        );

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AccountsAction::ProfileUpdateCompleted { update })
            .then_state(|state| {
                let user = state.current_user.as_ref().unwrap();
                assert_eq!(user.display_name, "Casey R");
                assert!(state.save.is_settled());
            })
            .run();
    }
}
