//! Training-session reducer.
//!
//! Handles the catalog fetches, the serialized mutations, and the rating
//! operation - the only path that may write rating statistics.
//!
//! # Status discipline
//!
//! Every `Requested` arm flips the matching status to processing and touches
//! the slice without mutating the collection; the paired terminal arm merges
//! the payload and settles the status. Failures leave prior data intact.

use crate::actions::{SessionAction, TrainingAction};
use crate::environment::TrainingEnvironment;
use crate::keys;
use crate::model::{
    PlanSessionFragment, SessionChanges, TrainingPlan, TrainingRecord, TrainingSession,
};
use crate::state::TrainingState;
use fitsync_core::effect::Effect;
use fitsync_core::entity::EntityUpdate;
use fitsync_core::environment::Notifier;
use fitsync_core::error::DataError;
use fitsync_core::reducer::Reducer;
use fitsync_core::service::EntityData;
use fitsync_core::{SmallVec, serial_call, smallvec, supersede_call};

/// Training-session reducer.
#[derive(Debug, Clone)]
pub struct SessionsReducer<SS, PS, FS, RS, N> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(SS, PS, FS, RS, N)>,
}

impl<SS, PS, FS, RS, N> SessionsReducer<SS, PS, FS, RS, N> {
    /// Create a new sessions reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<SS, PS, FS, RS, N> Default for SessionsReducer<SS, PS, FS, RS, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<SS, PS, FS, RS, N> Reducer for SessionsReducer<SS, PS, FS, RS, N>
where
    SS: EntityData<Entity = TrainingSession>,
    PS: EntityData<Entity = TrainingPlan>,
    FS: EntityData<Entity = PlanSessionFragment>,
    RS: EntityData<Entity = TrainingRecord>,
    N: Notifier + Clone + 'static,
{
    type State = TrainingState;
    type Action = TrainingAction;
    type Environment = TrainingEnvironment<SS, PS, FS, RS, N>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let TrainingAction::Session(action) = action else {
            return SmallVec::new();
        };

        match action {
            // ═══════════════════════════════════════════════════════════════
            // Fetch (latest-wins)
            // ═══════════════════════════════════════════════════════════════
            SessionAction::FetchAllRequested => {
                state.sessions.fetch.start();
                state.sessions.touch();

                smallvec![supersede_call! {
                    key: keys::SESSION_FETCH_ALL,
                    call: {
                        let sessions = env.sessions.clone();
                        async move { sessions.fetch_all().await }
                    },
                    on_success: |sessions| Some(TrainingAction::Session(
                        SessionAction::FetchAllCompleted { sessions }
                    )),
                    on_failure: |error| Some(TrainingAction::Session(
                        SessionAction::FetchAllFailed { error }
                    )),
                }]
            },

            SessionAction::FetchAllCompleted { sessions } => {
                state.sessions.records.replace_all(sessions);
                state.sessions.fetched = true;
                state.sessions.fetch.complete();
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::FetchAllFailed { error } => {
                tracing::warn!(%error, "Session catalog fetch failed");
                state.sessions.fetch.fail(error);
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::FetchOneRequested { id } => {
                state.sessions.fetch.start();
                state.sessions.touch();

                smallvec![supersede_call! {
                    key: keys::SESSION_FETCH_ONE,
                    call: {
                        let sessions = env.sessions.clone();
                        async move { sessions.fetch_one(id).await }
                    },
                    on_success: |session| Some(TrainingAction::Session(
                        SessionAction::FetchOneCompleted { session }
                    )),
                    on_failure: |error| Some(TrainingAction::Session(
                        SessionAction::FetchOneFailed { error }
                    )),
                }]
            },

            SessionAction::FetchOneCompleted { session } => {
                state.sessions.records.upsert_one(session);
                state.sessions.fetch.complete();
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::FetchOneFailed { error } => {
                state.sessions.fetch.fail(error);
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::FetchManyRequested { query } => {
                state.sessions.fetch.start();
                state.sessions.touch();

                smallvec![supersede_call! {
                    key: keys::SESSION_FETCH_MANY,
                    call: {
                        let sessions = env.sessions.clone();
                        async move { sessions.fetch_many(query).await }
                    },
                    on_success: |sessions| Some(TrainingAction::Session(
                        SessionAction::FetchManyCompleted { sessions }
                    )),
                    on_failure: |error| Some(TrainingAction::Session(
                        SessionAction::FetchManyFailed { error }
                    )),
                }]
            },

            SessionAction::FetchManyCompleted { sessions } => {
                // Query results merge; they are a window, not the catalog.
                state.sessions.records.upsert_many(sessions);
                state.sessions.fetch.complete();
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::FetchManyFailed { error } => {
                state.sessions.fetch.fail(error);
                state.sessions.touch();
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Mutations (serialized)
            // ═══════════════════════════════════════════════════════════════
            SessionAction::CreateRequested { session } => {
                state.sessions.create.start();
                state.sessions.touch();

                smallvec![serial_call! {
                    key: keys::SESSION_WRITE,
                    call: {
                        let sessions = env.sessions.clone();
                        async move { sessions.create(session).await }
                    },
                    on_success: |session| Some(TrainingAction::Session(
                        SessionAction::CreateCompleted { session }
                    )),
                    on_failure: |error| Some(TrainingAction::Session(
                        SessionAction::CreateFailed { error }
                    )),
                }]
            },

            SessionAction::CreateCompleted { session } => {
                state.sessions.records.insert_one(session);
                state.sessions.create.complete();
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::CreateFailed { error } => {
                state.sessions.create.fail(error);
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::UpdateRequested { update } => {
                state.sessions.update.start();
                state.sessions.touch();

                smallvec![serial_call! {
                    key: keys::SESSION_WRITE,
                    call: {
                        let sessions = env.sessions.clone();
                        async move { sessions.update(update).await }
                    },
                    on_success: |update| Some(TrainingAction::Session(
                        SessionAction::UpdateCompleted { update }
                    )),
                    on_failure: |error| Some(TrainingAction::Session(
                        SessionAction::UpdateFailed { error }
                    )),
                }]
            },

            SessionAction::UpdateCompleted { update } => {
                state.sessions.records.update_one(&update);
                state.sessions.update.complete();
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::UpdateFailed { error } => {
                state.sessions.update.fail(error);
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::DeleteRequested { id } => {
                state.sessions.delete.start();
                state.sessions.touch();

                smallvec![serial_call! {
                    key: keys::SESSION_WRITE,
                    call: {
                        let sessions = env.sessions.clone();
                        async move { sessions.delete(id).await }
                    },
                    on_success: |id| Some(TrainingAction::Session(
                        SessionAction::DeleteCompleted { id }
                    )),
                    on_failure: |error| Some(TrainingAction::Session(
                        SessionAction::DeleteFailed { error }
                    )),
                }]
            },

            SessionAction::DeleteCompleted { id } => {
                state.sessions.records.remove_one(&id);
                state.sessions.delete.complete();
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::DeleteFailed { error } => {
                state.sessions.delete.fail(error);
                state.sessions.touch();
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Rating - the only writer of rolling averages
            // ═══════════════════════════════════════════════════════════════
            SessionAction::RateRequested { id, rating } => {
                state.sessions.rating.start();
                state.sessions.touch();

                let Some(session) = state.sessions.records.get(&id) else {
                    let error = DataError::not_found(format!("no session with id {id}"));
                    return smallvec![Effect::future(async move {
                        Some(TrainingAction::Session(SessionAction::RateFailed { error }))
                    })];
                };

                let update = EntityUpdate::new(
                    id,
                    SessionChanges::Rating {
                        complexity: session.complexity.rate(rating.complexity),
                        intensity: session.intensity.rate(rating.intensity),
                        updated_at: env.clock.now(),
                    },
                );

                smallvec![serial_call! {
                    key: keys::SESSION_WRITE,
                    call: {
                        let sessions = env.sessions.clone();
                        async move { sessions.update(update).await }
                    },
                    on_success: |update| Some(TrainingAction::Session(
                        SessionAction::RateCompleted { update }
                    )),
                    on_failure: |error| Some(TrainingAction::Session(
                        SessionAction::RateFailed { error }
                    )),
                }]
            },

            SessionAction::RateCompleted { update } => {
                state.sessions.records.update_one(&update);
                state.sessions.rating.complete();
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::RateFailed { error } => {
                state.sessions.rating.fail(error);
                state.sessions.touch();
                SmallVec::new()
            },

            SessionAction::Purged => {
                state.sessions.purge();
                SmallVec::new()
            },
        }
    }
}
