//! Training-record reducer.
//!
//! Records are completed-session receipts. A created record carrying a
//! rating chains the session rating operation, so averages only ever move
//! through that dedicated path.

use crate::actions::{RecordAction, SessionAction, TrainingAction};
use crate::environment::TrainingEnvironment;
use crate::keys;
use crate::model::{PlanSessionFragment, TrainingPlan, TrainingRecord, TrainingSession};
use crate::state::TrainingState;
use fitsync_core::effect::Effect;
use fitsync_core::environment::Notifier;
use fitsync_core::reducer::Reducer;
use fitsync_core::service::EntityData;
use fitsync_core::{SmallVec, serial_call, smallvec, supersede_call};

/// Training-record reducer.
#[derive(Debug, Clone)]
pub struct RecordsReducer<SS, PS, FS, RS, N> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(SS, PS, FS, RS, N)>,
}

impl<SS, PS, FS, RS, N> RecordsReducer<SS, PS, FS, RS, N> {
    /// Create a new records reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<SS, PS, FS, RS, N> Default for RecordsReducer<SS, PS, FS, RS, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<SS, PS, FS, RS, N> Reducer for RecordsReducer<SS, PS, FS, RS, N>
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
        let TrainingAction::Record(action) = action else {
            return SmallVec::new();
        };

        match action {
            RecordAction::FetchAllRequested => {
                state.records.fetch.start();
                state.records.touch();

                smallvec![supersede_call! {
                    key: keys::RECORD_FETCH_ALL,
                    call: {
                        let records = env.records.clone();
                        async move { records.fetch_all().await }
                    },
                    on_success: |records| Some(TrainingAction::Record(
                        RecordAction::FetchAllCompleted { records }
                    )),
                    on_failure: |error| Some(TrainingAction::Record(
                        RecordAction::FetchAllFailed { error }
                    )),
                }]
            },

            RecordAction::FetchAllCompleted { records } => {
                state.records.records.replace_all(records);
                state.records.fetched = true;
                state.records.fetch.complete();
                state.records.touch();
                SmallVec::new()
            },

            RecordAction::FetchAllFailed { error } => {
                tracing::warn!(%error, "Record fetch failed");
                state.records.fetch.fail(error);
                state.records.touch();
                SmallVec::new()
            },

            RecordAction::FetchOneRequested { id } => {
                state.records.fetch.start();
                state.records.touch();

                smallvec![supersede_call! {
                    key: keys::RECORD_FETCH_ONE,
                    call: {
                        let records = env.records.clone();
                        async move { records.fetch_one(id).await }
                    },
                    on_success: |record| Some(TrainingAction::Record(
                        RecordAction::FetchOneCompleted { record }
                    )),
                    on_failure: |error| Some(TrainingAction::Record(
                        RecordAction::FetchOneFailed { error }
                    )),
                }]
            },

            RecordAction::FetchOneCompleted { record } => {
                state.records.records.upsert_one(record);
                state.records.fetch.complete();
                state.records.touch();
                SmallVec::new()
            },

            RecordAction::FetchOneFailed { error } => {
                state.records.fetch.fail(error);
                state.records.touch();
                SmallVec::new()
            },

            RecordAction::CreateRequested { record } => {
                state.records.create.start();
                state.records.touch();

                smallvec![serial_call! {
                    key: keys::RECORD_WRITE,
                    call: {
                        let records = env.records.clone();
                        async move { records.create(record).await }
                    },
                    on_success: |record| Some(TrainingAction::Record(
                        RecordAction::CreateCompleted { record }
                    )),
                    on_failure: |error| Some(TrainingAction::Record(
                        RecordAction::CreateFailed { error }
                    )),
                }]
            },

            RecordAction::CreateCompleted { record } => {
                state.records.records.insert_one(record.clone());
                state.records.create.complete();
                state.records.touch();

                // Completion workflow: a rated receipt feeds the session's
                // rolling averages through the rating operation.
                if let Some(rating) = record.rating {
                    let session_id = record.session_id;
                    smallvec![Effect::future(async move {
                        Some(TrainingAction::Session(SessionAction::RateRequested {
                            id: session_id,
                            rating,
                        }))
                    })]
                } else {
                    SmallVec::new()
                }
            },

            RecordAction::CreateFailed { error } => {
                state.records.create.fail(error);
                state.records.touch();
                SmallVec::new()
            },

            RecordAction::UpdateRequested { update } => {
                state.records.update.start();
                state.records.touch();

                smallvec![serial_call! {
                    key: keys::RECORD_WRITE,
                    call: {
                        let records = env.records.clone();
                        async move { records.update(update).await }
                    },
                    on_success: |update| Some(TrainingAction::Record(
                        RecordAction::UpdateCompleted { update }
                    )),
                    on_failure: |error| Some(TrainingAction::Record(
                        RecordAction::UpdateFailed { error }
                    )),
                }]
            },

            RecordAction::UpdateCompleted { update } => {
                state.records.records.update_one(&update);
                state.records.update.complete();
                state.records.touch();
                SmallVec::new()
            },

            RecordAction::UpdateFailed { error } => {
                state.records.update.fail(error);
                state.records.touch();
                SmallVec::new()
            },

            RecordAction::DeleteRequested { id } => {
                state.records.delete.start();
                state.records.touch();

                smallvec![serial_call! {
                    key: keys::RECORD_WRITE,
                    call: {
                        let records = env.records.clone();
                        async move { records.delete(id).await }
                    },
                    on_success: |id| Some(TrainingAction::Record(
                        RecordAction::DeleteCompleted { id }
                    )),
                    on_failure: |error| Some(TrainingAction::Record(
                        RecordAction::DeleteFailed { error }
                    )),
                }]
            },

            RecordAction::DeleteCompleted { id } => {
                state.records.records.remove_one(&id);
                state.records.delete.complete();
                state.records.touch();
                SmallVec::new()
            },

            RecordAction::DeleteFailed { error } => {
                state.records.delete.fail(error);
                state.records.touch();
                SmallVec::new()
            },

            RecordAction::Purged => {
                state.records.purge();
                SmallVec::new()
            },
        }
    }
}
