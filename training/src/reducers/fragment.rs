//! Plan-session-fragment reducer.
//!
//! Fragments load per plan and mutate through the shared fragment write
//! queue; batch operations carry reorders and the plan-delete cascade.

use crate::actions::{FragmentAction, TrainingAction};
use crate::environment::TrainingEnvironment;
use crate::keys;
use crate::model::{PlanSessionFragment, TrainingPlan, TrainingRecord, TrainingSession};
use crate::state::TrainingState;
use fitsync_core::effect::Effect;
use fitsync_core::environment::Notifier;
use fitsync_core::query::{Query, WhereOperator};
use fitsync_core::reducer::Reducer;
use fitsync_core::service::EntityData;
use fitsync_core::{SmallVec, serial_call, smallvec, supersede_call};

/// Plan-session-fragment reducer.
#[derive(Debug, Clone)]
pub struct FragmentsReducer<SS, PS, FS, RS, N> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(SS, PS, FS, RS, N)>,
}

impl<SS, PS, FS, RS, N> FragmentsReducer<SS, PS, FS, RS, N> {
    /// Create a new fragments reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<SS, PS, FS, RS, N> Default for FragmentsReducer<SS, PS, FS, RS, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<SS, PS, FS, RS, N> Reducer for FragmentsReducer<SS, PS, FS, RS, N>
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
        let TrainingAction::Fragment(action) = action else {
            return SmallVec::new();
        };

        match action {
            FragmentAction::FetchForPlanRequested { plan_id } => {
                state.fragments.fetch.start();
                state.fragments.touch();

                let query = Query::new().filter(
                    "plan_id",
                    WhereOperator::Eq,
                    serde_json::json!(plan_id.as_str()),
                );
                let completed_plan = plan_id;

                smallvec![supersede_call! {
                    key: keys::FRAGMENT_FETCH,
                    call: {
                        let fragments = env.fragments.clone();
                        async move { fragments.fetch_many(query).await }
                    },
                    on_success: |fragments| Some(TrainingAction::Fragment(
                        FragmentAction::FetchForPlanCompleted {
                            plan_id: completed_plan,
                            fragments,
                        }
                    )),
                    on_failure: |error| Some(TrainingAction::Fragment(
                        FragmentAction::FetchForPlanFailed { error }
                    )),
                }]
            },

            FragmentAction::FetchForPlanCompleted { plan_id, fragments } => {
                state.fragments.records.upsert_many(fragments);
                state.fragments.fetched_plans.insert(plan_id);
                state.fragments.fetch.complete();
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::FetchForPlanFailed { error } => {
                tracing::warn!(%error, "Fragment fetch failed");
                state.fragments.fetch.fail(error);
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::CreateRequested { fragment } => {
                state.fragments.create.start();
                state.fragments.touch();

                smallvec![serial_call! {
                    key: keys::FRAGMENT_WRITE,
                    call: {
                        let fragments = env.fragments.clone();
                        async move { fragments.create(fragment).await }
                    },
                    on_success: |fragment| Some(TrainingAction::Fragment(
                        FragmentAction::CreateCompleted { fragment }
                    )),
                    on_failure: |error| Some(TrainingAction::Fragment(
                        FragmentAction::CreateFailed { error }
                    )),
                }]
            },

            FragmentAction::CreateCompleted { fragment } => {
                state.fragments.records.insert_one(fragment);
                state.fragments.create.complete();
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::CreateFailed { error } => {
                state.fragments.create.fail(error);
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::UpdateRequested { update } => {
                state.fragments.update.start();
                state.fragments.touch();

                smallvec![serial_call! {
                    key: keys::FRAGMENT_WRITE,
                    call: {
                        let fragments = env.fragments.clone();
                        async move { fragments.update(update).await }
                    },
                    on_success: |update| Some(TrainingAction::Fragment(
                        FragmentAction::UpdateCompleted { update }
                    )),
                    on_failure: |error| Some(TrainingAction::Fragment(
                        FragmentAction::UpdateFailed { error }
                    )),
                }]
            },

            FragmentAction::UpdateCompleted { update } => {
                state.fragments.records.update_one(&update);
                state.fragments.update.complete();
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::UpdateFailed { error } => {
                state.fragments.update.fail(error);
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::BatchUpdateRequested { updates } => {
                state.fragments.batch.start();
                state.fragments.touch();

                smallvec![serial_call! {
                    key: keys::FRAGMENT_WRITE,
                    call: {
                        let fragments = env.fragments.clone();
                        async move { fragments.batch_update(updates).await }
                    },
                    on_success: |updates| Some(TrainingAction::Fragment(
                        FragmentAction::BatchUpdateCompleted { updates }
                    )),
                    on_failure: |error| Some(TrainingAction::Fragment(
                        FragmentAction::BatchUpdateFailed { error }
                    )),
                }]
            },

            FragmentAction::BatchUpdateCompleted { updates } => {
                state.fragments.records.update_many(&updates);
                state.fragments.batch.complete();
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::BatchUpdateFailed { error } => {
                state.fragments.batch.fail(error);
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::DeleteRequested { id } => {
                state.fragments.delete.start();
                state.fragments.touch();

                smallvec![serial_call! {
                    key: keys::FRAGMENT_WRITE,
                    call: {
                        let fragments = env.fragments.clone();
                        async move { fragments.delete(id).await }
                    },
                    on_success: |id| Some(TrainingAction::Fragment(
                        FragmentAction::DeleteCompleted { id }
                    )),
                    on_failure: |error| Some(TrainingAction::Fragment(
                        FragmentAction::DeleteFailed { error }
                    )),
                }]
            },

            FragmentAction::DeleteCompleted { id } => {
                state.fragments.records.remove_one(&id);
                state.fragments.delete.complete();
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::DeleteFailed { error } => {
                state.fragments.delete.fail(error);
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::BatchDeleteRequested { ids } => {
                state.fragments.batch.start();
                state.fragments.touch();

                smallvec![serial_call! {
                    key: keys::FRAGMENT_WRITE,
                    call: {
                        let fragments = env.fragments.clone();
                        async move { fragments.batch_delete(ids).await }
                    },
                    on_success: |ids| Some(TrainingAction::Fragment(
                        FragmentAction::BatchDeleteCompleted { ids }
                    )),
                    on_failure: |error| Some(TrainingAction::Fragment(
                        FragmentAction::BatchDeleteFailed { error }
                    )),
                }]
            },

            FragmentAction::BatchDeleteCompleted { ids } => {
                state.fragments.records.remove_many(&ids);
                state.fragments.batch.complete();
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::BatchDeleteFailed { error } => {
                state.fragments.batch.fail(error);
                state.fragments.touch();
                SmallVec::new()
            },

            FragmentAction::Purged => {
                state.fragments.purge();
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{MockFragments, MockPlans, MockRecords, MockSessions, fragment, test_env};
    use crate::model::{FragmentChanges, FragmentId, PlanId};
    use fitsync_core::entity::EntityUpdate;
    use fitsync_core::environment::LogNotifier;
    use fitsync_testing::{ReducerTest, assertions};

    type TestReducer =
        FragmentsReducer<MockSessions, MockPlans, MockFragments, MockRecords, LogNotifier>;

    fn seeded_state() -> TrainingState {
        let mut state = TrainingState::default();
        state.fragments.records.insert_many(vec![
            fragment("f-1", "p-1", "s-1"),
            fragment("f-2", "p-1", "s-2"),
            fragment("f-3", "p-2", "s-1"),
        ]);
        state.fragments.touch();
        state
    }

    #[test]
    fn fetch_for_plan_requested_uses_the_supersede_key() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(TrainingState::default())
            .when_action(TrainingAction::Fragment(FragmentAction::FetchForPlanRequested {
                plan_id: PlanId::new("p-1"),
            }))
            .then_state(|state| {
                assert!(state.fragments.fetch.processing());
            })
            .then_effects(|effects| {
                assertions::assert_has_supersede_effect_for(effects, keys::FRAGMENT_FETCH);
            })
            .run();
    }

    #[test]
    fn fetch_for_plan_completed_merges_and_marks_the_plan() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(seeded_state())
            .when_action(TrainingAction::Fragment(FragmentAction::FetchForPlanCompleted {
                plan_id: PlanId::new("p-3"),
                fragments: vec![fragment("f-9", "p-3", "s-1")],
            }))
            .then_state(|state| {
                assert_eq!(state.fragments.records.len(), 4);
                assert!(state.fragments.fetched_plans.contains(&PlanId::new("p-3")));
                assert!(state.fragments.fetch.is_settled());
            })
            .run();
    }

    #[test]
    fn batch_delete_completed_removes_only_targets() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(seeded_state())
            .when_action(TrainingAction::Fragment(FragmentAction::BatchDeleteCompleted {
                ids: vec![FragmentId::new("f-1"), FragmentId::new("f-2")],
            }))
            .then_state(|state| {
                assert_eq!(state.fragments.records.len(), 1);
                assert!(state.fragments.records.contains(&FragmentId::new("f-3")));
                assert!(state.fragments.batch.is_settled());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn batch_update_completed_applies_each_partial() {
        let updates = vec![
            EntityUpdate::new(
                FragmentId::new("f-1"),
                FragmentChanges { order_index: Some(5), ..FragmentChanges::default() },
            ),
            EntityUpdate::new(
                FragmentId::new("f-2"),
                FragmentChanges { week: Some(3), ..FragmentChanges::default() },
            ),
        ];

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(seeded_state())
            .when_action(TrainingAction::Fragment(FragmentAction::BatchUpdateCompleted { updates }))
            .then_state(|state| {
                let f1 = state.fragments.records.get(&FragmentId::new("f-1")).unwrap();
                let f2 = state.fragments.records.get(&FragmentId::new("f-2")).unwrap();
                assert_eq!(f1.order_index, 5);
                assert_eq!(f2.week, 3);
            })
            .run();
    }
}
