//! Training-plan reducer.
//!
//! Plan deletion completion chains an explicit fragment batch delete for the
//! fragments the plan owned; the cascade is an observable operation of its
//! own, never an implicit side effect of the remote service.

use crate::actions::{FragmentAction, PlanAction, TrainingAction};
use crate::environment::TrainingEnvironment;
use crate::keys;
use crate::model::{PlanSessionFragment, TrainingPlan, TrainingRecord, TrainingSession};
use crate::state::TrainingState;
use fitsync_core::effect::Effect;
use fitsync_core::environment::Notifier;
use fitsync_core::reducer::Reducer;
use fitsync_core::service::EntityData;
use fitsync_core::{SmallVec, serial_call, smallvec, supersede_call};

/// Training-plan reducer.
#[derive(Debug, Clone)]
pub struct PlansReducer<SS, PS, FS, RS, N> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(SS, PS, FS, RS, N)>,
}

impl<SS, PS, FS, RS, N> PlansReducer<SS, PS, FS, RS, N> {
    /// Create a new plans reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<SS, PS, FS, RS, N> Default for PlansReducer<SS, PS, FS, RS, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<SS, PS, FS, RS, N> Reducer for PlansReducer<SS, PS, FS, RS, N>
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
        let TrainingAction::Plan(action) = action else {
            return SmallVec::new();
        };

        match action {
            PlanAction::FetchAllRequested => {
                state.plans.fetch.start();
                state.plans.touch();

                smallvec![supersede_call! {
                    key: keys::PLAN_FETCH_ALL,
                    call: {
                        let plans = env.plans.clone();
                        async move { plans.fetch_all().await }
                    },
                    on_success: |plans| Some(TrainingAction::Plan(
                        PlanAction::FetchAllCompleted { plans }
                    )),
                    on_failure: |error| Some(TrainingAction::Plan(
                        PlanAction::FetchAllFailed { error }
                    )),
                }]
            },

            PlanAction::FetchAllCompleted { plans } => {
                state.plans.records.replace_all(plans);
                state.plans.fetched = true;
                state.plans.fetch.complete();
                state.plans.touch();
                SmallVec::new()
            },

            PlanAction::FetchAllFailed { error } => {
                tracing::warn!(%error, "Plan fetch failed");
                state.plans.fetch.fail(error);
                state.plans.touch();
                SmallVec::new()
            },

            PlanAction::FetchOneRequested { id } => {
                state.plans.fetch.start();
                state.plans.touch();

                smallvec![supersede_call! {
                    key: keys::PLAN_FETCH_ONE,
                    call: {
                        let plans = env.plans.clone();
                        async move { plans.fetch_one(id).await }
                    },
                    on_success: |plan| Some(TrainingAction::Plan(
                        PlanAction::FetchOneCompleted { plan }
                    )),
                    on_failure: |error| Some(TrainingAction::Plan(
                        PlanAction::FetchOneFailed { error }
                    )),
                }]
            },

            PlanAction::FetchOneCompleted { plan } => {
                state.plans.records.upsert_one(plan);
                state.plans.fetch.complete();
                state.plans.touch();
                SmallVec::new()
            },

            PlanAction::FetchOneFailed { error } => {
                state.plans.fetch.fail(error);
                state.plans.touch();
                SmallVec::new()
            },

            PlanAction::CreateRequested { plan } => {
                state.plans.create.start();
                state.plans.touch();

                smallvec![serial_call! {
                    key: keys::PLAN_WRITE,
                    call: {
                        let plans = env.plans.clone();
                        async move { plans.create(plan).await }
                    },
                    on_success: |plan| Some(TrainingAction::Plan(
                        PlanAction::CreateCompleted { plan }
                    )),
                    on_failure: |error| Some(TrainingAction::Plan(
                        PlanAction::CreateFailed { error }
                    )),
                }]
            },

            PlanAction::CreateCompleted { plan } => {
                state.plans.records.insert_one(plan);
                state.plans.create.complete();
                state.plans.touch();
                SmallVec::new()
            },

            PlanAction::CreateFailed { error } => {
                state.plans.create.fail(error);
                state.plans.touch();
                SmallVec::new()
            },

            PlanAction::UpdateRequested { update } => {
                state.plans.update.start();
                state.plans.touch();

                smallvec![serial_call! {
                    key: keys::PLAN_WRITE,
                    call: {
                        let plans = env.plans.clone();
                        async move { plans.update(update).await }
                    },
                    on_success: |update| Some(TrainingAction::Plan(
                        PlanAction::UpdateCompleted { update }
                    )),
                    on_failure: |error| Some(TrainingAction::Plan(
                        PlanAction::UpdateFailed { error }
                    )),
                }]
            },

            PlanAction::UpdateCompleted { update } => {
                state.plans.records.update_one(&update);
                state.plans.update.complete();
                state.plans.touch();
                SmallVec::new()
            },

            PlanAction::UpdateFailed { error } => {
                state.plans.update.fail(error);
                state.plans.touch();
                SmallVec::new()
            },

            PlanAction::DeleteRequested { id } => {
                state.plans.delete.start();
                state.plans.touch();

                smallvec![serial_call! {
                    key: keys::PLAN_WRITE,
                    call: {
                        let plans = env.plans.clone();
                        async move { plans.delete(id).await }
                    },
                    on_success: |id| Some(TrainingAction::Plan(
                        PlanAction::DeleteCompleted { id }
                    )),
                    on_failure: |error| Some(TrainingAction::Plan(
                        PlanAction::DeleteFailed { error }
                    )),
                }]
            },

            PlanAction::DeleteCompleted { id } => {
                let removed = state.plans.records.remove_one(&id);
                state.plans.delete.complete();
                state.plans.touch();

                // Cascade: the deleted plan's fragments go through the
                // explicit batch-delete operation.
                let fragment_ids = removed.map(|plan| plan.fragment_ids).unwrap_or_default();
                if fragment_ids.is_empty() {
                    SmallVec::new()
                } else {
                    tracing::debug!(
                        plan_id = %id,
                        count = fragment_ids.len(),
                        "Chaining fragment batch delete for removed plan"
                    );
                    smallvec![Effect::future(async move {
                        Some(TrainingAction::Fragment(FragmentAction::BatchDeleteRequested {
                            ids: fragment_ids,
                        }))
                    })]
                }
            },

            PlanAction::DeleteFailed { error } => {
                state.plans.delete.fail(error);
                state.plans.touch();
                SmallVec::new()
            },

            PlanAction::Purged => {
                state.plans.purge();
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{MockFragments, MockPlans, MockRecords, MockSessions, plan, test_env};
    use crate::model::{FragmentId, PlanId};
    use fitsync_core::entity::EntityUpdate;
    use fitsync_core::environment::LogNotifier;
    use fitsync_testing::{ReducerTest, assertions};

    type TestReducer = PlansReducer<MockSessions, MockPlans, MockFragments, MockRecords, LogNotifier>;

    #[test]
    fn fetch_all_completed_replaces_collection() {
        let mut state = TrainingState::default();
        state.plans.records.insert_one(plan("p-old", "Old Block"));
        state.plans.touch();

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(TrainingAction::Plan(PlanAction::FetchAllCompleted {
                plans: vec![plan("p-1", "Strength Block")],
            }))
            .then_state(|state| {
                assert_eq!(state.plans.records.len(), 1);
                assert!(state.plans.records.contains(&PlanId::new("p-1")));
                assert!(state.plans.fetched);
                assert!(state.plans.fetch.is_settled());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn delete_completed_chains_fragment_batch_delete() {
        let mut state = TrainingState::default();
        let mut owned = plan("p-1", "Strength Block");
        owned.fragment_ids = vec![FragmentId::new("f-1"), FragmentId::new("f-2")];
        state.plans.records.insert_one(owned);
        state.plans.touch();

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(TrainingAction::Plan(PlanAction::DeleteCompleted {
                id: PlanId::new("p-1"),
            }))
            .then_state(|state| {
                assert!(state.plans.records.is_empty());
                assert!(state.plans.delete.is_settled());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn delete_completed_without_fragments_chains_nothing() {
        let mut state = TrainingState::default();
        state.plans.records.insert_one(plan("p-1", "Empty Block"));
        state.plans.touch();

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(TrainingAction::Plan(PlanAction::DeleteCompleted {
                id: PlanId::new("p-1"),
            }))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn update_requested_serializes_on_the_plan_write_key() {
        let mut state = TrainingState::default();
        state.plans.records.insert_one(plan("p-1", "Strength Block"));
        state.plans.touch();

        let update = EntityUpdate::new(
            PlanId::new("p-1"),
            crate::model::PlanChanges {
                title: Some("Renamed Block".to_string()),
                ..crate::model::PlanChanges::default()
            },
        );

        ReducerTest::new(TestReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(TrainingAction::Plan(PlanAction::UpdateRequested { update }))
            .then_state(|state| {
                assert!(state.plans.update.processing());
            })
            .then_effects(|effects| {
                assertions::assert_has_serial_effect_for(effects, keys::PLAN_WRITE);
            })
            .run();
    }
}
