//! Training reducers.
//!
//! Pure functions `(State, Action, Environment) → (State, Effects)`, one per
//! entity domain, routed by [`TrainingReducer`].

pub mod fragment;
pub mod plan;
pub mod record;
pub mod session;

use crate::actions::TrainingAction;
use crate::environment::TrainingEnvironment;
use crate::model::{PlanSessionFragment, TrainingPlan, TrainingRecord, TrainingSession};
use crate::state::TrainingState;
use fitsync_core::environment::Notifier;
use fitsync_core::reducer::Reducer;
use fitsync_core::service::EntityData;
use fitsync_core::{SmallVec, effect::Effect};

// Re-export
pub use fragment::FragmentsReducer;
pub use plan::PlansReducer;
pub use record::RecordsReducer;
pub use session::SessionsReducer;

/// Unified training reducer.
///
/// Routes each action to the sub-reducer owning its domain. Cross-domain
/// chains (plan-delete cascade, record-to-rating) travel as effects, so
/// every slice still has exactly one writer.
#[derive(Debug, Clone)]
pub struct TrainingReducer<SS, PS, FS, RS, N> {
    session: SessionsReducer<SS, PS, FS, RS, N>,
    plan: PlansReducer<SS, PS, FS, RS, N>,
    fragment: FragmentsReducer<SS, PS, FS, RS, N>,
    record: RecordsReducer<SS, PS, FS, RS, N>,
}

impl<SS, PS, FS, RS, N> TrainingReducer<SS, PS, FS, RS, N> {
    /// Create a new unified training reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: SessionsReducer::new(),
            plan: PlansReducer::new(),
            fragment: FragmentsReducer::new(),
            record: RecordsReducer::new(),
        }
    }
}

impl<SS, PS, FS, RS, N> Default for TrainingReducer<SS, PS, FS, RS, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<SS, PS, FS, RS, N> Reducer for TrainingReducer<SS, PS, FS, RS, N>
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

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TrainingAction::Session(_) => self.session.reduce(state, action, env),
            TrainingAction::Plan(_) => self.plan.reduce(state, action, env),
            TrainingAction::Fragment(_) => self.fragment.reduce(state, action, env),
            TrainingAction::Record(_) => self.record.reduce(state, action, env),
        }
    }
}
