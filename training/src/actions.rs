//! Training actions.
//!
//! Every operation on an entity domain contributes exactly three variants:
//! `<Op>Requested` (the only phase UI code may dispatch), `<Op>Completed`,
//! and `<Op>Failed` (produced exclusively by the matching effect). A
//! per-domain `Purged` action resets the slice, e.g. on logout.

use crate::model::{
    FragmentId, PlanId, PlanSessionFragment, RecordId, SessionId, SessionRating, TrainingPlan,
    TrainingRecord, TrainingSession,
};
use fitsync_core::entity::EntityUpdate;
use fitsync_core::error::DataError;
use fitsync_core::query::Query;
use fitsync_macros::Action;
use serde::{Deserialize, Serialize};

/// Partial update addressed to one training session.
pub type SessionUpdate = EntityUpdate<TrainingSession>;
/// Partial update addressed to one training plan.
pub type PlanUpdate = EntityUpdate<TrainingPlan>;
/// Partial update addressed to one fragment.
pub type FragmentUpdate = EntityUpdate<PlanSessionFragment>;
/// Partial update addressed to one training record.
pub type RecordUpdate = EntityUpdate<TrainingRecord>;

/// Actions on the training-session domain.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionAction {
    // ═══════════════════════════════════════════════════════════════════
    // Fetch
    // ═══════════════════════════════════════════════════════════════════
    /// Load the whole visible catalog.
    #[request]
    FetchAllRequested,
    /// Catalog loaded; replaces the collection.
    #[completion]
    FetchAllCompleted {
        /// The fetched catalog.
        sessions: Vec<TrainingSession>,
    },
    /// Catalog load failed.
    #[failure]
    FetchAllFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Load one session by id.
    #[request]
    FetchOneRequested {
        /// Which session.
        id: SessionId,
    },
    /// Session loaded; upserts into the collection.
    #[completion]
    FetchOneCompleted {
        /// The fetched session.
        session: TrainingSession,
    },
    /// Session load failed.
    #[failure]
    FetchOneFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Load sessions matching a query.
    #[request]
    FetchManyRequested {
        /// Remote query parameters.
        query: Query,
    },
    /// Query results loaded; merged into the collection.
    #[completion]
    FetchManyCompleted {
        /// The fetched sessions.
        sessions: Vec<TrainingSession>,
    },
    /// Query failed.
    #[failure]
    FetchManyFailed {
        /// Normalized failure.
        error: DataError,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Mutations (serialized per domain)
    // ═══════════════════════════════════════════════════════════════════
    /// Persist a new session.
    #[request]
    CreateRequested {
        /// The session to persist (id generated client-side).
        session: TrainingSession,
    },
    /// Session persisted.
    #[completion]
    CreateCompleted {
        /// The session as stored.
        session: TrainingSession,
    },
    /// Create failed.
    #[failure]
    CreateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Apply a field edit.
    #[request]
    UpdateRequested {
        /// The partial update.
        update: SessionUpdate,
    },
    /// Edit applied remotely; merged locally.
    #[completion]
    UpdateCompleted {
        /// The applied partial, echoed by the service.
        update: SessionUpdate,
    },
    /// Update failed.
    #[failure]
    UpdateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Delete one session.
    #[request]
    DeleteRequested {
        /// Which session.
        id: SessionId,
    },
    /// Session deleted remotely; removed locally.
    #[completion]
    DeleteCompleted {
        /// The deleted id, echoed by the service.
        id: SessionId,
    },
    /// Delete failed.
    #[failure]
    DeleteFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Fold a submitted rating into the session's rolling averages.
    ///
    /// This is the only operation that may write rating statistics.
    #[request]
    RateRequested {
        /// Which session.
        id: SessionId,
        /// The submitted rating.
        rating: SessionRating,
    },
    /// Recomputed statistics persisted; merged locally.
    #[completion]
    RateCompleted {
        /// The applied statistics update.
        update: SessionUpdate,
    },
    /// Rating failed.
    #[failure]
    RateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Reset the slice to its initial value.
    Purged,
}

/// Actions on the training-plan domain.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlanAction {
    /// Load all visible plans.
    #[request]
    FetchAllRequested,
    /// Plans loaded; replaces the collection.
    #[completion]
    FetchAllCompleted {
        /// The fetched plans.
        plans: Vec<TrainingPlan>,
    },
    /// Plan load failed.
    #[failure]
    FetchAllFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Load one plan by id.
    #[request]
    FetchOneRequested {
        /// Which plan.
        id: PlanId,
    },
    /// Plan loaded; upserts into the collection.
    #[completion]
    FetchOneCompleted {
        /// The fetched plan.
        plan: TrainingPlan,
    },
    /// Plan load failed.
    #[failure]
    FetchOneFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Persist a new plan.
    #[request]
    CreateRequested {
        /// The plan to persist.
        plan: TrainingPlan,
    },
    /// Plan persisted.
    #[completion]
    CreateCompleted {
        /// The plan as stored.
        plan: TrainingPlan,
    },
    /// Create failed.
    #[failure]
    CreateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Apply a field edit.
    #[request]
    UpdateRequested {
        /// The partial update.
        update: PlanUpdate,
    },
    /// Edit applied remotely; merged locally.
    #[completion]
    UpdateCompleted {
        /// The applied partial, echoed by the service.
        update: PlanUpdate,
    },
    /// Update failed.
    #[failure]
    UpdateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Delete one plan.
    ///
    /// Completion chains an explicit fragment batch delete for every
    /// fragment the plan owned - the cascade is explicit, not automatic.
    #[request]
    DeleteRequested {
        /// Which plan.
        id: PlanId,
    },
    /// Plan deleted remotely; removed locally, cascade dispatched.
    #[completion]
    DeleteCompleted {
        /// The deleted id, echoed by the service.
        id: PlanId,
    },
    /// Delete failed.
    #[failure]
    DeleteFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Reset the slice to its initial value.
    Purged,
}

/// Actions on the plan-session-fragment domain.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FragmentAction {
    /// Load the fragments of one plan.
    #[request]
    FetchForPlanRequested {
        /// The owning plan.
        plan_id: PlanId,
    },
    /// Fragments loaded; merged into the collection.
    #[completion]
    FetchForPlanCompleted {
        /// The owning plan.
        plan_id: PlanId,
        /// Its fragments.
        fragments: Vec<PlanSessionFragment>,
    },
    /// Fragment load failed.
    #[failure]
    FetchForPlanFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Persist a new fragment.
    #[request]
    CreateRequested {
        /// The fragment to persist.
        fragment: PlanSessionFragment,
    },
    /// Fragment persisted.
    #[completion]
    CreateCompleted {
        /// The fragment as stored.
        fragment: PlanSessionFragment,
    },
    /// Create failed.
    #[failure]
    CreateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Reschedule/reorder one fragment.
    #[request]
    UpdateRequested {
        /// The partial update.
        update: FragmentUpdate,
    },
    /// Edit applied remotely; merged locally.
    #[completion]
    UpdateCompleted {
        /// The applied partial, echoed by the service.
        update: FragmentUpdate,
    },
    /// Update failed.
    #[failure]
    UpdateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Reschedule/reorder many fragments in one round trip.
    #[request]
    BatchUpdateRequested {
        /// The partial updates.
        updates: Vec<FragmentUpdate>,
    },
    /// Batch applied remotely; merged locally.
    #[completion]
    BatchUpdateCompleted {
        /// The applied partials, echoed by the service.
        updates: Vec<FragmentUpdate>,
    },
    /// Batch update failed.
    #[failure]
    BatchUpdateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Delete one fragment.
    #[request]
    DeleteRequested {
        /// Which fragment.
        id: FragmentId,
    },
    /// Fragment deleted remotely; removed locally.
    #[completion]
    DeleteCompleted {
        /// The deleted id, echoed by the service.
        id: FragmentId,
    },
    /// Delete failed.
    #[failure]
    DeleteFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Delete many fragments in one round trip (plan-delete cascade).
    #[request]
    BatchDeleteRequested {
        /// Which fragments.
        ids: Vec<FragmentId>,
    },
    /// Batch deleted remotely; removed locally.
    #[completion]
    BatchDeleteCompleted {
        /// The deleted ids, echoed by the service.
        ids: Vec<FragmentId>,
    },
    /// Batch delete failed.
    #[failure]
    BatchDeleteFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Reset the slice to its initial value.
    Purged,
}

/// Actions on the training-record domain.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RecordAction {
    /// Load the caller's records.
    #[request]
    FetchAllRequested,
    /// Records loaded; replaces the collection.
    #[completion]
    FetchAllCompleted {
        /// The fetched records.
        records: Vec<TrainingRecord>,
    },
    /// Record load failed.
    #[failure]
    FetchAllFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Load one record by id.
    #[request]
    FetchOneRequested {
        /// Which record.
        id: RecordId,
    },
    /// Record loaded; upserts into the collection.
    #[completion]
    FetchOneCompleted {
        /// The fetched record.
        record: TrainingRecord,
    },
    /// Record load failed.
    #[failure]
    FetchOneFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Persist a completed-session receipt.
    ///
    /// Completion chains the session rating operation when the record
    /// carries a rating.
    #[request]
    CreateRequested {
        /// The record to persist.
        record: TrainingRecord,
    },
    /// Record persisted; rating chain dispatched when applicable.
    #[completion]
    CreateCompleted {
        /// The record as stored.
        record: TrainingRecord,
    },
    /// Create failed.
    #[failure]
    CreateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Correct a record (e.g. amend the rating).
    #[request]
    UpdateRequested {
        /// The partial update.
        update: RecordUpdate,
    },
    /// Edit applied remotely; merged locally.
    #[completion]
    UpdateCompleted {
        /// The applied partial, echoed by the service.
        update: RecordUpdate,
    },
    /// Update failed.
    #[failure]
    UpdateFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Delete one record.
    #[request]
    DeleteRequested {
        /// Which record.
        id: RecordId,
    },
    /// Record deleted remotely; removed locally.
    #[completion]
    DeleteCompleted {
        /// The deleted id, echoed by the service.
        id: RecordId,
    },
    /// Delete failed.
    #[failure]
    DeleteFailed {
        /// Normalized failure.
        error: DataError,
    },

    /// Reset the slice to its initial value.
    Purged,
}

/// Union of the four training domains, routed by the root reducer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TrainingAction {
    /// Training-session actions.
    Session(SessionAction),
    /// Training-plan actions.
    Plan(PlanAction),
    /// Plan-session-fragment actions.
    Fragment(FragmentAction),
    /// Training-record actions.
    Record(RecordAction),
}

impl TrainingAction {
    /// Whether the wrapped action is a dispatchable request.
    #[must_use]
    pub const fn is_request(&self) -> bool {
        match self {
            Self::Session(a) => a.is_request(),
            Self::Plan(a) => a.is_request(),
            Self::Fragment(a) => a.is_request(),
            Self::Record(a) => a.is_request(),
        }
    }

    /// Whether the wrapped action is a terminal phase (effect-produced).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        match self {
            Self::Session(a) => a.is_terminal(),
            Self::Plan(a) => a.is_terminal(),
            Self::Fragment(a) => a.is_terminal(),
            Self::Record(a) => a.is_terminal(),
        }
    }

    /// The wrapped variant name, for log and metric labels.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Session(a) => a.name(),
            Self::Plan(a) => a.name(),
            Self::Fragment(a) => a.name(),
            Self::Record(a) => a.name(),
        }
    }
}

impl From<SessionAction> for TrainingAction {
    fn from(action: SessionAction) -> Self {
        Self::Session(action)
    }
}

impl From<PlanAction> for TrainingAction {
    fn from(action: PlanAction) -> Self {
        Self::Plan(action)
    }
}

impl From<FragmentAction> for TrainingAction {
    fn from(action: FragmentAction) -> Self {
        Self::Fragment(action)
    }
}

impl From<RecordAction> for TrainingAction {
    fn from(action: RecordAction) -> Self {
        Self::Record(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_reflect_taxonomy() {
        assert!(SessionAction::FetchAllRequested.is_request());
        assert!(
            SessionAction::FetchAllFailed { error: DataError::unavailable("offline") }
                .is_terminal()
        );
        assert!(!SessionAction::Purged.is_request());
        assert!(!SessionAction::Purged.is_terminal());
    }

    #[test]
    fn wrapper_delegates_phase_and_name() {
        let action = TrainingAction::Plan(PlanAction::FetchAllRequested);
        assert!(action.is_request());
        assert!(!action.is_terminal());
        assert_eq!(action.name(), "FetchAllRequested");
    }
}
