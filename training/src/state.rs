//! Training state slices.
//!
//! Each entity domain owns one slice: its normalized collection, one request
//! status per operation kind, a fetched marker, and an epoch counter feeding
//! selector memoization. Reducers bump the epoch (`touch()`) on every
//! mutation of the slice, including status-flag transitions.

use crate::model::{PlanId, PlanSessionFragment, TrainingPlan, TrainingRecord, TrainingSession};
use fitsync_core::entity::EntityMap;
use fitsync_core::status::RequestStatus;
use fitsync_macros::State;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Training-session slice.
#[derive(State, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionsSlice {
    /// Normalized session collection.
    pub records: EntityMap<TrainingSession>,
    /// Status of fetch operations (all/one/many share one indicator).
    pub fetch: RequestStatus,
    /// Status of the create operation.
    pub create: RequestStatus,
    /// Status of the update operation.
    pub update: RequestStatus,
    /// Status of the delete operation.
    pub delete: RequestStatus,
    /// Status of the rating operation.
    pub rating: RequestStatus,
    /// Whether a fetch-all has completed since the last purge.
    pub fetched: bool,
    /// Version counter for selector memoization.
    #[epoch]
    pub epoch: u64,
}

impl SessionsSlice {
    /// Reset collection and flags to initial values.
    ///
    /// The epoch keeps counting so memoized selectors never confuse a
    /// purged slice with an earlier one.
    pub fn purge(&mut self) {
        let epoch = self.epoch;
        *self = Self::default();
        self.epoch = epoch;
        self.touch();
    }
}

/// Training-plan slice.
#[derive(State, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlansSlice {
    /// Normalized plan collection.
    pub records: EntityMap<TrainingPlan>,
    /// Status of fetch operations.
    pub fetch: RequestStatus,
    /// Status of the create operation.
    pub create: RequestStatus,
    /// Status of the update operation.
    pub update: RequestStatus,
    /// Status of the delete operation.
    pub delete: RequestStatus,
    /// Whether a fetch-all has completed since the last purge.
    pub fetched: bool,
    /// Version counter for selector memoization.
    #[epoch]
    pub epoch: u64,
}

impl PlansSlice {
    /// Reset collection and flags to initial values (epoch keeps counting).
    pub fn purge(&mut self) {
        let epoch = self.epoch;
        *self = Self::default();
        self.epoch = epoch;
        self.touch();
    }
}

/// Plan-session-fragment slice.
#[derive(State, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentsSlice {
    /// Normalized fragment collection.
    pub records: EntityMap<PlanSessionFragment>,
    /// Status of per-plan fetches.
    pub fetch: RequestStatus,
    /// Status of the create operation.
    pub create: RequestStatus,
    /// Status of the update operation.
    pub update: RequestStatus,
    /// Status of the delete operation.
    pub delete: RequestStatus,
    /// Status of batch operations (reorder, cascade delete).
    pub batch: RequestStatus,
    /// Plans whose fragments have been loaded since the last purge.
    pub fetched_plans: BTreeSet<PlanId>,
    /// Version counter for selector memoization.
    #[epoch]
    pub epoch: u64,
}

impl FragmentsSlice {
    /// Reset collection and flags to initial values (epoch keeps counting).
    pub fn purge(&mut self) {
        let epoch = self.epoch;
        *self = Self::default();
        self.epoch = epoch;
        self.touch();
    }
}

/// Training-record slice.
#[derive(State, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordsSlice {
    /// Normalized record collection.
    pub records: EntityMap<TrainingRecord>,
    /// Status of fetch operations.
    pub fetch: RequestStatus,
    /// Status of the create operation.
    pub create: RequestStatus,
    /// Status of the update operation.
    pub update: RequestStatus,
    /// Status of the delete operation.
    pub delete: RequestStatus,
    /// Whether a fetch-all has completed since the last purge.
    pub fetched: bool,
    /// Version counter for selector memoization.
    #[epoch]
    pub epoch: u64,
}

impl RecordsSlice {
    /// Reset collection and flags to initial values (epoch keeps counting).
    pub fn purge(&mut self) {
        let epoch = self.epoch;
        *self = Self::default();
        self.epoch = epoch;
        self.touch();
    }
}

/// Root state for the training domains.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    /// Training sessions.
    pub sessions: SessionsSlice,
    /// Training plans.
    pub plans: PlansSlice,
    /// Plan-session fragments.
    pub fragments: FragmentsSlice,
    /// Training records.
    pub records: RecordsSlice,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitsync_core::error::DataError;

    #[test]
    fn purge_resets_contents_but_keeps_epoch_monotone() {
        let mut slice = SessionsSlice::default();
        slice.records.insert_one(crate::fixtures::session("s-1", "Leg Day", "FitChan"));
        slice.fetch.fail(DataError::unavailable("offline"));
        slice.fetched = true;
        slice.touch();
        let epoch_before = slice.epoch();

        slice.purge();

        assert!(slice.records.is_empty());
        assert!(slice.fetch.is_settled());
        assert!(!slice.fetched);
        assert!(slice.epoch() > epoch_before);
    }

    #[test]
    fn purge_twice_matches_purge_once() {
        let mut slice = RecordsSlice::default();
        slice.fetched = true;
        slice.touch();

        slice.purge();
        let semantic_once = (slice.records.clone(), slice.fetched, slice.fetch.clone());

        slice.purge();
        let semantic_twice = (slice.records.clone(), slice.fetched, slice.fetch.clone());

        assert_eq!(semantic_once, semantic_twice);
    }
}
