//! Training environment.
//!
//! This module defines the environment type for dependency injection in
//! training reducers: one data service per entity domain, the notifier, and
//! the clock.

use crate::model::{PlanSessionFragment, TrainingPlan, TrainingRecord, TrainingSession};
use fitsync_core::environment::{Clock, Notifier};
use fitsync_core::service::EntityData;
use std::sync::Arc;

/// Training environment.
///
/// Contains all external collaborators needed by training reducers.
///
/// # Type Parameters
///
/// - `SS`: session data service
/// - `PS`: plan data service
/// - `FS`: fragment data service
/// - `RS`: record data service
/// - `N`: notifier
#[derive(Clone)]
pub struct TrainingEnvironment<SS, PS, FS, RS, N>
where
    SS: EntityData<Entity = TrainingSession>,
    PS: EntityData<Entity = TrainingPlan>,
    FS: EntityData<Entity = PlanSessionFragment>,
    RS: EntityData<Entity = TrainingRecord>,
    N: Notifier + Clone,
{
    /// Session data service.
    pub sessions: SS,

    /// Plan data service.
    pub plans: PS,

    /// Fragment data service.
    pub fragments: FS,

    /// Record data service.
    pub records: RS,

    /// Transient user messaging.
    pub notifier: N,

    /// Clock for timestamps.
    pub clock: Arc<dyn Clock>,
}

impl<SS, PS, FS, RS, N> TrainingEnvironment<SS, PS, FS, RS, N>
where
    SS: EntityData<Entity = TrainingSession>,
    PS: EntityData<Entity = TrainingPlan>,
    FS: EntityData<Entity = PlanSessionFragment>,
    RS: EntityData<Entity = TrainingRecord>,
    N: Notifier + Clone,
{
    /// Create a new training environment.
    #[must_use]
    pub fn new(
        sessions: SS,
        plans: PS,
        fragments: FS,
        records: RS,
        notifier: N,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            plans,
            fragments,
            records,
            notifier,
            clock,
        }
    }
}
