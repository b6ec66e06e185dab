//! Per-operation request status bookkeeping.
//!
//! Each entity-domain slice keeps one [`RequestStatus`] per operation kind.
//! The pair is authoritative for UI loading/error states: no collection
//! mutation happens without a paired status transition.

use crate::error::DataError;
use serde::{Deserialize, Serialize};

/// Processing/error pair for one operation kind of one entity domain.
///
/// Lifecycle:
///
/// - `Requested` → [`start`](Self::start): `{processing: true, error: None}`
/// - `Completed` → [`complete`](Self::complete): `{processing: false, error: None}`
/// - `Failed` → [`fail`](Self::fail): `{processing: false, error: Some(..)}`
///
/// Fields are private so the pair can never be observed as both processing
/// and carrying an error: `start` always clears the previous error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    processing: bool,
    error: Option<DataError>,
}

impl RequestStatus {
    /// Idle status with no recorded error.
    #[must_use]
    pub const fn idle() -> Self {
        Self { processing: false, error: None }
    }

    /// A request was dispatched: mark processing, clear any stale error.
    pub fn start(&mut self) {
        self.processing = true;
        self.error = None;
    }

    /// The request completed successfully.
    pub fn complete(&mut self) {
        self.processing = false;
        self.error = None;
    }

    /// The request failed; the prior collection data stays intact.
    pub fn fail(&mut self, error: DataError) {
        self.processing = false;
        self.error = Some(error);
    }

    /// Reset to the initial value (used by purge).
    pub fn reset(&mut self) {
        *self = Self::idle();
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn processing(&self) -> bool {
        self.processing
    }

    /// The most recent failure, if the last request failed.
    #[must_use]
    pub const fn error(&self) -> Option<&DataError> {
        self.error.as_ref()
    }

    /// Idle with no error - nothing requested, or last request succeeded.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !self.processing && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_requested_completed() {
        let mut status = RequestStatus::idle();
        status.start();
        assert!(status.processing());
        assert!(status.error().is_none());

        status.complete();
        assert!(!status.processing());
        assert!(status.is_settled());
    }

    #[test]
    fn lifecycle_requested_failed() {
        let mut status = RequestStatus::idle();
        status.start();
        status.fail(DataError::unavailable("offline"));
        assert!(!status.processing());
        assert!(status.error().is_some_and(DataError::is_transient));
    }

    #[test]
    fn start_clears_stale_error() {
        let mut status = RequestStatus::idle();
        status.fail(DataError::internal("boom"));
        status.start();
        assert!(status.processing());
        assert!(status.error().is_none());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut status = RequestStatus::idle();
        status.fail(DataError::internal("boom"));
        status.reset();
        let once = status.clone();
        status.reset();
        assert_eq!(once, status);
        assert_eq!(status, RequestStatus::idle());
    }
}
