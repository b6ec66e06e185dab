//! The normalized failure shape crossing the action-dispatch boundary.
//!
//! Every collaborator error - network, permission, validation, not-found -
//! is converted to a [`DataError`] triple before it becomes a `Failed` action.
//! Nothing is ever thrown across the dispatch boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for data-access operations.
pub type DataResult<T> = std::result::Result<T, DataError>;

/// Well-known error codes, mirroring the remote service's taxonomy.
pub mod codes {
    /// The caller lacks permission for the operation.
    pub const PERMISSION_DENIED: &str = "permission-denied";
    /// The addressed record does not exist.
    pub const NOT_FOUND: &str = "not-found";
    /// The remote service could not be reached.
    pub const UNAVAILABLE: &str = "unavailable";
    /// The request payload was rejected.
    pub const INVALID_ARGUMENT: &str = "invalid-argument";
    /// No authenticated principal, or the credentials expired.
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    /// A record with the same key already exists.
    pub const ALREADY_EXISTS: &str = "already-exists";
    /// Unclassified server-side failure.
    pub const INTERNAL: &str = "internal";
}

/// Normalized error triple carried by every `Failed` action.
///
/// The shape is uniform regardless of origin so that reducers, selectors and
/// UI layers handle one failure type. `code` is machine-readable (see
/// [`codes`]), `name` is the originating error family, `message` is
/// human-readable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{name} ({code}): {message}")]
pub struct DataError {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Originating error family (e.g. `"RemoteServiceError"`).
    pub name: String,
}

impl DataError {
    /// Create an error from its three parts.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            name: name.into(),
        }
    }

    /// `permission-denied` error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(codes::PERMISSION_DENIED, "RemoteServiceError", message)
    }

    /// `not-found` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(codes::NOT_FOUND, "RemoteServiceError", message)
    }

    /// `unavailable` error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(codes::UNAVAILABLE, "RemoteServiceError", message)
    }

    /// `invalid-argument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_ARGUMENT, "ValidationError", message)
    }

    /// `unauthenticated` error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(codes::UNAUTHENTICATED, "AuthError", message)
    }

    /// `already-exists` error.
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(codes::ALREADY_EXISTS, "RemoteServiceError", message)
    }

    /// `internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, "RemoteServiceError", message)
    }

    /// Returns `true` for `not-found`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code == codes::NOT_FOUND
    }

    /// Returns `true` for `permission-denied`.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        self.code == codes::PERMISSION_DENIED
    }

    /// Returns `true` for `unauthenticated`.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        self.code == codes::UNAUTHENTICATED
    }

    /// Returns `true` if this error is due to invalid caller input.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.code.as_str(),
            codes::INVALID_ARGUMENT | codes::ALREADY_EXISTS | codes::PERMISSION_DENIED
        )
    }

    /// Returns `true` for failures worth retrying at the caller's discretion.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.code == codes::UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_all_parts() {
        let err = DataError::not_found("no session with id s-1");
        let rendered = err.to_string();
        assert!(rendered.contains("not-found"));
        assert!(rendered.contains("RemoteServiceError"));
        assert!(rendered.contains("no session with id s-1"));
    }

    #[test]
    fn predicates_match_codes() {
        assert!(DataError::not_found("x").is_not_found());
        assert!(DataError::permission_denied("x").is_permission_denied());
        assert!(DataError::permission_denied("x").is_user_error());
        assert!(DataError::unavailable("x").is_transient());
        assert!(!DataError::internal("x").is_user_error());
    }

    #[test]
    fn round_trips_through_json() {
        let err = DataError::invalid_argument("title empty");
        let json = serde_json::to_string(&err).unwrap();
        let back: DataError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
