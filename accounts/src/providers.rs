//! Authentication gateway trait.
//!
//! Abstracts the managed identity provider (email/password and third-party
//! sign-in). Implementations normalize every failure to
//! [`DataError`](fitsync_core::error::DataError) before returning.

use crate::model::{AuthUser, ThirdPartyProvider};
use fitsync_core::error::DataResult;
use std::future::Future;

/// Authentication collaborator.
///
/// All methods return `Send` futures so workflow effects can run them on
/// spawned tasks.
pub trait AuthGateway: Clone + Send + Sync + 'static {
    /// Register a new account with email and password.
    ///
    /// # Errors
    ///
    /// Returns `already-exists` for a taken email, `invalid-argument` for a
    /// rejected password, `unavailable` on transport failure.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = DataResult<AuthUser>> + Send;

    /// Authenticate an existing account with email and password.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated` for bad credentials, `unavailable` on
    /// transport failure.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = DataResult<AuthUser>> + Send;

    /// Authenticate through a third-party provider popup/redirect.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated` when the provider flow is dismissed or
    /// rejected.
    fn third_party(
        &self,
        provider: ThirdPartyProvider,
    ) -> impl Future<Output = DataResult<AuthUser>> + Send;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns `unavailable` on transport failure.
    fn logout(&self) -> impl Future<Output = DataResult<()>> + Send;

    /// Send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `not-found` for an unknown email, `unavailable` on transport
    /// failure.
    fn reset_password(&self, email: &str) -> impl Future<Output = DataResult<()>> + Send;

    /// Reload the current principal's credentials (verification polling).
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated` when no session exists.
    fn reload(&self) -> impl Future<Output = DataResult<AuthUser>> + Send;
}
