//! Accounts environment.

use crate::model::PublicUser;
use crate::providers::AuthGateway;
use fitsync_core::environment::{Clock, Notifier};
use fitsync_core::service::EntityData;
use std::sync::Arc;

/// Accounts environment.
///
/// Contains all external collaborators needed by the accounts reducer.
///
/// # Type Parameters
///
/// - `G`: auth gateway
/// - `U`: profile-record data service
/// - `N`: notifier
#[derive(Clone)]
pub struct AccountsEnvironment<G, U, N>
where
    G: AuthGateway,
    U: EntityData<Entity = PublicUser>,
    N: Notifier + Clone,
{
    /// Authentication gateway.
    pub gateway: G,

    /// Profile-record data service.
    pub users: U,

    /// Transient user messaging.
    pub notifier: N,

    /// Clock for timestamps.
    pub clock: Arc<dyn Clock>,
}

impl<G, U, N> AccountsEnvironment<G, U, N>
where
    G: AuthGateway,
    U: EntityData<Entity = PublicUser>,
    N: Notifier + Clone,
{
    /// Create a new accounts environment.
    #[must_use]
    pub fn new(gateway: G, users: U, notifier: N, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            users,
            notifier,
            clock,
        }
    }
}
