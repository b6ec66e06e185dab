//! The remote data-access collaborator.
//!
//! One [`EntityData`] implementation exists per entity domain. The trait is an
//! interface over an opaque managed backend exposing CRUD + query operations;
//! the store never talks to the network directly, and transient-failure policy
//! (timeouts, retries) belongs to implementations, not to the store runtime.

use crate::entity::{Entity, EntityUpdate};
use crate::error::DataResult;
use crate::query::Query;
use std::future::Future;

/// Data-access service for one entity domain.
///
/// All methods return `Send` futures so effects can run them on the store's
/// spawned tasks. Errors are already normalized to
/// [`DataError`](crate::error::DataError) by the implementation.
///
/// Update-shaped operations echo the applied partial back; the reducer merges
/// that echo into the normalized collection instead of refetching.
pub trait EntityData: Clone + Send + Sync + 'static {
    /// The entity domain this service handles.
    type Entity: Entity;

    /// Persist a new record, returning it as stored (ids and server
    /// timestamps filled in).
    fn create(
        &self,
        entity: Self::Entity,
    ) -> impl Future<Output = DataResult<Self::Entity>> + Send;

    /// Fetch one record by id.
    fn fetch_one(
        &self,
        id: <Self::Entity as Entity>::Id,
    ) -> impl Future<Output = DataResult<Self::Entity>> + Send;

    /// Fetch records matching a query.
    fn fetch_many(
        &self,
        query: Query,
    ) -> impl Future<Output = DataResult<Vec<Self::Entity>>> + Send;

    /// Fetch every record visible to the caller.
    fn fetch_all(&self) -> impl Future<Output = DataResult<Vec<Self::Entity>>> + Send;

    /// Apply a partial update, echoing the applied partial.
    fn update(
        &self,
        update: EntityUpdate<Self::Entity>,
    ) -> impl Future<Output = DataResult<EntityUpdate<Self::Entity>>> + Send;

    /// Delete one record, echoing its id.
    fn delete(
        &self,
        id: <Self::Entity as Entity>::Id,
    ) -> impl Future<Output = DataResult<<Self::Entity as Entity>::Id>> + Send;

    /// Delete many records in one round trip, echoing the ids.
    fn batch_delete(
        &self,
        ids: Vec<<Self::Entity as Entity>::Id>,
    ) -> impl Future<Output = DataResult<Vec<<Self::Entity as Entity>::Id>>> + Send;

    /// Apply many partial updates in one round trip, echoing them.
    fn batch_update(
        &self,
        updates: Vec<EntityUpdate<Self::Entity>>,
    ) -> impl Future<Output = DataResult<Vec<EntityUpdate<Self::Entity>>>> + Send;
}
