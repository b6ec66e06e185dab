//! In-memory data service for tests.
//!
//! Simulates the remote backend without a network: records live in a shared
//! map, calls can be given staged latencies (to provoke race windows) and
//! one-shot failures. Exposed publicly so integration tests and embedding
//! applications can run the full store against it.

use fitsync_core::entity::{Entity, EntityUpdate};
use fitsync_core::error::{DataError, DataResult};
use fitsync_core::query::Query;
use fitsync_core::service::EntityData;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Filter hook deciding whether a record matches a query.
type QueryFilter<E> = Arc<dyn Fn(&Query, &E) -> bool + Send + Sync>;

/// In-memory implementation of [`EntityData`] for one entity domain.
///
/// # Example
///
/// ```ignore
/// let sessions = InMemoryEntityData::<TrainingSession>::new();
/// sessions.seed(vec![session]);
/// sessions.push_delay(Duration::from_millis(80)); // next call is slow
/// sessions.fail_next(DataError::unavailable("offline"));
/// ```
pub struct InMemoryEntityData<E: Entity> {
    records: Arc<Mutex<HashMap<E::Id, E>>>,
    delays: Arc<Mutex<VecDeque<Duration>>>,
    fail_next: Arc<Mutex<Option<DataError>>>,
    query_filter: QueryFilter<E>,
}

impl<E: Entity> Clone for InMemoryEntityData<E> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            delays: Arc::clone(&self.delays),
            fail_next: Arc::clone(&self.fail_next),
            query_filter: Arc::clone(&self.query_filter),
        }
    }
}

impl<E: Entity> Default for InMemoryEntityData<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryEntityData<E> {
    /// Empty service matching every record to every query.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            delays: Arc::new(Mutex::new(VecDeque::new())),
            fail_next: Arc::new(Mutex::new(None)),
            query_filter: Arc::new(|_, _| true),
        }
    }

    /// Replace the query filter hook used by `fetch_many`.
    #[must_use]
    pub fn with_query_filter(
        mut self,
        filter: impl Fn(&Query, &E) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.query_filter = Arc::new(filter);
        self
    }

    /// Insert records directly, bypassing the service surface.
    pub fn seed(&self, entities: Vec<E>) {
        let mut records = self.lock_records();
        for entity in entities {
            records.insert(entity.id().clone(), entity);
        }
    }

    /// Stage a latency for an upcoming call (FIFO; unstaged calls return
    /// immediately).
    pub fn push_delay(&self, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(delay);
    }

    /// Make the next call fail with this error.
    pub fn fail_next(&self, error: DataError) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Current contents, sorted by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<E> {
        let mut entities: Vec<E> = self.lock_records().values().cloned().collect();
        entities.sort_by(|a, b| a.id().cmp(b.id()));
        entities
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, HashMap<E::Id, E>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep through the next staged delay, then surface a staged failure.
    async fn gate(&self) -> DataResult<()> {
        let delay = self
            .delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl<E: Entity> EntityData for InMemoryEntityData<E> {
    type Entity = E;

    fn create(&self, entity: E) -> impl Future<Output = DataResult<E>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            this.lock_records().insert(entity.id().clone(), entity.clone());
            Ok(entity)
        }
    }

    fn fetch_one(&self, id: E::Id) -> impl Future<Output = DataResult<E>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            this.lock_records()
                .get(&id)
                .cloned()
                .ok_or_else(|| DataError::not_found(format!("no record with id {id:?}")))
        }
    }

    fn fetch_many(&self, query: Query) -> impl Future<Output = DataResult<Vec<E>>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            let mut entities: Vec<E> = {
                let records = this.lock_records();
                records
                    .values()
                    .filter(|entity| (this.query_filter)(&query, entity))
                    .cloned()
                    .collect()
            };
            entities.sort_by(|a, b| a.id().cmp(b.id()));
            if let Some(limit) = query.limit {
                entities.truncate(limit);
            }
            Ok(entities)
        }
    }

    fn fetch_all(&self) -> impl Future<Output = DataResult<Vec<E>>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            Ok(this.snapshot())
        }
    }

    fn update(
        &self,
        update: EntityUpdate<E>,
    ) -> impl Future<Output = DataResult<EntityUpdate<E>>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            let mut records = this.lock_records();
            match records.get_mut(&update.id) {
                Some(entity) => {
                    entity.apply(&update.changes);
                    drop(records);
                    Ok(update)
                },
                None => Err(DataError::not_found(format!(
                    "no record with id {:?}",
                    update.id
                ))),
            }
        }
    }

    fn delete(&self, id: E::Id) -> impl Future<Output = DataResult<E::Id>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            // Deletes are idempotent, as on the real backend.
            this.lock_records().remove(&id);
            Ok(id)
        }
    }

    fn batch_delete(&self, ids: Vec<E::Id>) -> impl Future<Output = DataResult<Vec<E::Id>>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            let mut records = this.lock_records();
            for id in &ids {
                records.remove(id);
            }
            drop(records);
            Ok(ids)
        }
    }

    fn batch_update(
        &self,
        updates: Vec<EntityUpdate<E>>,
    ) -> impl Future<Output = DataResult<Vec<EntityUpdate<E>>>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            let mut records = this.lock_records();
            for update in &updates {
                if let Some(entity) = records.get_mut(&update.id) {
                    entity.apply(&update.changes);
                }
            }
            drop(records);
            Ok(updates)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::session;
    use crate::model::{SessionChanges, SessionFields, TrainingSession};

    #[tokio::test]
    async fn create_then_fetch_round_trip() {
        let service = InMemoryEntityData::<TrainingSession>::new();
        let stored = service.create(session("s-1", "Leg Day", "FitChan")).await.unwrap();
        let fetched = service.fetch_one(stored.id.clone()).await.unwrap();
        assert_eq!(stored, fetched);
    }

    #[tokio::test]
    async fn fetch_one_misses_with_not_found() {
        let service = InMemoryEntityData::<TrainingSession>::new();
        let err = service
            .fetch_one(crate::model::SessionId::new("ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn staged_failure_fires_once() {
        let service = InMemoryEntityData::<TrainingSession>::new();
        service.seed(vec![session("s-1", "Leg Day", "FitChan")]);
        service.fail_next(DataError::unavailable("offline"));

        assert!(service.fetch_all().await.is_err());
        assert_eq!(service.fetch_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_applies_changes() {
        let service = InMemoryEntityData::<TrainingSession>::new();
        service.seed(vec![session("s-1", "Leg Day", "FitChan")]);

        let update = EntityUpdate::<TrainingSession>::new(
            crate::model::SessionId::new("s-1"),
            SessionChanges::Fields(SessionFields {
                title: Some("Renamed".to_string()),
                ..SessionFields::default()
            }),
        );
        service.update(update).await.unwrap();
        assert_eq!(service.snapshot()[0].title, "Renamed");
    }
}
