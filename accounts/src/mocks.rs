//! Mock collaborators for testing the accounts workflows.

use crate::model::{AuthUser, PublicUser, ThirdPartyProvider, UserId};
use crate::providers::AuthGateway;
use fitsync_core::entity::{Entity, EntityUpdate};
use fitsync_core::error::{DataError, DataResult};
use fitsync_core::query::Query;
use fitsync_core::service::EntityData;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Scripted auth gateway.
///
/// Returns a configured principal for every sign-in path, counts logout
/// calls, and supports staged latencies and one-shot failures.
#[derive(Clone)]
pub struct MockAuthGateway {
    principal: Arc<Mutex<AuthUser>>,
    delays: Arc<Mutex<VecDeque<Duration>>>,
    fail_next: Arc<Mutex<Option<DataError>>>,
    polls_until_verified: Arc<Mutex<u32>>,
    logout_calls: Arc<AtomicUsize>,
}

impl MockAuthGateway {
    /// Gateway that authenticates as the given principal.
    #[must_use]
    pub fn new(principal: AuthUser) -> Self {
        Self {
            principal: Arc::new(Mutex::new(principal)),
            delays: Arc::new(Mutex::new(VecDeque::new())),
            fail_next: Arc::new(Mutex::new(None)),
            polls_until_verified: Arc::new(Mutex::new(0)),
            logout_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Stage a latency for an upcoming call (FIFO).
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

    /// Report the email as verified only after this many `reload` calls.
    pub fn verify_after_polls(&self, polls: u32) {
        *self
            .polls_until_verified
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = polls;
    }

    /// Number of logout calls observed.
    #[must_use]
    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

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

    fn principal(&self) -> AuthUser {
        self.principal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuthGateway for MockAuthGateway {
    fn sign_up(&self, _email: &str, _password: &str) -> impl Future<Output = DataResult<AuthUser>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            Ok(this.principal())
        }
    }

    fn sign_in(&self, _email: &str, _password: &str) -> impl Future<Output = DataResult<AuthUser>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            Ok(this.principal())
        }
    }

    fn third_party(&self, _provider: ThirdPartyProvider) -> impl Future<Output = DataResult<AuthUser>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            Ok(this.principal())
        }
    }

    fn logout(&self) -> impl Future<Output = DataResult<()>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            this.logout_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn reset_password(&self, _email: &str) -> impl Future<Output = DataResult<()>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            Ok(())
        }
    }

    fn reload(&self) -> impl Future<Output = DataResult<AuthUser>> + Send {
        let this = self.clone();
        async move {
            this.gate().await?;
            let mut principal = this.principal();
            let mut remaining = this
                .polls_until_verified
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *remaining == 0 {
                principal.email_verified = true;
            } else {
                *remaining -= 1;
            }
            drop(remaining);
            Ok(principal)
        }
    }
}

/// In-memory profile-record store.
#[derive(Clone, Default)]
pub struct MockUserData {
    records: Arc<Mutex<HashMap<UserId, PublicUser>>>,
    fail_next: Arc<Mutex<Option<DataError>>>,
    fail_next_create: Arc<Mutex<Option<DataError>>>,
}

impl MockUserData {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert records directly, bypassing the service surface.
    pub fn seed(&self, users: Vec<PublicUser>) {
        let mut records = self.lock_records();
        for user in users {
            records.insert(user.id.clone(), user);
        }
    }

    /// Make the next call (any method) fail with this error.
    pub fn fail_next(&self, error: DataError) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Make the next `create` call fail with this error.
    pub fn fail_next_create(&self, error: DataError) {
        *self
            .fail_next_create
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Current contents, sorted by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PublicUser> {
        let mut users: Vec<PublicUser> = self.lock_records().values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, PublicUser>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self) -> Option<DataError> {
        self.fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl EntityData for MockUserData {
    type Entity = PublicUser;

    fn create(&self, user: PublicUser) -> impl Future<Output = DataResult<PublicUser>> + Send {
        let this = self.clone();
        async move {
            if let Some(error) = this.take_failure() {
                return Err(error);
            }
            let staged = this
                .fail_next_create
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(error) = staged {
                return Err(error);
            }
            this.lock_records().insert(user.id.clone(), user.clone());
            Ok(user)
        }
    }

    fn fetch_one(&self, id: UserId) -> impl Future<Output = DataResult<PublicUser>> + Send {
        let this = self.clone();
        async move {
            if let Some(error) = this.take_failure() {
                return Err(error);
            }
            this.lock_records()
                .get(&id)
                .cloned()
                .ok_or_else(|| DataError::not_found(format!("no user with id {id}")))
        }
    }

    fn fetch_many(&self, _query: Query) -> impl Future<Output = DataResult<Vec<PublicUser>>> + Send {
        let this = self.clone();
        async move {
            if let Some(error) = this.take_failure() {
                return Err(error);
            }
            Ok(this.snapshot())
        }
    }

    fn fetch_all(&self) -> impl Future<Output = DataResult<Vec<PublicUser>>> + Send {
        let this = self.clone();
        async move {
            if let Some(error) = this.take_failure() {
                return Err(error);
            }
            Ok(this.snapshot())
        }
    }

    fn update(
        &self,
        update: EntityUpdate<PublicUser>,
    ) -> impl Future<Output = DataResult<EntityUpdate<PublicUser>>> + Send {
        let this = self.clone();
        async move {
            if let Some(error) = this.take_failure() {
                return Err(error);
            }
            let mut records = this.lock_records();
            match records.get_mut(&update.id) {
                Some(user) => {
                    user.apply(&update.changes);
                    drop(records);
                    Ok(update)
                },
                None => Err(DataError::not_found(format!("no user with id {}", update.id))),
            }
        }
    }

    fn delete(&self, id: UserId) -> impl Future<Output = DataResult<UserId>> + Send {
        let this = self.clone();
        async move {
            if let Some(error) = this.take_failure() {
                return Err(error);
            }
            this.lock_records().remove(&id);
            Ok(id)
        }
    }

    fn batch_delete(&self, ids: Vec<UserId>) -> impl Future<Output = DataResult<Vec<UserId>>> + Send {
        let this = self.clone();
        async move {
            if let Some(error) = this.take_failure() {
                return Err(error);
            }
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
        updates: Vec<EntityUpdate<PublicUser>>,
    ) -> impl Future<Output = DataResult<Vec<EntityUpdate<PublicUser>>>> + Send {
        let this = self.clone();
        async move {
            if let Some(error) = this.take_failure() {
                return Err(error);
            }
            let mut records = this.lock_records();
            for update in &updates {
                if let Some(user) = records.get_mut(&update.id) {
                    user.apply(&update.changes);
                }
            }
            drop(records);
            Ok(updates)
        }
    }
}

/// An unverified test principal.
#[must_use]
pub fn test_principal(id: &str, email: &str) -> AuthUser {
    AuthUser {
        id: UserId::new(id),
        email: email.to_string(),
        display_name: None,
        avatar_url: None,
        email_verified: false,
    }
}
