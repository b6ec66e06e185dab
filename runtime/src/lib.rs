//! # FitSync Runtime
//!
//! Runtime implementation for the FitSync architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: the single mutation entry point; owns the state behind an
//!   async lock and runs the reducer for every dispatched action
//! - **Effect Executor**: executes effect descriptions and feeds terminal
//!   actions back into the reducer
//! - **Serial Queues**: per-key FIFO workers implementing exclusive
//!   composition for mutations
//! - **Supersede Epochs**: per-key version counters implementing latest-wins
//!   composition for fetches
//!
//! ## Example
//!
//! ```ignore
//! use fitsync_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Dispatch a request
//! let handle = store.send(SessionAction::FetchAllRequested).await?;
//! handle.wait().await;
//!
//! // Read state
//! let count = store.state(|s| s.sessions.records.len()).await;
//! ```
//!
//! No retry, circuit-breaking, or timeout policy lives in this crate:
//! transient-failure handling belongs to the injected data service.

use fitsync_core::effect::{ActionFuture, Effect, OpKey};
use fitsync_core::reducer::Reducer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, mpsc, watch};

/// Prometheus metrics for observability
pub mod metrics_server;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown
        /// initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// The action broadcast channel was closed, typically because the
        /// store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use fitsync_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(256)
///     .with_shutdown_timeout(Duration::from_secs(60));
/// assert_eq!(config.broadcast_capacity, 256);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Action broadcast channel capacity (number of actions buffered for
    /// observers before they lag)
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Set the broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the dispatched action's
/// effects to complete.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(SessionAction::FetchAllRequested).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The fetch effect has produced its terminal action
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle
    ///
    /// Returns the handle (for the caller to wait on) and the tracking
    /// context (threaded through effect execution).
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all effects of the dispatched action to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            let _ = self.completion.changed().await;
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Ensures the counter is always released, even if the effect panics or a
/// queued job is dropped without running.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Internal: a queued serial effect with its tracking guards
///
/// Guards are carried by value so that a job dropped unprocessed (e.g. when
/// shutdown clears the queues) still releases its counters.
struct SerialJob<A> {
    future: ActionFuture<A>,
    _tracking: DecrementGuard,
    _pending: AtomicCounterGuard,
}

/// The Store - runtime coordinator for a reducer
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent reads, serialized writes)
/// 2. Reducer (state transition logic)
/// 3. Environment (injected collaborators)
/// 4. Effect execution with the two scheduling policies
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Concurrency
///
/// All dispatches serialize at the reducer (single writer). `Serial` effects
/// sharing a key execute strictly in submission order; `Supersede` effects
/// sharing a key drop superseded results before they reach the store.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    shutdown: Arc<AtomicBool>,
    pending_effects: Arc<AtomicUsize>,
    /// Action broadcast channel for observing actions produced by effects.
    ///
    /// All terminal actions produced by effects are broadcast to observers.
    /// This enables request/response waiting (`send_and_wait_for`) and
    /// UI-facing action streams.
    action_broadcast: broadcast::Sender<A>,
    serial_queues: Arc<Mutex<HashMap<OpKey, mpsc::UnboundedSender<SerialJob<A>>>>>,
    fetch_epochs: Arc<Mutex<HashMap<OpKey, u64>>>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            shutdown: Arc::clone(&self.shutdown),
            pending_effects: Arc::clone(&self.pending_effects),
            action_broadcast: self.action_broadcast.clone(),
            serial_queues: Arc::clone(&self.serial_queues),
            fetch_epochs: Arc::clone(&self.fetch_epochs),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Uses the default configuration (broadcast capacity 16).
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Create a new Store with custom configuration
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = StoreConfig::default().with_broadcast_capacity(256);
    /// let store = Store::with_config(state, reducer, env, config);
    /// ```
    #[must_use]
    pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
        let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
            action_broadcast,
            serial_queues: Arc::new(Mutex::new(HashMap::new())),
            fetch_epochs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Send an action to the store
    ///
    /// This is the primary way to interact with the store:
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Executes returned effects asynchronously
    /// 4. Effects may produce terminal actions (feedback loop)
    ///
    /// # Concurrency and Effect Execution
    ///
    /// - The reducer executes synchronously while holding the write lock
    /// - Effects execute asynchronously in spawned tasks or serial queues
    /// - `send()` returns after starting effect execution, not completion
    /// - Multiple concurrent `send()` calls serialize at the reducer level
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting
    /// down.
    ///
    /// # Panics
    ///
    /// If the reducer panics, the panic propagates and halts the store.
    /// Reducers should be pure functions that do not panic.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        tracing::debug!("Processing action");
        metrics::counter!("store.actions.total").increment(1);

        let (handle, tracking) = EffectHandle::new();

        let effects = {
            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            let duration = start.elapsed();
            metrics::histogram!("store.reducer.duration_seconds").record(duration.as_secs_f64());

            tracing::trace!("Reducer completed, returned {} effects", effects.len());
            effects
        };

        for effect in effects {
            self.execute_effect_internal(effect, tracking.clone());
        }
        tracing::debug!("Action processing completed, returning handle");

        Ok(handle)
    }

    /// Send an action and wait for a matching result action
    ///
    /// This method is designed for request/response flows: subscribe to the
    /// action broadcast, send the request, then wait for the first terminal
    /// action matching the predicate. Terminal actions are broadcast after
    /// they have been folded into state, so when this returns the state
    /// reflects the matched action.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: timeout expired before a matching action
    /// - [`StoreError::ChannelClosed`]: broadcast closed (store shutting down)
    /// - [`StoreError::ShutdownInProgress`]: store is shutting down
    ///
    /// # Example
    ///
    /// ```ignore
    /// let result = store.send_and_wait_for(
    ///     SessionAction::CreateRequested { draft },
    ///     |a| matches!(a, SessionAction::CreateCompleted { .. } | SessionAction::CreateFailed { .. }),
    ///     Duration::from_secs(10),
    /// ).await?;
    /// ```
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        // Subscribe BEFORE sending to avoid missing a fast terminal action
        let mut rx = self.action_broadcast.subscribe();

        self.send(action).await?;

        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {}, // Not the action we want, keep waiting
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Slow consumer, some actions were dropped.
                        // Keep waiting - the timeout catches a dropped terminal.
                        tracing::warn!(skipped, "Action observer lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Subscribe to all terminal actions from this store
    ///
    /// Returns a receiver that gets a clone of every action produced by
    /// effects, each broadcast after it has been folded into state. Initial
    /// actions sent via `send` are not broadcast.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Read current state via a closure
    ///
    /// Access state through a closure to ensure the lock is released
    /// promptly:
    ///
    /// ```ignore
    /// let count = store.state(|s| s.sessions.records.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Initiate graceful shutdown of the store
    ///
    /// 1. Sets the shutdown flag (rejecting new actions)
    /// 2. Waits for pending effects to complete (with timeout)
    /// 3. Closes the serial queues so their workers exit
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
    /// all pending effects complete.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        metrics::counter!("store.shutdown.initiated").increment(1);

        self.shutdown.store(true, Ordering::Release);

        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(100);

        loop {
            let pending = self.pending_effects.load(Ordering::Acquire);

            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
                metrics::counter!("store.shutdown.completed").increment(1);
                self.close_serial_queues();
                return Ok(());
            }

            if start.elapsed() >= timeout {
                tracing::error!(pending_effects = pending, "Shutdown timed out");
                metrics::counter!("store.shutdown.timeout").increment(1);
                self.close_serial_queues();
                return Err(StoreError::ShutdownTimeout(pending));
            }

            tracing::debug!(
                pending_effects = pending,
                elapsed_ms = start.elapsed().as_millis(),
                "Waiting for effects to complete"
            );

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Drop all serial queue senders so the per-key workers drain and exit.
    fn close_serial_queues(&self) {
        self.serial_queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get or spawn the serial worker for a key.
    ///
    /// The worker processes jobs strictly in FIFO order: one job fully
    /// completes (including the dispatch of its feedback action) before the
    /// next starts. The worker exits when the queue sender is dropped.
    fn serial_sender(&self, key: OpKey) -> mpsc::UnboundedSender<SerialJob<A>> {
        let mut queues = self
            .serial_queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(tx) = queues.get(&key) {
            if !tx.is_closed() {
                return tx.clone();
            }
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<SerialJob<A>>();
        let store = self.clone();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                if let Some(action) = job.future.await {
                    tracing::trace!(key = %key, "Serial effect produced an action");
                    // Dispatch before broadcasting so observers of the
                    // terminal action always see the reduced state.
                    if store.send(action.clone()).await.is_err() {
                        tracing::debug!(key = %key, "Feedback rejected during shutdown");
                    }
                    let _ = store.action_broadcast.send(action);
                }
                // Job guards drop here, releasing the counters before the
                // next job starts.
            }
            tracing::debug!(key = %key, "Serial worker exiting");
        });

        queues.insert(key, tx.clone());
        tx
    }

    /// Execute an effect with tracking
    ///
    /// # Effect Types
    ///
    /// - `None`: no-op
    /// - `Future`: runs immediately on a spawned task
    /// - `Delay`: waits, then dispatches the action
    /// - `Parallel`: executes effects concurrently under the same tracking
    /// - `Sequential`: executes effects in order, waiting for each
    /// - `Serial`: enqueues on the key's FIFO worker (exclusive composition)
    /// - `Supersede`: bumps the key's epoch; older in-flight same-key results
    ///   are dropped instead of dispatched (latest-wins composition)
    ///
    /// # Error Handling Strategy
    ///
    /// Effects are fire-and-forget from the store's perspective: a failed
    /// collaborator call surfaces as the `Failed` action the effect itself
    /// produces. The [`DecrementGuard`] keeps the counters correct even if an
    /// effect panics.
    #[allow(clippy::too_many_lines)]
    fn execute_effect_internal(&self, effect: Effect<A>, tracking: EffectTracking) {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Future(fut) => {
                tracing::trace!("Executing Effect::Future");
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                tracking.increment();

                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let tracking_clone = tracking.clone();
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking_clone);
                    let _pending_guard = pending_guard;

                    if let Some(action) = fut.await {
                        tracing::trace!("Effect::Future produced an action, sending to store");
                        let _ = store.send(action.clone()).await;
                        let _ = store.action_broadcast.send(action);
                    } else {
                        tracing::trace!("Effect::Future completed with no action");
                    }
                });
            },
            Effect::Delay { duration, action } => {
                tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                tracking.increment();

                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let tracking_clone = tracking.clone();
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking_clone);
                    let _pending_guard = pending_guard;

                    tokio::time::sleep(duration).await;
                    tracing::trace!("Effect::Delay completed, sending action");

                    let _ = store.send((*action).clone()).await;
                    let _ = store.action_broadcast.send(*action);
                });
            },
            Effect::Parallel(effects) => {
                tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                for effect in effects {
                    self.execute_effect_internal(effect, tracking.clone());
                }
            },
            Effect::Sequential(effects) => {
                let effect_count = effects.len();
                tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);

                tracking.increment();

                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let tracking_clone = tracking.clone();
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking_clone);
                    let _pending_guard = pending_guard;

                    for (idx, effect) in effects.into_iter().enumerate() {
                        tracing::trace!("Executing sequential effect {} of {}", idx + 1, effect_count);

                        let (sub_tx, mut sub_rx) = watch::channel(());
                        let sub_tracking = EffectTracking {
                            counter: Arc::new(AtomicUsize::new(0)),
                            notifier: sub_tx,
                        };

                        store.execute_effect_internal(effect, sub_tracking.clone());

                        // Wait for this effect to complete before continuing
                        while sub_tracking.counter.load(Ordering::SeqCst) > 0 {
                            let _ = sub_rx.changed().await;
                        }
                    }
                    tracing::trace!("Effect::Sequential completed");
                });
            },
            Effect::Serial { key, future } => {
                tracing::trace!(key = %key, "Enqueueing Effect::Serial");
                metrics::counter!("store.effects.executed", "type" => "serial").increment(1);
                tracking.increment();

                self.pending_effects.fetch_add(1, Ordering::SeqCst);

                let job = SerialJob {
                    future,
                    _tracking: DecrementGuard(tracking.clone()),
                    _pending: AtomicCounterGuard(Arc::clone(&self.pending_effects)),
                };

                // A send failure means the queue was closed by shutdown; the
                // dropped job's guards release the counters.
                let _ = self.serial_sender(key).send(job);
            },
            Effect::Supersede { key, future } => {
                tracing::trace!(key = %key, "Executing Effect::Supersede");
                metrics::counter!("store.effects.executed", "type" => "supersede").increment(1);
                tracking.increment();

                // Claim the next epoch for this key; older in-flight effects
                // with the same key become stale.
                let epoch = {
                    let mut epochs = self
                        .fetch_epochs
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    let slot = epochs.entry(key).or_insert(0);
                    *slot += 1;
                    *slot
                };

                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let tracking_clone = tracking.clone();
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking_clone);
                    let _pending_guard = pending_guard;

                    let result = future.await;

                    let current = store
                        .fetch_epochs
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .get(&key)
                        .copied()
                        .unwrap_or(0);

                    if current != epoch {
                        tracing::debug!(key = %key, epoch, current, "Fetch superseded, dropping result");
                        metrics::counter!("store.fetch.superseded").increment(1);
                        return;
                    }

                    if let Some(action) = result {
                        let _ = store.send(action.clone()).await;
                        let _ = store.action_broadcast.send(action);
                    }
                });
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_handle_returns_immediately() {
        let mut handle = EffectHandle::completed();
        handle.wait().await;
    }

    #[test]
    fn config_builders() {
        let config = StoreConfig::default()
            .with_broadcast_capacity(64)
            .with_shutdown_timeout(Duration::from_secs(5));
        assert_eq!(config.broadcast_capacity, 64);
        assert_eq!(config.default_shutdown_timeout, Duration::from_secs(5));
    }
}
