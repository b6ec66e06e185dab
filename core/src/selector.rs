//! Memoized read projections over store state.
//!
//! Selectors are the only read surface UI code consumes. Memoization is
//! explicit: each selector names the epoch of the minimal state slice it
//! reads, and recomputes only when that epoch has moved. Reducers bump their
//! slice's epoch on every mutation, so an untouched slice keeps its cached
//! projections across unrelated dispatches.
//!
//! [`SelectorFamily`] is the parametrized form: one memo entry per parameter
//! (e.g. per entity id), so a changing id only invalidates its own cache line.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};

/// A memoized projection of store state.
///
/// # Examples
///
/// ```
/// use fitsync_core::selector::Selector;
///
/// struct Slice { epoch: u64, items: Vec<u32> }
///
/// let doubled = Selector::new(
///     |s: &Slice| s.epoch,
///     |s: &Slice| s.items.iter().map(|n| n * 2).collect::<Vec<_>>(),
/// );
///
/// let slice = Slice { epoch: 1, items: vec![1, 2] };
/// assert_eq!(doubled.select(&slice), vec![2, 4]);
/// ```
pub struct Selector<S, T> {
    epoch: fn(&S) -> u64,
    project: Box<dyn Fn(&S) -> T + Send + Sync>,
    cache: Mutex<Option<(u64, T)>>,
}

impl<S, T: Clone> Selector<S, T> {
    /// Create a selector from an epoch accessor and a projection.
    ///
    /// `epoch` must read the version counter of exactly the slice `project`
    /// reads; a projection reading a slice whose epoch it does not observe
    /// will serve stale values.
    pub fn new(epoch: fn(&S) -> u64, project: impl Fn(&S) -> T + Send + Sync + 'static) -> Self {
        Self {
            epoch,
            project: Box::new(project),
            cache: Mutex::new(None),
        }
    }

    /// Project the state, reusing the cached value when the slice epoch has
    /// not moved since the last call.
    pub fn select(&self, state: &S) -> T {
        let current = (self.epoch)(state);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached_epoch, value)) = cache.as_ref() {
            if *cached_epoch == current {
                return value.clone();
            }
        }

        let value = (self.project)(state);
        *cache = Some((current, value.clone()));
        value
    }
}

impl<S, T> std::fmt::Debug for Selector<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector").finish_non_exhaustive()
    }
}

/// A parametrized selector factory with per-parameter memoization.
///
/// Calling [`select`](Self::select) with a key behaves like a dedicated
/// [`Selector`] bound to that key: each key caches independently, so asking
/// for entity `b` does not evict the memo for entity `a`.
pub struct SelectorFamily<S, K, T> {
    epoch: fn(&S) -> u64,
    project: Box<dyn Fn(&S, &K) -> T + Send + Sync>,
    cache: Mutex<HashMap<K, (u64, T)>>,
}

impl<S, K, T> SelectorFamily<S, K, T>
where
    K: Clone + Eq + Hash,
    T: Clone,
{
    /// Create a selector family from an epoch accessor and a keyed projection.
    pub fn new(
        epoch: fn(&S) -> u64,
        project: impl Fn(&S, &K) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            epoch,
            project: Box::new(project),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Project the state for one key, reusing that key's cached value when
    /// the slice epoch has not moved.
    pub fn select(&self, state: &S, key: &K) -> T {
        let current = (self.epoch)(state);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached_epoch, value)) = cache.get(key) {
            if *cached_epoch == current {
                return value.clone();
            }
        }

        let value = (self.project)(state, key);
        cache.insert(key.clone(), (current, value.clone()));
        value
    }

    /// Drop memo entries whose epoch is stale.
    ///
    /// Long-lived families over high-churn keys can call this from a
    /// housekeeping point to bound memory; correctness never requires it.
    pub fn evict_stale(&self, state: &S) {
        let current = (self.epoch)(state);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.retain(|_, (epoch, _)| *epoch == current);
    }
}

impl<S, K, T> std::fmt::Debug for SelectorFamily<S, K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorFamily").finish_non_exhaustive()
    }
}
