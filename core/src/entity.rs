//! Normalized, id-keyed entity collections.
//!
//! Each entity domain owns exactly one [`EntityMap`]: a flat map keyed by the
//! entity's id plus an insertion-ordered id index. Cross-entity relations are
//! stored as id references and resolved by selector composition, never by
//! embedding one entity inside another.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// A domain entity that can live in an [`EntityMap`].
///
/// `Id` is the normalization key; `Changes` is the partial-update payload the
/// remote service accepts and returns for this entity.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Unique identifier type (string newtype per domain).
    type Id: Clone + Eq + Hash + Ord + std::fmt::Debug + Send + Sync + 'static;

    /// Partial-update payload applied by [`Entity::apply`].
    type Changes: Clone + std::fmt::Debug + Send + Sync + 'static;

    /// The normalization key of this record.
    fn id(&self) -> &Self::Id;

    /// Merge a partial update into this record in place.
    fn apply(&mut self, changes: &Self::Changes);
}

/// A partial update addressed by id, as sent to and echoed by the remote
/// service's `update`/`batch_update` operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "E::Id: Serialize, E::Changes: Serialize",
    deserialize = "E::Id: Deserialize<'de>, E::Changes: Deserialize<'de>"
))]
pub struct EntityUpdate<E: Entity> {
    /// Which record to update.
    pub id: E::Id,
    /// The fields to change.
    pub changes: E::Changes,
}

impl<E: Entity> EntityUpdate<E> {
    /// Create an update for one record.
    pub const fn new(id: E::Id, changes: E::Changes) -> Self {
        Self { id, changes }
    }
}

/// Normalized, keyed collection of records for one entity domain.
///
/// Invariants:
///
/// - the id index and the record map always hold the same key set
/// - iteration order is insertion order; [`replace_all`](Self::replace_all)
///   resets it to payload order
/// - upserting an existing key never duplicates the id index entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "E: Serialize, E::Id: Serialize",
    deserialize = "E: Deserialize<'de>, E::Id: Deserialize<'de>"
))]
pub struct EntityMap<E: Entity> {
    ids: Vec<E::Id>,
    records: HashMap<E::Id, E>,
}

impl<E: Entity> Default for EntityMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityMap<E> {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            records: HashMap::new(),
        }
    }

    /// Insert a record; no-op when the key is already present.
    ///
    /// Returns `true` if the record was inserted.
    pub fn insert_one(&mut self, entity: E) -> bool {
        let id = entity.id().clone();
        if self.records.contains_key(&id) {
            return false;
        }
        self.ids.push(id.clone());
        self.records.insert(id, entity);
        true
    }

    /// Insert many records, skipping keys already present.
    pub fn insert_many(&mut self, entities: Vec<E>) {
        for entity in entities {
            self.insert_one(entity);
        }
    }

    /// Apply a partial update to an existing record; no-op when absent.
    ///
    /// Returns `true` if a record was updated.
    pub fn update_one(&mut self, update: &EntityUpdate<E>) -> bool {
        match self.records.get_mut(&update.id) {
            Some(record) => {
                record.apply(&update.changes);
                true
            },
            None => false,
        }
    }

    /// Apply many partial updates; absent keys are skipped.
    ///
    /// Returns the number of records updated.
    pub fn update_many(&mut self, updates: &[EntityUpdate<E>]) -> usize {
        updates.iter().filter(|u| self.update_one(u)).count()
    }

    /// Insert or fully replace a record, keeping its id-index position.
    pub fn upsert_one(&mut self, entity: E) {
        let id = entity.id().clone();
        if self.records.insert(id.clone(), entity).is_none() {
            self.ids.push(id);
        }
    }

    /// Insert or fully replace many records.
    pub fn upsert_many(&mut self, entities: Vec<E>) {
        for entity in entities {
            self.upsert_one(entity);
        }
    }

    /// Remove a record by key.
    pub fn remove_one(&mut self, id: &E::Id) -> Option<E> {
        let removed = self.records.remove(id);
        if removed.is_some() {
            self.ids.retain(|existing| existing != id);
        }
        removed
    }

    /// Remove many records by key.
    ///
    /// Returns the number of records removed.
    pub fn remove_many(&mut self, ids: &[E::Id]) -> usize {
        let before = self.records.len();
        for id in ids {
            self.records.remove(id);
        }
        self.ids.retain(|id| self.records.contains_key(id));
        before - self.records.len()
    }

    /// Discard the collection and adopt the payload as the new contents.
    pub fn replace_all(&mut self, entities: Vec<E>) {
        self.clear();
        self.upsert_many(entities);
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.records.clear();
    }

    /// Look up a record by key.
    #[must_use]
    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.records.get(id)
    }

    /// Whether the key is present.
    #[must_use]
    pub fn contains(&self, id: &E::Id) -> bool {
        self.records.contains_key(id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[E::Id] {
        &self.ids
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.ids.iter().filter_map(|id| self.records.get(id))
    }

    /// Clone records out in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<E> {
        self.iter().cloned().collect()
    }
}
