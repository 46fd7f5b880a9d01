//! Immutable generation of the primary key to item map.

use super::types::{IndexKey, KeyFn};
use crate::error::{IndexError, Result};
use crate::utils::Equality;
use ahash::RandomState;
use std::collections::HashMap;
use std::sync::Arc;

/// A key/item pair as stored in the map
struct Entry<K, T> {
    /// Key as produced by the key extractor (the map key may be canonicalized)
    key: K,
    item: Arc<T>,
}

impl<K: Clone, T> Clone for Entry<K, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            item: self.item.clone(),
        }
    }
}

/// One published generation of a [`PrimaryIndex`](super::PrimaryIndex).
///
/// Never modified after construction. `keys()[i]` is the key of `items()[i]`,
/// and both always agree with the lookup map.
pub struct PrimarySnapshot<K: IndexKey, T> {
    generation: u64,
    entries: HashMap<K, Entry<K, T>, RandomState>,
    keys: Vec<K>,
    items: Vec<Arc<T>>,
    equality: Equality<K>,
}

impl<K: IndexKey, T> PrimarySnapshot<K, T> {
    pub(crate) fn empty(equality: Equality<K>) -> Self {
        Self {
            generation: 0,
            entries: HashMap::default(),
            keys: Vec::new(),
            items: Vec::new(),
            equality,
        }
    }

    /// Copy this generation and apply upserts, then removals.
    ///
    /// Within `items` the last item for a key wins.
    pub(crate) fn apply<R>(&self, get_key: &KeyFn<K, T>, items: Vec<T>, to_remove: R) -> (Self, usize)
    where
        R: IntoIterator<Item = K>,
    {
        let mut entries = self.entries.clone();
        entries.reserve(items.len());

        for item in items {
            let key = get_key(&item);
            let canonical = self.equality.canonical_owned(key.clone());
            entries.insert(
                canonical,
                Entry {
                    key,
                    item: Arc::new(item),
                },
            );
        }

        let mut removed = 0;
        for key in to_remove {
            if entries.remove(&*self.equality.canonicalize(&key)).is_some() {
                removed += 1;
            }
        }

        let snapshot = Self::from_entries(entries, self.generation + 1, self.equality.clone());
        (snapshot, removed)
    }

    fn from_entries(
        entries: HashMap<K, Entry<K, T>, RandomState>,
        generation: u64,
        equality: Equality<K>,
    ) -> Self {
        let mut keys = Vec::with_capacity(entries.len());
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries.values() {
            keys.push(entry.key.clone());
            items.push(entry.item.clone());
        }

        Self {
            generation,
            entries,
            keys,
            items,
            equality,
        }
    }

    /// Number of publishes before this one; 0 for the initial empty map
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(&*self.equality.canonicalize(key))
    }

    /// Tolerant lookup: `None` when the key is absent
    pub fn filter(&self, key: &K) -> Option<&Arc<T>> {
        self.entries
            .get(&*self.equality.canonicalize(key))
            .map(|entry| &entry.item)
    }

    /// Strict lookup: [`IndexError::KeyNotFound`] when the key is absent
    pub fn get(&self, key: &K) -> Result<&Arc<T>> {
        self.filter(key).ok_or_else(|| IndexError::key_not_found(key))
    }

    /// Items for the present keys, in the order the keys were given
    pub fn filter_many<'a, I>(&self, keys: I) -> Vec<Arc<T>>
    where
        I: IntoIterator<Item = &'a K>,
    {
        keys.into_iter()
            .filter_map(|key| self.filter(key).cloned())
            .collect()
    }
}

impl<K: IndexKey, T> std::ops::Index<&K> for PrimarySnapshot<K, T> {
    type Output = T;

    /// Panics when the key is absent; use [`PrimarySnapshot::get`] to handle that case
    fn index(&self, key: &K) -> &T {
        match self.filter(key) {
            Some(item) => item,
            None => panic!("key not found: {:?}", key),
        }
    }
}

impl<K: IndexKey, T> std::fmt::Debug for PrimarySnapshot<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimarySnapshot")
            .field("generation", &self.generation)
            .field("count", &self.items.len())
            .finish()
    }
}
