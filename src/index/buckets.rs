//! Property to key-set storage shared by the field indexers.
//!
//! Each rebuild constructs a complete replacement map and publishes it with a
//! single `Arc` swap, so readers see either the old generation or the new one.
//! Buckets are `Arc`ed individually; a lookup hands out the bucket itself
//! instead of copying it.

use super::types::{BucketSizing, IndexKey, KeySet};
use crate::error::{IndexError, Result};
use crate::utils::Equality;
use ahash::RandomState;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

type Buckets<P, K> = HashMap<P, Arc<KeySet<K>>, RandomState>;

/// Accumulates `(property, key)` pairs during a rebuild
pub struct BucketBuilder<'a, P: IndexKey, K: IndexKey> {
    equality: &'a Equality<P>,
    capacity: usize,
    buckets: HashMap<P, KeySet<K>, RandomState>,
}

impl<P: IndexKey, K: IndexKey> BucketBuilder<'_, P, K> {
    #[inline]
    pub fn insert(&mut self, property: P, key: K) {
        let property = self.equality.canonical_owned(property);
        let capacity = self.capacity;
        self.buckets
            .entry(property)
            .or_insert_with(|| KeySet::with_capacity_and_hasher(capacity, RandomState::new()))
            .insert(key);
    }
}

/// Published property map plus the lock serializing its rebuilds
pub struct BucketStore<P: IndexKey, K: IndexKey> {
    equality: Equality<P>,
    sizing: BucketSizing,
    buckets: RwLock<Arc<Buckets<P, K>>>,
    empty: Arc<KeySet<K>>,
    writer: Mutex<()>,
}

impl<P: IndexKey, K: IndexKey> BucketStore<P, K> {
    pub fn new(equality: Equality<P>, sizing: BucketSizing) -> Self {
        Self {
            equality,
            sizing,
            buckets: RwLock::new(Arc::new(Buckets::default())),
            empty: Arc::new(KeySet::default()),
            writer: Mutex::new(()),
        }
    }

    /// Build a fresh map with `fill` and publish it.
    ///
    /// The store's writer lock is held for the whole build; readers keep using
    /// the previous map until the swap.
    pub fn rebuild<F>(&self, item_count: usize, fill: F)
    where
        F: FnOnce(&mut BucketBuilder<'_, P, K>),
    {
        let _writer = self.writer.lock();

        let mut builder = BucketBuilder {
            equality: &self.equality,
            capacity: self.sizing.initial_capacity(item_count),
            buckets: HashMap::default(),
        };
        fill(&mut builder);

        let rebuilt: Buckets<P, K> = builder
            .buckets
            .into_iter()
            .map(|(property, keys)| (property, Arc::new(keys)))
            .collect();

        trace!(items = item_count, buckets = rebuilt.len(), "rebuilt property buckets");

        *self.buckets.write() = Arc::new(rebuilt);
    }

    #[inline]
    fn snapshot(&self) -> Arc<Buckets<P, K>> {
        self.buckets.read().clone()
    }

    pub fn filter(&self, lookup: &P) -> Arc<KeySet<K>> {
        let snapshot = self.snapshot();
        let canonical = self.equality.canonicalize(lookup);
        snapshot
            .get(&*canonical)
            .cloned()
            .unwrap_or_else(|| self.empty.clone())
    }

    pub fn filter_many<'a, I>(&self, lookups: I) -> Arc<KeySet<K>>
    where
        I: IntoIterator<Item = &'a P>,
    {
        let snapshot = self.snapshot();
        let mut union = KeySet::default();

        for lookup in lookups {
            if let Some(keys) = snapshot.get(&*self.equality.canonicalize(lookup)) {
                union.extend(keys.iter().cloned());
            }
        }

        Arc::new(union)
    }

    pub fn contains_key(&self, lookup: &P) -> bool {
        self.snapshot()
            .contains_key(&*self.equality.canonicalize(lookup))
    }

    pub fn get(&self, lookup: &P) -> Result<Arc<KeySet<K>>> {
        self.snapshot()
            .get(&*self.equality.canonicalize(lookup))
            .cloned()
            .ok_or_else(|| IndexError::key_not_found(lookup))
    }

    pub fn items(&self) -> KeySet<K> {
        self.snapshot()
            .values()
            .flat_map(|keys| keys.iter().cloned())
            .collect()
    }

    pub fn bucket_count(&self) -> usize {
        self.snapshot().len()
    }

    fn downcast<'a>(lookup: &'a dyn Any, context: &'static str) -> Result<&'a P> {
        lookup
            .downcast_ref::<P>()
            .ok_or_else(|| IndexError::type_mismatch::<P>(context))
    }

    pub fn filter_erased(&self, lookup: Option<&dyn Any>) -> Result<Arc<KeySet<K>>> {
        match lookup {
            Some(lookup) => Ok(self.filter(Self::downcast(lookup, "filter")?)),
            None => Ok(self.empty.clone()),
        }
    }

    pub fn filter_many_erased(&self, lookups: &[&dyn Any]) -> Result<Arc<KeySet<K>>> {
        if lookups.is_empty() {
            return Ok(self.empty.clone());
        }

        // Check every value before touching the map
        let typed = lookups
            .iter()
            .map(|lookup| Self::downcast(*lookup, "filter_many"))
            .collect::<Result<Vec<&P>>>()?;

        Ok(self.filter_many(typed))
    }

    pub fn contains_erased(&self, lookup: &dyn Any) -> Result<bool> {
        Ok(self.contains_key(Self::downcast(lookup, "contains_key")?))
    }
}
