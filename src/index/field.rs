//! Single-valued field indexer.

use super::buckets::BucketStore;
use super::indexer::{Indexer, PropertyIndexer};
use super::types::{BucketSizing, IndexKey, KeyFn, KeySet};
use crate::error::Result;
use crate::utils::{Comparer, Equality};
use std::any::Any;
use std::sync::Arc;

/// Extracts the indexed property of an item; `None` leaves the item out
pub type PropertyFn<P, T> = Arc<dyn Fn(&T) -> Option<P> + Send + Sync>;

/// Indexes items by one derived property so keys can be looked up by value.
///
/// Items whose property is `None` are not indexed at all; there is no bucket
/// for absent values.
pub struct FieldIndexer<P: IndexKey, K: IndexKey, T> {
    get_key: KeyFn<K, T>,
    get_property: PropertyFn<P, T>,
    store: BucketStore<P, K>,
}

impl<P, K, T> FieldIndexer<P, K, T>
where
    P: IndexKey,
    K: IndexKey,
    T: Send + Sync + 'static,
{
    pub fn new<KF, PF>(get_key: KF, get_property: PF) -> Self
    where
        KF: Fn(&T) -> K + Send + Sync + 'static,
        PF: Fn(&T) -> Option<P> + Send + Sync + 'static,
    {
        Self::from_parts(
            Arc::new(get_key),
            Arc::new(get_property),
            Equality::ordinal(),
            BucketSizing::default(),
        )
    }

    /// Property values are compared through `comparer` on rebuild and lookup
    pub fn with_comparer<KF, PF, C>(get_key: KF, get_property: PF, comparer: C) -> Self
    where
        KF: Fn(&T) -> K + Send + Sync + 'static,
        PF: Fn(&T) -> Option<P> + Send + Sync + 'static,
        C: Comparer<P> + 'static,
    {
        Self::from_parts(
            Arc::new(get_key),
            Arc::new(get_property),
            Equality::with_comparer(comparer),
            BucketSizing::default(),
        )
    }

    pub(crate) fn from_parts(
        get_key: KeyFn<K, T>,
        get_property: PropertyFn<P, T>,
        equality: Equality<P>,
        sizing: BucketSizing,
    ) -> Self {
        Self {
            get_key,
            get_property,
            store: BucketStore::new(equality, sizing),
        }
    }
}

impl<P, K, T> Indexer<K, T> for FieldIndexer<P, K, T>
where
    P: IndexKey,
    K: IndexKey,
    T: Send + Sync + 'static,
{
    fn update(&self, items: &[Arc<T>]) {
        self.store.rebuild(items.len(), |builder| {
            for item in items {
                if let Some(property) = (self.get_property)(item) {
                    builder.insert(property, (self.get_key)(item));
                }
            }
        });
    }

    fn items(&self) -> KeySet<K> {
        self.store.items()
    }

    fn bucket_count(&self) -> usize {
        self.store.bucket_count()
    }

    fn filter_erased(&self, lookup: Option<&dyn Any>) -> Result<Arc<KeySet<K>>> {
        self.store.filter_erased(lookup)
    }

    fn filter_many_erased(&self, lookups: &[&dyn Any]) -> Result<Arc<KeySet<K>>> {
        self.store.filter_many_erased(lookups)
    }

    fn contains_erased(&self, lookup: &dyn Any) -> Result<bool> {
        self.store.contains_erased(lookup)
    }
}

impl<P, K, T> PropertyIndexer<P, K, T> for FieldIndexer<P, K, T>
where
    P: IndexKey,
    K: IndexKey,
    T: Send + Sync + 'static,
{
    fn filter(&self, lookup: &P) -> Arc<KeySet<K>> {
        self.store.filter(lookup)
    }

    fn filter_many(&self, lookups: &[P]) -> Arc<KeySet<K>> {
        self.store.filter_many(lookups)
    }

    fn contains_key(&self, lookup: &P) -> bool {
        self.store.contains_key(lookup)
    }

    fn get(&self, lookup: &P) -> Result<Arc<KeySet<K>>> {
        self.store.get(lookup)
    }
}
