//! Primary key to item store and owner of the secondary indexers.
//!
//! Writers (`update`, `add_index`) serialize on one mutex held for the whole
//! operation, including the rebuild of every registered indexer. Readers never
//! take it: they clone the `Arc` of the currently published snapshot and work
//! against that generation.

use super::field::FieldIndexer;
use super::indexer::Indexer;
use super::multi_value::{MultiValueFieldIndexer, properties_fn};
use super::snapshot::PrimarySnapshot;
use super::types::{IndexConfig, IndexKey, IndexStats, IndexerStats, KeyFn};
use crate::error::{IndexError, Result};
use crate::utils::{Comparer, Equality, RebuildPool};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span, trace};

/// A registered indexer and the name it was registered under
struct RegisteredIndexer<K, T> {
    name: String,
    indexer: Arc<dyn Indexer<K, T>>,
}

impl<K, T> Clone for RegisteredIndexer<K, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            indexer: self.indexer.clone(),
        }
    }
}

/// Key to item store with secondary indexes kept in step with it.
///
/// ```
/// use vultus::{PrimaryIndex, PropertyIndexer};
///
/// struct Trade { code: &'static str, ccy: &'static str }
///
/// let index = PrimaryIndex::new(|t: &Trade| t.code);
/// let by_ccy = index.add_field_index("ccy", |t: &Trade| Some(t.ccy)).unwrap();
///
/// index.update(vec![
///     Trade { code: "T1", ccy: "GBP" },
///     Trade { code: "T2", ccy: "EUR" },
///     Trade { code: "T3", ccy: "GBP" },
/// ]);
///
/// let gbp = by_ccy.filter(&"GBP");
/// assert_eq!(gbp.len(), 2);
/// assert_eq!(index.filter_many(gbp.iter()).len(), 2);
/// ```
pub struct PrimaryIndex<K: IndexKey, T> {
    get_key: KeyFn<K, T>,
    config: IndexConfig,
    pool: RebuildPool,
    current: RwLock<Arc<PrimarySnapshot<K, T>>>,
    indexers: RwLock<Vec<RegisteredIndexer<K, T>>>,
    writer: Mutex<()>,
}

impl<K, T> PrimaryIndex<K, T>
where
    K: IndexKey,
    T: Send + Sync + 'static,
{
    pub fn new<F>(get_key: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::build(Arc::new(get_key), Equality::ordinal(), IndexConfig::default(), RebuildPool::Global)
    }

    /// Keys are compared through `comparer` for every insert, removal and lookup.
    ///
    /// Indexers still report keys exactly as the key extractor produced them.
    /// Resolving those sets through this index works for any spelling, but a
    /// set intersected against keys spelled differently will not match.
    pub fn with_comparer<F, C>(get_key: F, comparer: C) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        C: Comparer<K> + 'static,
    {
        Self::build(
            Arc::new(get_key),
            Equality::with_comparer(comparer),
            IndexConfig::default(),
            RebuildPool::Global,
        )
    }

    pub fn with_config<F>(get_key: F, config: IndexConfig) -> Result<Self>
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        let pool = RebuildPool::new(config.rebuild_threads)?;
        Ok(Self::build(Arc::new(get_key), Equality::ordinal(), config, pool))
    }

    pub fn with_comparer_and_config<F, C>(get_key: F, comparer: C, config: IndexConfig) -> Result<Self>
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        C: Comparer<K> + 'static,
    {
        let pool = RebuildPool::new(config.rebuild_threads)?;
        Ok(Self::build(
            Arc::new(get_key),
            Equality::with_comparer(comparer),
            config,
            pool,
        ))
    }

    fn build(get_key: KeyFn<K, T>, equality: Equality<K>, config: IndexConfig, pool: RebuildPool) -> Self {
        debug!(
            rebuild_threads = pool.parallelism(),
            custom_key_equality = !equality.is_ordinal(),
            "created primary index"
        );
        Self {
            get_key,
            config,
            pool,
            current: RwLock::new(Arc::new(PrimarySnapshot::empty(equality))),
            indexers: RwLock::new(Vec::new()),
            writer: Mutex::new(()),
        }
    }

    /// Upsert `items` and rebuild every indexer. See [`update_with_removals`](Self::update_with_removals).
    pub fn update<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.update_with_removals(items, std::iter::empty());
    }

    /// Upsert `items`, then delete `to_remove`, publish the result and rebuild
    /// every registered indexer from it before returning.
    ///
    /// An empty `items` makes the whole call a no-op: `to_remove` is not
    /// applied either.
    pub fn update_with_removals<I, R>(&self, items: I, to_remove: R)
    where
        I: IntoIterator<Item = T>,
        R: IntoIterator<Item = K>,
    {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            trace!("empty batch, skipping update and removals");
            return;
        }

        let _writer = self.writer.lock();
        let start = Instant::now();
        let upserted = items.len();

        let (next, removed) = self.snapshot().apply(&self.get_key, items, to_remove);
        let next = Arc::new(next);
        *self.current.write() = next.clone();

        debug!(
            generation = next.generation(),
            upserted,
            removed,
            count = next.count(),
            "published primary snapshot"
        );

        self.rebuild_indexers(next.items());

        debug!(
            generation = next.generation(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "update complete"
        );
    }

    /// Rebuild all registered indexers concurrently and wait for every one
    fn rebuild_indexers(&self, items: &[Arc<T>]) {
        let registered = self.indexers.read().clone();

        self.pool.scatter(&registered, |entry| {
            let _span = debug_span!("rebuild_indexer", indexer = %entry.name).entered();
            let start = Instant::now();
            entry.indexer.update(items);
            trace!(elapsed_us = start.elapsed().as_micros() as u64, "indexer rebuilt");
        });
    }

    /// Register `indexer` under `name` and seed it with the current items.
    ///
    /// Runs under the writer lock, so it cannot interleave with an update.
    pub fn add_index<I>(&self, name: &str, indexer: Arc<I>) -> Result<Arc<I>>
    where
        I: Indexer<K, T> + 'static,
    {
        if name.is_empty() {
            return Err(IndexError::InvalidArgument {
                name: "name",
                reason: "indexer name must not be empty".to_string(),
            });
        }

        let _writer = self.writer.lock();

        if self.indexers.read().iter().any(|entry| entry.name == name) {
            return Err(IndexError::DuplicateName(name.to_string()));
        }

        let snapshot = self.snapshot();
        indexer.update(snapshot.items());

        self.indexers.write().push(RegisteredIndexer {
            name: name.to_string(),
            indexer: indexer.clone(),
        });

        debug!(indexer = name, generation = snapshot.generation(), "registered indexer");

        Ok(indexer)
    }

    /// Index items by one property; `None` leaves an item out of this indexer
    pub fn add_field_index<P, F>(&self, name: &str, get_property: F) -> Result<Arc<FieldIndexer<P, K, T>>>
    where
        P: IndexKey,
        F: Fn(&T) -> Option<P> + Send + Sync + 'static,
    {
        self.add_field_index_with_equality(name, get_property, Equality::ordinal())
    }

    pub fn add_field_index_with_comparer<P, F, C>(
        &self,
        name: &str,
        get_property: F,
        comparer: C,
    ) -> Result<Arc<FieldIndexer<P, K, T>>>
    where
        P: IndexKey,
        F: Fn(&T) -> Option<P> + Send + Sync + 'static,
        C: Comparer<P> + 'static,
    {
        self.add_field_index_with_equality(name, get_property, Equality::with_comparer(comparer))
    }

    fn add_field_index_with_equality<P, F>(
        &self,
        name: &str,
        get_property: F,
        equality: Equality<P>,
    ) -> Result<Arc<FieldIndexer<P, K, T>>>
    where
        P: IndexKey,
        F: Fn(&T) -> Option<P> + Send + Sync + 'static,
    {
        let indexer = FieldIndexer::from_parts(
            self.get_key.clone(),
            Arc::new(get_property),
            equality,
            self.config.bucket_sizing(),
        );
        self.add_index(name, Arc::new(indexer))
    }

    /// Index items under every value their extractor yields
    pub fn add_multi_value_index<P, F, I>(
        &self,
        name: &str,
        get_properties: F,
    ) -> Result<Arc<MultiValueFieldIndexer<P, K, T>>>
    where
        P: IndexKey,
        F: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = P>,
    {
        self.add_multi_value_index_with_equality(name, get_properties, Equality::ordinal())
    }

    pub fn add_multi_value_index_with_comparer<P, F, I, C>(
        &self,
        name: &str,
        get_properties: F,
        comparer: C,
    ) -> Result<Arc<MultiValueFieldIndexer<P, K, T>>>
    where
        P: IndexKey,
        F: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = P>,
        C: Comparer<P> + 'static,
    {
        self.add_multi_value_index_with_equality(name, get_properties, Equality::with_comparer(comparer))
    }

    fn add_multi_value_index_with_equality<P, F, I>(
        &self,
        name: &str,
        get_properties: F,
        equality: Equality<P>,
    ) -> Result<Arc<MultiValueFieldIndexer<P, K, T>>>
    where
        P: IndexKey,
        F: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = P>,
    {
        let indexer = MultiValueFieldIndexer::from_parts(
            self.get_key.clone(),
            properties_fn(get_properties),
            equality,
            self.config.bucket_sizing(),
        );
        self.add_index(name, Arc::new(indexer))
    }

    /// Type-erased handle to a registered indexer
    pub fn indexer(&self, name: &str) -> Option<Arc<dyn Indexer<K, T>>> {
        self.indexers
            .read()
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.indexer.clone())
    }

    /// Names in registration order
    pub fn indexer_names(&self) -> Vec<String> {
        self.indexers
            .read()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// The currently published generation.
    ///
    /// Hold on to it to run several reads against one consistent view.
    #[inline]
    pub fn snapshot(&self) -> Arc<PrimarySnapshot<K, T>> {
        self.current.read().clone()
    }

    pub fn count(&self) -> usize {
        self.snapshot().count()
    }

    pub fn keys(&self) -> Vec<K> {
        self.snapshot().keys().to_vec()
    }

    pub fn items(&self) -> Vec<Arc<T>> {
        self.snapshot().items().to_vec()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.snapshot().contains_key(key)
    }

    /// Tolerant lookup: `None` when the key is absent
    pub fn filter(&self, key: &K) -> Option<Arc<T>> {
        self.snapshot().filter(key).cloned()
    }

    /// Strict lookup: [`IndexError::KeyNotFound`] when the key is absent
    pub fn get(&self, key: &K) -> Result<Arc<T>> {
        self.snapshot().get(key).cloned()
    }

    /// Items for the keys that are present, in the order the keys were given
    pub fn filter_many<'a, I>(&self, keys: I) -> Vec<Arc<T>>
    where
        I: IntoIterator<Item = &'a K>,
    {
        self.snapshot().filter_many(keys)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn stats(&self) -> IndexStats {
        let snapshot = self.snapshot();
        let indexers = self
            .indexers
            .read()
            .iter()
            .map(|entry| IndexerStats {
                name: entry.name.clone(),
                bucket_count: entry.indexer.bucket_count(),
                key_count: entry.indexer.items().len(),
            })
            .collect();

        IndexStats {
            generation: snapshot.generation(),
            item_count: snapshot.count(),
            indexers,
        }
    }
}
