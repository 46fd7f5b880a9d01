//! Secondary indexer contracts.
//!
//! An indexer is an inverted index from a property derived from each item to
//! the set of primary keys that produced it. Results are keys, not items;
//! resolve them through [`PrimaryIndex::filter_many`](super::PrimaryIndex::filter_many).

use super::types::KeySet;
use crate::error::Result;
use std::any::Any;
use std::sync::Arc;

/// Property-agnostic view of a secondary indexer.
///
/// This is what a [`PrimaryIndex`](super::PrimaryIndex) stores and rebuilds.
/// The `*_erased` lookups take the property as `&dyn Any` for call sites that
/// only hold a type-erased value; a value of any other type than the one the
/// indexer was built with is reported as [`IndexError::TypeMismatch`](crate::IndexError::TypeMismatch).
pub trait Indexer<K, T>: Send + Sync {
    /// Replace the whole property map with one built from `items`
    fn update(&self, items: &[Arc<T>]);

    /// Union of the keys in every bucket
    fn items(&self) -> KeySet<K>;

    /// Number of distinct property values currently indexed
    fn bucket_count(&self) -> usize;

    /// `None` yields an empty set
    fn filter_erased(&self, lookup: Option<&dyn Any>) -> Result<Arc<KeySet<K>>>;

    /// Union over all lookups; an empty slice yields an empty set
    fn filter_many_erased(&self, lookups: &[&dyn Any]) -> Result<Arc<KeySet<K>>>;

    fn contains_erased(&self, lookup: &dyn Any) -> Result<bool>;
}

/// Typed lookups against an indexer over property `P`.
pub trait PropertyIndexer<P, K, T>: Indexer<K, T> {
    /// Keys bucketed under `lookup`, empty when the property is unknown
    fn filter(&self, lookup: &P) -> Arc<KeySet<K>>;

    /// Union of the buckets of every lookup. Intersecting the results of
    /// different indexers is left to the caller.
    fn filter_many(&self, lookups: &[P]) -> Arc<KeySet<K>>;

    fn contains_key(&self, lookup: &P) -> bool;

    /// Strict lookup: [`IndexError::KeyNotFound`](crate::IndexError::KeyNotFound) when no bucket exists
    fn get(&self, lookup: &P) -> Result<Arc<KeySet<K>>>;

    /// Absent lookups yield an empty set
    fn filter_opt(&self, lookup: Option<&P>) -> Arc<KeySet<K>> {
        match lookup {
            Some(lookup) => self.filter(lookup),
            None => Arc::new(KeySet::default()),
        }
    }
}
