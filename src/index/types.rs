use crate::error::Result;
use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Bounds shared by primary keys and indexed property values
pub trait IndexKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> IndexKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Set of primary keys returned by indexer lookups.
///
/// Holds keys as the key extractor returned them, uncanonicalized: the
/// primary index's key comparer does not apply to set membership.
pub type KeySet<K> = HashSet<K, RandomState>;

/// Extracts the primary key of an item
pub type KeyFn<K, T> = Arc<dyn Fn(&T) -> K + Send + Sync>;

/// Configuration for a primary index and the indexers it creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Threads in the pool that rebuilds indexers after an update.
    /// 0 shares rayon's global pool.
    #[serde(default = "default_rebuild_threads")]
    pub rebuild_threads: usize,

    /// Buckets start with `item_count / bucket_capacity_divisor` slots.
    /// 0 disables pre-sizing.
    #[serde(default = "default_bucket_capacity_divisor")]
    pub bucket_capacity_divisor: usize,

    /// Upper bound for the pre-sized bucket capacity
    #[serde(default = "default_max_initial_bucket_capacity")]
    pub max_initial_bucket_capacity: usize,
}

fn default_rebuild_threads() -> usize {
    0
}

fn default_bucket_capacity_divisor() -> usize {
    // Assume at least two distinct values per indexed property
    2
}

fn default_max_initial_bucket_capacity() -> usize {
    4096
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            rebuild_threads: default_rebuild_threads(),
            bucket_capacity_divisor: default_bucket_capacity_divisor(),
            max_initial_bucket_capacity: default_max_initial_bucket_capacity(),
        }
    }
}

impl IndexConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn bucket_sizing(&self) -> BucketSizing {
        BucketSizing {
            divisor: self.bucket_capacity_divisor,
            max: self.max_initial_bucket_capacity,
        }
    }
}

/// Initial capacity heuristic for key-set buckets.
///
/// Only affects allocation; bucket contents are identical under any sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSizing {
    pub divisor: usize,
    pub max: usize,
}

impl BucketSizing {
    #[inline]
    pub fn initial_capacity(&self, item_count: usize) -> usize {
        if self.divisor == 0 {
            return 0;
        }
        (item_count / self.divisor).min(self.max)
    }
}

impl Default for BucketSizing {
    fn default() -> Self {
        IndexConfig::default().bucket_sizing()
    }
}

/// Point-in-time statistics for a primary index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Generation of the published primary snapshot
    pub generation: u64,
    pub item_count: usize,
    pub indexers: Vec<IndexerStats>,
}

/// Point-in-time statistics for one registered indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerStats {
    pub name: String,
    pub bucket_count: usize,
    pub key_count: usize,
}
