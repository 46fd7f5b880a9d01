//! # Vultus - in-memory secondary indexing
//!
//! Vultus keeps a collection of items keyed by a unique identifier and any
//! number of secondary indexes over properties derived from those items.
//! It is built for read-heavy data that is refreshed in whole batches:
//! every update rebuilds the affected maps from scratch and publishes them
//! with a single pointer swap, so readers never block and never observe a
//! half-applied update.
//!
//! ## Architecture
//!
//! - [`index`] - the [`PrimaryIndex`] store, its snapshots and the indexers
//! - [`utils`] - equality strategies and the rebuild fan-out
//! - [`error`] - [`IndexError`] and the crate [`Result`]
//!
//! ## Quick Start
//!
//! ```
//! use vultus::{PrimaryIndex, PropertyIndexer};
//!
//! #[derive(Debug)]
//! struct Account { code: String, ccy: String, high: bool }
//!
//! let index = PrimaryIndex::new(|a: &Account| a.code.clone());
//! let by_ccy = index.add_field_index("ccy", |a: &Account| Some(a.ccy.clone())).unwrap();
//! let by_high = index.add_field_index("high", |a: &Account| Some(a.high)).unwrap();
//!
//! index.update(vec![
//!     Account { code: "A1".into(), ccy: "GBP".into(), high: true },
//!     Account { code: "A2".into(), ccy: "EUR".into(), high: true },
//!     Account { code: "A3".into(), ccy: "GBP".into(), high: false },
//! ]);
//!
//! // Intersect indexer results, then resolve the keys to items
//! let gbp = by_ccy.filter(&"GBP".to_string());
//! let high = by_high.filter(&true);
//! let keys: Vec<String> = gbp.intersection(&high).cloned().collect();
//!
//! let accounts = index.filter_many(&keys);
//! assert_eq!(accounts.len(), 1);
//! assert_eq!(accounts[0].code, "A1");
//! ```
//!
//! ## Concurrency
//!
//! Writers serialize on one lock per [`PrimaryIndex`] that is held until every
//! registered indexer has been rebuilt. The indexers rebuild in parallel on
//! rayon. Readers only clone an `Arc` to the current generation.

pub mod error;
pub mod index;
pub mod utils;

pub use error::{IndexError, Result};
pub use index::{
    FieldIndexer, IndexConfig, IndexKey, IndexStats, IndexerStats, Indexer, KeySet,
    MultiValueFieldIndexer, PrimaryIndex, PrimarySnapshot, PropertyIndexer,
};
pub use utils::{Comparer, Equality, Ordinal, OrdinalIgnoreCase};
