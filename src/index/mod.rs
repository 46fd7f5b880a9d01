//! Primary store and secondary indexers.
//!
//! - [`primary`] - key to item store, owner and rebuild driver of indexers
//! - [`snapshot`] - immutable generation of the primary map
//! - [`indexer`] - contracts every secondary indexer implements
//! - [`field`] / [`multi_value`] - built-in single- and multi-valued indexers
//! - [`buckets`] - property to key-set storage shared by the built-in indexers

pub mod buckets;
pub mod field;
pub mod indexer;
pub mod multi_value;
pub mod primary;
pub mod snapshot;
pub mod types;

pub use field::FieldIndexer;
pub use indexer::{Indexer, PropertyIndexer};
pub use multi_value::MultiValueFieldIndexer;
pub use primary::PrimaryIndex;
pub use snapshot::PrimarySnapshot;
pub use types::*;
