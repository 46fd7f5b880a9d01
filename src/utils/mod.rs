//! Shared plumbing for the index types.
//!
//! - [`comparer`] - pluggable equality for keys and property values
//! - [`fanout`] - scatter/gather rebuilds on rayon

pub mod comparer;
pub mod fanout;

pub use comparer::*;
pub use fanout::*;
