//! Error types for index operations

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors reported synchronously to the caller of an index operation.
///
/// Lookups that tolerate misses (`filter`) never produce these; only the
/// strict accessors, registration and configuration do.
#[derive(Debug, Error)]
pub enum IndexError {
    /// An indexer with this name is already registered
    #[error("an indexer named '{0}' is already registered")]
    DuplicateName(String),

    /// An argument was empty or otherwise unusable
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Strict lookup found nothing for the key
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A type-erased value did not have the property type the indexer was built with
    #[error("type mismatch in {context}: expected a value of type {expected}")]
    TypeMismatch {
        expected: &'static str,
        context: &'static str,
    },

    /// Dedicated rebuild pool could not be created
    #[error("failed to build rebuild thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Configuration document could not be parsed
    #[error("invalid index configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl IndexError {
    pub(crate) fn key_not_found<K: std::fmt::Debug + ?Sized>(key: &K) -> Self {
        IndexError::KeyNotFound(format!("{:?}", key))
    }

    pub(crate) fn type_mismatch<P>(context: &'static str) -> Self {
        IndexError::TypeMismatch {
            expected: std::any::type_name::<P>(),
            context,
        }
    }
}
