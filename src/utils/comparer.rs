//! Equality strategies for keys and properties.
//!
//! A [`Comparer`] maps a value to its canonical form; two values are equal
//! when their canonical forms are equal, and hashing is done on the canonical
//! form too. Maps store canonical keys, so the same strategy has to be used
//! for inserts and lookups. [`Equality`] bundles that choice so a store and
//! every lookup against it share one strategy.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Strategy deciding when two values of `T` are the same key.
pub trait Comparer<T: Clone>: Send + Sync {
    /// Canonical form of `value`. Borrow when `value` is already canonical.
    fn canonicalize<'a>(&self, value: &'a T) -> Cow<'a, T>;
}

/// Plain `Eq`/`Hash` equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ordinal;

impl<T: Clone> Comparer<T> for Ordinal {
    #[inline]
    fn canonicalize<'a>(&self, value: &'a T) -> Cow<'a, T> {
        Cow::Borrowed(value)
    }
}

/// Case-insensitive string equality.
///
/// Every char is upper-cased and then lower-cased, so titlecase letters
/// (`ǅ`), final sigma (`ς`) and expanding letters (`ß` ~ `SS`) all meet their
/// other case forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalIgnoreCase;

impl OrdinalIgnoreCase {
    /// True when folding leaves `c` unchanged
    #[inline]
    fn is_folded(c: char) -> bool {
        if c.is_ascii() {
            return !c.is_ascii_uppercase();
        }
        let mut upper = c.to_uppercase();
        match (upper.next(), upper.next()) {
            (Some(u), None) => {
                let mut lower = u.to_lowercase();
                matches!((lower.next(), lower.next()), (Some(l), None) if l == c)
            }
            _ => false,
        }
    }

    fn fold_once(value: &str) -> String {
        let mut folded = String::with_capacity(value.len());
        for c in value.chars() {
            for u in c.to_uppercase() {
                folded.extend(u.to_lowercase());
            }
        }
        folded
    }

    /// Fold until stable; `ẞ` lowers to `ß`, which only then expands to `ss`
    fn fold(value: &str) -> String {
        let mut folded = Self::fold_once(value);
        for _ in 0..3 {
            if folded.chars().all(Self::is_folded) {
                break;
            }
            folded = Self::fold_once(&folded);
        }
        folded
    }
}

impl Comparer<String> for OrdinalIgnoreCase {
    fn canonicalize<'a>(&self, value: &'a String) -> Cow<'a, String> {
        if value.chars().all(Self::is_folded) {
            Cow::Borrowed(value)
        } else {
            Cow::Owned(Self::fold(value))
        }
    }
}

/// The equality strategy attached to one map.
///
/// `Equality::ordinal()` skips canonicalization entirely, so lookups under the
/// default strategy never allocate.
pub struct Equality<T: Clone> {
    comparer: Option<Arc<dyn Comparer<T>>>,
}

impl<T: Clone> Equality<T> {
    pub fn ordinal() -> Self {
        Self { comparer: None }
    }

    pub fn with_comparer(comparer: impl Comparer<T> + 'static) -> Self {
        Self {
            comparer: Some(Arc::new(comparer)),
        }
    }

    #[inline]
    pub fn canonicalize<'a>(&self, value: &'a T) -> Cow<'a, T> {
        match &self.comparer {
            Some(comparer) => comparer.canonicalize(value),
            None => Cow::Borrowed(value),
        }
    }

    /// Owned canonical form, for inserting into a map.
    #[inline]
    pub fn canonical_owned(&self, value: T) -> T {
        match &self.comparer {
            Some(comparer) => comparer.canonicalize(&value).into_owned(),
            None => value,
        }
    }

    pub fn is_ordinal(&self) -> bool {
        self.comparer.is_none()
    }
}

impl<T: Clone> Default for Equality<T> {
    fn default() -> Self {
        Self::ordinal()
    }
}

impl<T: Clone> Clone for Equality<T> {
    fn clone(&self) -> Self {
        Self {
            comparer: self.comparer.clone(),
        }
    }
}

impl<T: Clone> fmt::Debug for Equality<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.comparer {
            Some(_) => f.write_str("Equality(custom)"),
            None => f.write_str("Equality(ordinal)"),
        }
    }
}
