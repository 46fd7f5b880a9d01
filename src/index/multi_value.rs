//! Multi-valued field indexer.
//!
//! Each item may yield any number of property values and its key lands in the
//! bucket of every one of them, so one item can be found through several
//! lookups (e.g. the individual flags set on a bit-flag field).

use super::buckets::BucketStore;
use super::indexer::{Indexer, PropertyIndexer};
use super::types::{BucketSizing, IndexKey, KeyFn, KeySet};
use crate::error::Result;
use crate::utils::{Comparer, Equality};
use std::any::Any;
use std::sync::Arc;

/// Feeds every property value of an item to the sink
pub type PropertiesFn<P, T> = Arc<dyn Fn(&T, &mut dyn FnMut(P)) + Send + Sync>;

/// Indexes items under every value of a multi-valued property.
///
/// An item yielding no values is absent from every bucket.
pub struct MultiValueFieldIndexer<P: IndexKey, K: IndexKey, T> {
    get_key: KeyFn<K, T>,
    get_properties: PropertiesFn<P, T>,
    store: BucketStore<P, K>,
}

/// Adapt an extractor returning any iterable into a [`PropertiesFn`]
pub(crate) fn properties_fn<P, T, F, I>(get_properties: F) -> PropertiesFn<P, T>
where
    T: 'static,
    P: 'static,
    F: Fn(&T) -> I + Send + Sync + 'static,
    I: IntoIterator<Item = P>,
{
    Arc::new(move |item: &T, sink: &mut dyn FnMut(P)| {
        for property in get_properties(item) {
            sink(property);
        }
    })
}

impl<P, K, T> MultiValueFieldIndexer<P, K, T>
where
    P: IndexKey,
    K: IndexKey,
    T: Send + Sync + 'static,
{
    pub fn new<KF, PF, I>(get_key: KF, get_properties: PF) -> Self
    where
        KF: Fn(&T) -> K + Send + Sync + 'static,
        PF: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = P>,
    {
        Self::from_parts(
            Arc::new(get_key),
            properties_fn(get_properties),
            Equality::ordinal(),
            BucketSizing::default(),
        )
    }

    pub fn with_comparer<KF, PF, I, C>(get_key: KF, get_properties: PF, comparer: C) -> Self
    where
        KF: Fn(&T) -> K + Send + Sync + 'static,
        PF: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = P>,
        C: Comparer<P> + 'static,
    {
        Self::from_parts(
            Arc::new(get_key),
            properties_fn(get_properties),
            Equality::with_comparer(comparer),
            BucketSizing::default(),
        )
    }

    pub(crate) fn from_parts(
        get_key: KeyFn<K, T>,
        get_properties: PropertiesFn<P, T>,
        equality: Equality<P>,
        sizing: BucketSizing,
    ) -> Self {
        Self {
            get_key,
            get_properties,
            store: BucketStore::new(equality, sizing),
        }
    }
}

impl<P, K, T> Indexer<K, T> for MultiValueFieldIndexer<P, K, T>
where
    P: IndexKey,
    K: IndexKey,
    T: Send + Sync + 'static,
{
    fn update(&self, items: &[Arc<T>]) {
        self.store.rebuild(items.len(), |builder| {
            for item in items {
                let key = (self.get_key)(item);
                (self.get_properties)(item, &mut |property| builder.insert(property, key.clone()));
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

impl<P, K, T> PropertyIndexer<P, K, T> for MultiValueFieldIndexer<P, K, T>
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::OrdinalIgnoreCase;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Flag {
        Low,
        High,
    }

    struct Account {
        code: u32,
        flags: u8,
        ccys: Vec<&'static str>,
    }

    fn account(code: u32, flags: u8, ccys: &[&'static str]) -> Arc<Account> {
        Arc::new(Account {
            code,
            flags,
            ccys: ccys.to_vec(),
        })
    }

    fn flags_of(account: &Account) -> Vec<Flag> {
        let mut flags = Vec::new();
        if account.flags & 1 != 0 {
            flags.push(Flag::Low);
        }
        if account.flags & 2 != 0 {
            flags.push(Flag::High);
        }
        flags
    }

    fn sorted(set: &KeySet<u32>) -> Vec<u32> {
        let mut keys: Vec<u32> = set.iter().copied().collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_item_in_every_bucket() {
        let indexer = MultiValueFieldIndexer::new(|a: &Account| a.code, flags_of);
        indexer.update(&[
            account(1, 0b11, &[]),
            account(2, 0b10, &[]),
            account(3, 0b01, &[]),
            account(4, 0b00, &[]),
        ]);

        assert_eq!(sorted(&indexer.filter(&Flag::High)), vec![1, 2]);
        assert_eq!(sorted(&indexer.filter(&Flag::Low)), vec![1, 3]);
        // no flags, no buckets
        assert_eq!(sorted(&indexer.items()), vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_many_union_with_unknown_value() {
        let indexer = MultiValueFieldIndexer::new(
            |a: &Account| a.code,
            |a: &Account| a.ccys.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        );
        indexer.update(&[account(1, 0, &["GBP", "USD"]), account(2, 0, &["EUR"])]);

        let keys = indexer.filter_many(&["GBP".to_string(), "CHF".to_string()]);
        assert_eq!(sorted(&keys), vec![1]);

        let keys = indexer.filter_many(&["USD".to_string(), "EUR".to_string()]);
        assert_eq!(sorted(&keys), vec![1, 2]);
    }

    #[test]
    fn test_duplicate_values_collapse() {
        let indexer = MultiValueFieldIndexer::new(|a: &Account| a.code, |a: &Account| a.ccys.clone());
        indexer.update(&[account(1, 0, &["GBP", "GBP", "GBP"])]);

        assert_eq!(indexer.bucket_count(), 1);
        assert_eq!(sorted(&indexer.filter(&"GBP")), vec![1]);
    }

    #[test]
    fn test_comparer() {
        let indexer = MultiValueFieldIndexer::with_comparer(
            |a: &Account| a.code,
            |a: &Account| a.ccys.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            OrdinalIgnoreCase,
        );
        indexer.update(&[
            account(1, 0, &["GBP", "USD"]),
            account(2, 0, &["EUR", "USD"]),
            account(3, 0, &["GBP", "usd"]),
            account(4, 0, &["USD"]),
        ]);

        assert_eq!(sorted(&indexer.filter(&"UsD".to_string())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_option_extractor() {
        // Option<Vec<_>> flattened: None contributes nothing
        let indexer = MultiValueFieldIndexer::new(
            |a: &Account| a.code,
            |a: &Account| {
                let ccys = if a.ccys.is_empty() {
                    None
                } else {
                    Some(a.ccys.clone())
                };
                ccys.into_iter().flatten()
            },
        );
        indexer.update(&[account(1, 0, &[]), account(2, 0, &["JPY"])]);

        assert_eq!(sorted(&indexer.items()), vec![2]);
    }

    #[test]
    fn test_erased_flag_filter() {
        let indexer = MultiValueFieldIndexer::new(|a: &Account| a.code, flags_of);
        indexer.update(&[account(1, 0b11, &[]), account(2, 0b10, &[])]);

        let high = Flag::High;
        assert_eq!(sorted(&indexer.filter_erased(Some(&high)).unwrap()), vec![1, 2]);
        assert!(indexer.filter_erased(Some(&2u8)).is_err());
        assert!(indexer.contains_erased(&Flag::Low).unwrap());
    }
}
