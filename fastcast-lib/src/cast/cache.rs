use core::{
    any::{type_name, TypeId},
    cell::RefCell,
};

use hashbrown::HashMap;

use super::{
    polymorphic::TypeIdentity,
    record::{Adjustment, Record},
};

/// Counters of the current thread's cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
}

/// One record per (source static type, target type) pair.
#[derive(Default)]
struct Cache {
    records: HashMap<(TypeId, TypeId), Record>,
    stats: Stats,
}

impl Cache {
    fn hit(&mut self, key: &(TypeId, TypeId), identity: TypeIdentity) -> Option<Adjustment> {
        let result = self.records.get(key)?.lookup(identity)?;
        self.stats.hits += 1;
        Some(result)
    }
    fn miss(&mut self, key: (TypeId, TypeId), identity: TypeIdentity, adjustment: Adjustment) {
        self.stats.misses += 1;
        self.records.entry(key).or_default().store(identity, adjustment);
    }
}

thread_local! {
    static CACHE: RefCell<Cache> = RefCell::new(Cache::default());
}

/// Resolves the conversion of a value of concrete type `identity` from `S` to `T`.
/// `oracle` runs only on a cold miss.
pub(crate) fn resolve<S: ?Sized + 'static, T: 'static>(
    identity: TypeIdentity,
    oracle: impl FnOnce() -> Adjustment,
) -> Adjustment {
    let key = (TypeId::of::<S>(), TypeId::of::<T>());
    if let Some(adjustment) = CACHE
        .try_with(|c| c.borrow_mut().hit(&key, identity))
        .ok()
        .flatten()
    {
        return adjustment;
    }
    // The cache is not borrowed while the oracle runs: it may cast too.
    let adjustment = oracle();
    tracing::trace!(
        source = type_name::<S>(),
        target = type_name::<T>(),
        ?adjustment,
        "cold miss"
    );
    // During thread teardown the outcome is just not memoized.
    let _ = CACHE.try_with(|c| c.borrow_mut().miss(key, identity, adjustment));
    adjustment
}

/// The current thread's counters. Zero once its store is gone.
pub fn stats() -> Stats {
    CACHE.try_with(|c| c.borrow().stats).unwrap_or_default()
}

/// A copy of the current thread's record for casts from `S` to `T`.
pub fn peek<S: ?Sized + 'static, T: 'static>() -> Record {
    let key = (TypeId::of::<S>(), TypeId::of::<T>());
    CACHE
        .try_with(|c| c.borrow().records.get(&key).copied())
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Number of pairs the current thread has a record for.
pub fn len() -> usize {
    CACHE.try_with(|c| c.borrow().records.len()).unwrap_or_default()
}
