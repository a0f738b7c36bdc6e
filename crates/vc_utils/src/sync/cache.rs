use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::hash::{FixedHashState, HashMap};

// -----------------------------------------------------------------------------
// ConcurrentCache

/// A thread-safe memoization table of immutable values.
///
/// Values are published as [`Arc`]s, so readers never hold the lock
/// while using a cached value.
///
/// Computation happens outside of any lock. Two threads that miss the
/// same key at the same time may both compute a value; the last insert
/// wins and both callers observe a complete value.
///
/// A poisoned lock is recovered, a cache holds no invariant that a
/// panicking writer could break.
///
/// # Examples
///
/// ```
/// use vc_utils::sync::ConcurrentCache;
///
/// let cache: ConcurrentCache<u32, String> = ConcurrentCache::new();
///
/// let value = cache.get_or_compute(1, || "one".to_owned());
/// assert_eq!(value.as_str(), "one");
///
/// // Cached, the closure is not called again.
/// let value = cache.get_or_compute(1, || unreachable!());
/// assert_eq!(value.as_str(), "one");
/// ```
pub struct ConcurrentCache<K, V> {
    map: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> ConcurrentCache<K, V> {
    /// Creates an empty cache.
    #[inline]
    pub const fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::with_hasher(FixedHashState)),
        }
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, Arc<V>>> {
        self.map.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, Arc<V>>> {
        self.map.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of cached entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drops every cached entry.
    ///
    /// Values already handed out stay alive through their [`Arc`]s.
    pub fn clear(&self) {
        self.write().clear();
    }
}

impl<K: Eq + Hash, V> ConcurrentCache<K, V> {
    /// Returns the cached value for `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().get(key).cloned()
    }

    /// Returns `true` if `key` is cached.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().contains_key(key)
    }

    /// Publishes `value` under `key`, replacing any previous value.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.write().insert(key, Arc::clone(&value));
        value
    }

    /// Removes the value cached under `key`.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().remove(key)
    }

    /// Returns the cached value for `key`, computing and publishing it on a miss.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some(value) = self.get(&key) {
            return value;
        }
        self.insert(key, compute())
    }

    /// Fallible version of [`get_or_compute`](Self::get_or_compute).
    ///
    /// Errors are returned to the caller and never cached.
    pub fn get_or_try_compute<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        Ok(self.insert(key, compute()?))
    }
}

impl<K, V> Default for ConcurrentCache<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ConcurrentCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ConcurrentCache;
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn compute_once_per_key() {
        let cache: ConcurrentCache<String, usize> = ConcurrentCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache.get_or_compute("a".to_string(), || {
                calls.fetch_add(1, Ordering::Relaxed);
                7
            });
            assert_eq!(*value, 7);
        }

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key("a"));
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: ConcurrentCache<u8, u8> = ConcurrentCache::new();

        let err = cache.get_or_try_compute(1, || Err::<u8, _>("boom"));
        assert_eq!(err, Err("boom"));
        assert!(cache.is_empty());

        let ok = cache.get_or_try_compute(1, || Ok::<_, &str>(3));
        assert_eq!(ok.map(|v| *v), Ok(3));
    }

    #[test]
    fn clear_keeps_handed_out_values() {
        let cache: ConcurrentCache<u8, String> = ConcurrentCache::new();
        let held = cache.insert(1, "kept".to_string());

        cache.clear();

        assert!(cache.get(&1).is_none());
        assert_eq!(held.as_str(), "kept");
        assert_eq!(Arc::strong_count(&held), 1);
    }

    #[test]
    fn shared_across_threads() {
        let cache: Arc<ConcurrentCache<u32, u32>> = Arc::new(ConcurrentCache::new());

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || *cache.get_or_compute(n % 2, || n % 2 * 10))
            })
            .collect();

        for handle in handles {
            let value = handle.join().unwrap();
            assert!(value == 0 || value == 10);
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.remove(&0).is_some());
        assert_eq!(cache.len(), 1);
    }
}
