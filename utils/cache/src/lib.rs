use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::MutexGuard;

use lru::LruCache;

/// Fixed-capacity least-recently-used store, safe to share behind an `Arc`.
///
/// [`BoundedLruCache::lookup`] only peeks and leaves recency alone;
/// [`BoundedLruCache::get`] marks the entry as used.
pub struct BoundedLruCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K, V> BoundedLruCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns a clone of the cached value without updating recency.
    pub fn lookup<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().peek(key).cloned()
    }

    /// Returns a clone of the cached value and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().get(key).cloned()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().contains(key)
    }

    /// Stores or overwrites `key` and marks it most recently used. Returns the
    /// key evicted to make room, if any.
    pub fn insert(&self, key: K, value: V) -> Option<K> {
        let mut cache = self.lock();
        let replacing = cache.contains(&key);
        let displaced = cache.push(key, value);
        if replacing {
            None
        } else {
            displaced.map(|(evicted, _)| evicted)
        }
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().pop(key)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.lock();
        CacheStats {
            size: cache.len(),
            capacity: cache.cap().get(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
}
