//! Operation cache backed by [HashMap].
//!
//! Used for memoization of recursive diagram operations. Entries are plain
//! copies of node handles: the cache never owns references, so its owner must
//! clear it whenever nodes may have been reclaimed.

use std::collections::HashMap;
use std::hash::Hash;

/// A cache backed by [HashMap], with hit/miss statistics.
pub struct Cache<K, V> {
    map: HashMap<K, V>,
    hits: usize,
    misses: usize,
}

impl<K, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self::new(10)
    }
}

impl<K, V> Cache<K, V> {
    /// Creates a new cache with room for `2^bits` entries before resizing.
    pub fn new(bits: usize) -> Self {
        Self {
            map: HashMap::with_capacity(1 << bits),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Returns the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Clears all entries from the cache.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Removes all entries, yielding the cached values.
    pub fn drain(&mut self) -> impl Iterator<Item = V> + '_ {
        self.map.drain().map(|(_, v)| v)
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq,
    V: Copy,
{
    /// Looks up a key in the cache.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.map.get(key) {
            Some(&v) => {
                self.hits += 1;
                Some(v)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Inserts a key-value pair into the cache.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache() {
        let mut cache = Cache::<(u64, u64), i32>::new(3);

        cache.insert((1, 2), 3);
        cache.insert((2, 3), 1);

        assert_eq!(cache.get(&(1, 2)), Some(3));
        assert_eq!(cache.get(&(2, 3)), Some(1));
        assert_eq!(cache.get(&(2, 1)), None);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_drain() {
        let mut cache = Cache::<u32, u32>::default();
        cache.insert(1, 10);
        cache.insert(2, 20);
        let mut values: Vec<_> = cache.drain().collect();
        values.sort();
        assert_eq!(values, vec![10, 20]);
        assert!(cache.is_empty());
    }
}
