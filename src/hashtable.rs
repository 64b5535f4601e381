use std::{borrow::Borrow, collections::hash_map::RandomState, fmt, hash::{BuildHasher, Hash}};

/// A hash table that resolves collisions by chaining.
/// The number of buckets is fixed when the table is created and never changes,
/// so lookups degrade linearly once the table holds many more entries than buckets.
#[derive(Clone)]
pub struct HashTable<K, V, S = RandomState> {
    buckets: Box<[Vec<(K, V)>]>,
    len: usize,
    hasher: S
}

impl<K: Hash + Eq, V> HashTable<K, V, RandomState> {
    /// Bucket count used by `HashTable::new`.  Prime so that hashes sharing a factor
    /// with the bucket count don't pile into the same chains.
    pub const DEFAULT_CAPACITY: usize = 11;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create an empty table with `capacity` buckets (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> HashTable<K, V, S> {
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let buckets = (0..capacity.max(1)).map(|_|Vec::new()).collect();
        Self{buckets, len: 0, hasher}
    }

    /// Get the number of key value pairs in the table
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the number of buckets
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn bucket<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        (self.hasher.hash_one(key)%(self.buckets.len() as u64)) as usize
    }

    /// Insert a key value pair, replacing and returning the old value if the key was already present
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let idx = self.bucket(&key);
        let chain = &mut self.buckets[idx];
        if let Some((_, v)) = chain.iter_mut().find(|(k, _)|*k == key) {
            return Some(std::mem::replace(v, value))
        }
        chain.push((key, value));
        self.len += 1;
        None
    }

    /// Return a reference to the value for some key, or None if the key is not found
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where K: Borrow<Q>, Q: Hash + Eq + ?Sized {
        self.buckets[self.bucket(key)].iter().find(|(k, _)|Borrow::<Q>::borrow(k) == key).map(|(_, v)|v)
    }

    /// Return a mutable reference to the value for some key, or None if the key is not found
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where K: Borrow<Q>, Q: Hash + Eq + ?Sized {
        let idx = self.bucket(key);
        self.buckets[idx].iter_mut().find(|(k, _)|Borrow::<Q>::borrow(k) == key).map(|(_, v)|v)
    }

    /// Remove a key and return its value.  Removing a key that isn't present does nothing and returns None.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where K: Borrow<Q>, Q: Hash + Eq + ?Sized {
        let idx = self.bucket(key);
        let chain = &mut self.buckets[idx];
        let pos = chain.iter().position(|(k, _)|Borrow::<Q>::borrow(k) == key)?;
        self.len -= 1;
        Some(chain.swap_remove(pos).1)
    }

    /// Return true if the table contains some key or false otherwise
    pub fn contains<Q>(&self, key: &Q) -> bool
    where K: Borrow<Q>, Q: Hash + Eq + ?Sized {
        self.get(key).is_some()
    }

    /// Iterate over all key value pairs.  The order is arbitrary.
    pub fn iter(&self) -> impl Iterator<Item=(&K, &V)> + '_ {
        self.buckets.iter().flatten().map(|(k, v)|(k, v))
    }
}

impl<K: Hash + Eq, V> Default for HashTable<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Extend<(K, V)> for HashTable<K, V, S> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for HashTable<K, V, RandomState> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut res = Self::new();
        res.extend(iter);
        res
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.buckets.iter().flatten().map(|(k, v)|(k, v))).finish()
    }
}
