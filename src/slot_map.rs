//! Dense key/value map keyed by small unsigned ids.
//!
//! [`SlotMap`] pairs a dense `Vec<(K, V)>` with a [`SlotLookup`] that maps
//! each id to its position in the vector. It grows as large as the biggest
//! id, gives O(1) insert/lookup/remove with no hashing, and keeps values
//! contiguous so full iteration is a linear scan over one allocation.
//!
//! Removal is swap-and-pop: the last pair moves into the hole and its lookup
//! position is rewritten. This is exactly the dense-array synchronization
//! the lookup's contract asks of its caller, kept in one place here.
//!
//! # Invariants
//! - `lookup.get(k) == Some(p)` iff `dense[p].0` projects to `k`'s index.
//! - `lookup.len() == dense.len()` at all times.
//! - Dense order is insertion order until the first `remove`.

use crate::key::{IdKey, SlotIndex};
use crate::lookup::SlotLookup;

/// Dense map from small unsigned ids to values.
///
/// Positions are stored at the key projection's width, so the map can hold
/// at most `K::Index::MAX + 1` entries; exceeding that panics.
///
/// # Examples
/// ```
/// use slotkit::SlotMap;
///
/// let mut map = SlotMap::new();
/// map.insert(3u32, "three");
/// map.insert(7u32, "seven");
///
/// assert_eq!(map.get(&3), Some(&"three"));
/// assert_eq!(map.remove(&3), Some("three"));
/// assert_eq!(map.len(), 1);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "K: serde::Serialize, V: serde::Serialize, K::Index: serde::Serialize",
        deserialize = "K: serde::Deserialize<'de>, V: serde::Deserialize<'de>, \
                       K::Index: serde::Deserialize<'de>"
    ))
)]
#[derive(Clone, Debug)]
pub struct SlotMap<K: IdKey, V> {
    dense: Vec<(K, V)>,
    lookup: SlotLookup<K>,
}

impl<K: IdKey, V> SlotMap<K, V> {
    /// Creates an empty map. Does not allocate.
    pub const fn new() -> Self {
        Self {
            dense: Vec::new(),
            lookup: SlotLookup::new(),
        }
    }

    /// Creates an empty map with room for ids and values up to `cap`.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            dense: Vec::with_capacity(cap),
            lookup: SlotLookup::with_capacity(cap),
        }
    }

    /// Number of key/value pairs. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if the map holds no pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.lookup.contains(key)
    }

    /// Returns a reference to the value for `key`.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        let pos = self.lookup.get(key)?.to_usize();
        Some(&self.dense[pos].1)
    }

    /// Returns a mutable reference to the value for `key`.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let pos = self.lookup.get(key)?.to_usize();
        Some(&mut self.dense[pos].1)
    }

    /// Inserts a pair, returning the previous value if the id was present.
    ///
    /// # Panics
    /// Panics if a new pair would push the dense storage past what the key's
    /// index width can address (`K::Index::MAX + 1` entries).
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(pos) = self.lookup.get(&key) {
            let slot = &mut self.dense[pos.to_usize()];
            slot.0 = key;
            return Some(std::mem::replace(&mut slot.1, value));
        }

        let pos = self.dense.len();
        assert!(
            pos <= <K::Index as SlotIndex>::MAX_USIZE,
            "SlotMap: dense storage exceeds key index width"
        );
        self.lookup.insert(&key, <K::Index as SlotIndex>::from_usize(pos));
        self.dense.push((key, value));
        None
    }

    /// Removes `key`, returning its value.
    ///
    /// Swap-and-pop: the last pair fills the vacated dense slot and its
    /// lookup position is rewritten, so removal is O(1) but disturbs dense
    /// order.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let pos = self.lookup.get(key)?.to_usize();
        self.lookup.invalidate(key);
        let (_, value) = self.dense.swap_remove(pos);
        if pos < self.dense.len() {
            // A tail pair moved into the hole; repoint its lookup entry.
            let moved = &self.dense[pos].0;
            self.lookup
                .update(moved, <K::Index as SlotIndex>::from_usize(pos));
        }
        Some(value)
    }

    /// Removes every pair, keeping both allocations.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.lookup.clear();
    }

    /// Iterates pairs in dense order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.dense.iter(),
        }
    }

    /// Iterates pairs in dense order with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.dense.iter_mut(),
        }
    }

    /// Iterates keys in dense order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.dense.iter().map(|(k, _)| k)
    }

    /// Iterates values in dense order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.dense.iter().map(|(_, v)| v)
    }

    /// Iterates mutable values in dense order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.dense.iter_mut().map(|(_, v)| v)
    }

    /// Reserves dense storage for `additional` more pairs.
    pub fn reserve(&mut self, additional: usize) {
        self.dense.reserve(additional);
    }

    /// Reserves lookup storage for ids up to `max_index`.
    pub fn reserve_index(&mut self, max_index: usize) {
        self.lookup.reserve(max_index);
    }

    /// Dense storage capacity in pairs.
    pub fn capacity(&self) -> usize {
        self.dense.capacity()
    }
}

impl<K: IdKey, V> Default for SlotMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IdKey, V> FromIterator<(K, V)> for SlotMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: IdKey, V> Extend<(K, V)> for SlotMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Borrowing pair iterator in dense order.
pub struct Iter<'a, K, V> {
    inner: std::slice::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Mutable-value pair iterator in dense order.
pub struct IterMut<'a, K, V> {
    inner: std::slice::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<'a, K: IdKey, V> IntoIterator for &'a SlotMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: IdKey, V> IntoIterator for &'a mut SlotMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K: IdKey, V> IntoIterator for SlotMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.dense.into_iter()
    }
}
