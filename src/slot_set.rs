//! Ordered membership set for unsigned keys, packed into `u64` words.
//!
//! [`SlotSet`] stores one bit per possible key value, so memory grows as
//! large as the biggest key inserted (one bit per value in `0..=max`).
//! Membership checks are a word index plus a mask, and iteration walks set
//! bits in ascending key order with `trailing_zeros`.
//!
//! The element count is maintained incrementally, so `len` is O(1).

use std::marker::PhantomData;

use crate::key::SlotIndex;

const WORD_BITS: usize = u64::BITS as usize;

/// Ordered set of unsigned keys backed by packed bits.
///
/// `K` is one of the unsigned primitives. For structured id types, project
/// to the id first and store the projection.
///
/// # Examples
/// ```
/// use slotkit::SlotSet;
///
/// let mut set = SlotSet::new();
/// assert!(set.insert(9u32));
/// assert!(set.insert(2u32));
/// assert!(!set.insert(9u32)); // already present
///
/// // Iteration is ascending regardless of insertion order.
/// assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 9]);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(serialize = "", deserialize = ""))
)]
#[derive(Clone, Debug)]
pub struct SlotSet<K: SlotIndex> {
    words: Vec<u64>,
    live: usize,
    _key: PhantomData<fn(&K)>,
}

impl<K: SlotIndex> SlotSet<K> {
    /// Creates an empty set. Does not allocate.
    pub const fn new() -> Self {
        Self {
            words: Vec::new(),
            live: 0,
            _key: PhantomData,
        }
    }

    /// Creates an empty set with room for keys up to `max_key`.
    pub fn with_max_key(max_key: K) -> Self {
        let mut set = Self::new();
        set.reserve(max_key);
        set
    }

    #[inline(always)]
    fn split(key: K) -> (usize, u64) {
        let idx = key.to_usize();
        (idx / WORD_BITS, 1u64 << (idx % WORD_BITS))
    }

    /// Inserts `key`. Returns `true` if it was not already present.
    ///
    /// Grows the backing words if the key is beyond the current range.
    pub fn insert(&mut self, key: K) -> bool {
        let (word, bit) = Self::split(key);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let slot = &mut self.words[word];
        if *slot & bit != 0 {
            return false;
        }
        *slot |= bit;
        self.live += 1;
        true
    }

    /// Removes `key`. Returns `true` if it was present.
    ///
    /// Never shrinks the backing words; removing an absent key is a no-op.
    pub fn remove(&mut self, key: K) -> bool {
        let (word, bit) = Self::split(key);
        match self.words.get_mut(word) {
            Some(slot) if *slot & bit != 0 => {
                *slot &= !bit;
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if `key` is in the set.
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        let (word, bit) = Self::split(key);
        self.words.get(word).is_some_and(|slot| slot & bit != 0)
    }

    /// Number of keys in the set. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Removes every key, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.clear();
        self.live = 0;
    }

    /// Iterates keys in ascending order.
    pub fn iter(&self) -> SlotSetIter<'_, K> {
        SlotSetIter {
            words: &self.words,
            word_idx: 0,
            current: self.words.first().copied().unwrap_or(0),
            _key: PhantomData,
        }
    }

    /// Smallest key in the set, if any.
    pub fn first(&self) -> Option<K> {
        self.iter().next()
    }

    /// Reserves backing storage for keys up to `max_key`.
    pub fn reserve(&mut self, max_key: K) {
        let words = max_key.to_usize() / WORD_BITS + 1;
        if words > self.words.len() {
            self.words.reserve(words - self.words.len());
        }
    }

    /// Largest key the current allocation can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.words.capacity() * WORD_BITS
    }

    /// Shrinks the backing allocation to the highest word in use.
    pub fn shrink_to_fit(&mut self) {
        // Trailing zero words carry no members.
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
        self.words.shrink_to_fit();
    }
}

impl<K: SlotIndex> Default for SlotSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SlotIndex> FromIterator<K> for SlotSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K: SlotIndex> Extend<K> for SlotSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: SlotIndex> IntoIterator for &'a SlotSet<K> {
    type Item = K;
    type IntoIter = SlotSetIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending-order key iterator over a [`SlotSet`].
pub struct SlotSetIter<'a, K: SlotIndex> {
    words: &'a [u64],
    word_idx: usize,
    /// Unvisited bits of `words[word_idx]`.
    current: u64,
    _key: PhantomData<fn() -> K>,
}

impl<K: SlotIndex> Iterator for SlotSetIter<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1; // clear lowest set bit
                return Some(K::from_usize(self.word_idx * WORD_BITS + bit));
            }
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_idx];
        }
    }
}
