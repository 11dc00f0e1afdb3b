//! Direct-indexed key -> position lookup with tombstone invalidation.
//!
//! [`SlotLookup`] maps an unsigned id straight to a position in a dense array
//! the *caller* owns. The key's own index value is the array index, so there
//! is no hashing, no probing and no collision handling; lookups are a single
//! bounds check plus a load.
//!
//! # Invariants
//! - At most one live entry exists per index value.
//! - The table is as long as `largest index inserted + 1`; it only shrinks
//!   on `clear` (which keeps the allocation) or `shrink_to_fit`.
//! - `len()` counts live entries and is maintained incrementally, never by
//!   scanning.
//! - Stored positions are only meaningful against the caller's dense array;
//!   keeping the two in sync (e.g. after a swap-and-pop) is the caller's job.
//!
//! # Design Notes
//! - Vacancy is `Option<P>` rather than a reserved max-value sentinel, so a
//!   legitimate position can never collide with the "no entry" marker.
//! - Growth goes through `Vec::resize`, so repeated inserts at increasing
//!   indices are amortized O(1) and a failed allocation leaves the old
//!   table untouched.

use std::marker::PhantomData;

use crate::key::{IdKey, SlotIndex};

/// Key -> dense-array position table, indexed by the key's own id value.
///
/// `K` is the key type; its [`IdKey`] projection decides the index domain.
/// `P` is the stored position type and defaults to the projection's width, so
/// a `u8`-keyed table stores `u8` positions instead of always paying for
/// `usize`.
///
/// The table stores positions only. The actual payload lives in a dense
/// array owned by the caller, which is why [`insert`](Self::insert) and
/// [`update`](Self::update) take an explicit position instead of a value.
///
/// # Examples
/// ```
/// use slotkit::SlotLookup;
///
/// let mut lookup = SlotLookup::<u32>::new();
/// let mut dense = vec!["zero"];
///
/// lookup.insert(&7, 0); // dense[0] belongs to id 7
/// assert_eq!(lookup.find(&7, u32::MAX), 0);
/// assert_eq!(dense[lookup.find(&7, u32::MAX) as usize], "zero");
///
/// lookup.invalidate(&7);
/// assert!(!lookup.contains(&7));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "P: serde::Serialize",
        deserialize = "P: serde::Deserialize<'de>"
    ))
)]
pub struct SlotLookup<K: IdKey, P: SlotIndex = <K as IdKey>::Index> {
    /// `slots[idx]` is the dense position of the key with index `idx`, or
    /// `None` for a vacant (never used or invalidated) index.
    slots: Vec<Option<P>>,
    /// Live (non-vacant) entry count.
    live: usize,
    _key: PhantomData<fn(&K) -> P>,
}

impl<K: IdKey, P: SlotIndex> SlotLookup<K, P> {
    /// Creates an empty table. Does not allocate.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _key: PhantomData,
        }
    }

    /// Creates an empty table with backing capacity for indices `0..cap`.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            slots: Vec::with_capacity(cap),
            live: 0,
            _key: PhantomData,
        }
    }

    #[inline(always)]
    fn idx(key: &K) -> usize {
        key.index().to_usize()
    }

    /// Associates `key` with `pos`, the key's slot in the caller's dense
    /// array.
    ///
    /// Grows the table if the key's index is out of bounds. A prior mapping
    /// for the same key is silently overwritten; callers that want
    /// insert-only semantics should check [`contains`](Self::contains)
    /// first.
    ///
    /// # Panics
    /// Panics if the key's index cannot be represented as a table length
    /// (`index == usize::MAX`), or on allocation failure while growing.
    pub fn insert(&mut self, key: &K, pos: P) {
        let idx = Self::idx(key);
        self.grow_for(idx);
        if self.slots[idx].replace(pos).is_none() {
            self.live += 1;
        }
    }

    /// Bulk-inserts `keys` at contiguous positions starting at `first_pos`:
    /// `keys[i]` maps to `first_pos + i`.
    ///
    /// Grows the table once, to the largest projected index. All keys must
    /// be vacant (checked in debug builds); release builds overwrite like
    /// [`insert`](Self::insert).
    ///
    /// # Panics
    /// Panics if `first_pos + keys.len() - 1` overflows `P` (debug builds).
    pub fn insert_span(&mut self, keys: &[K], first_pos: P) {
        let Some(max) = keys.iter().map(Self::idx).max() else {
            return;
        };
        self.grow_for(max);
        let base = first_pos.to_usize();
        for (i, key) in keys.iter().enumerate() {
            let idx = Self::idx(key);
            debug_assert!(
                self.slots[idx].is_none(),
                "insert_span: key index {idx} already live"
            );
            if self.slots[idx].replace(P::from_usize(base + i)).is_none() {
                self.live += 1;
            }
        }
    }

    /// Returns the position stored for `key`, or `None` if vacant.
    ///
    /// Never grows the table. O(1).
    #[inline]
    pub fn get(&self, key: &K) -> Option<P> {
        self.slots.get(Self::idx(key)).copied().flatten()
    }

    /// Returns the position stored for `key`, or `fallback` if vacant.
    ///
    /// The hot-path sibling of [`get`](Self::get): no branch on the caller
    /// side when a natural fallback exists (conventionally the dense array's
    /// length, acting as an "end" position).
    #[inline]
    pub fn find(&self, key: &K, fallback: P) -> P {
        self.get(key).unwrap_or(fallback)
    }

    /// Returns `true` if `key` has a live entry.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the position stored for `key`.
    ///
    /// # Panics
    /// Panics if the key is vacant. Use [`get`](Self::get) for a fallible
    /// lookup or [`at_unchecked`](Self::at_unchecked) when presence is
    /// already established.
    #[inline]
    pub fn at(&self, key: &K) -> P {
        match self.get(key) {
            Some(pos) => pos,
            None => panic!("SlotLookup::at: vacant key index {}", Self::idx(key)),
        }
    }

    /// Returns the position stored for `key` without bounds or vacancy
    /// checks.
    ///
    /// # Safety
    /// The key must have a live entry (for example, established via a prior
    /// [`contains`](Self::contains) with no intervening `invalidate`,
    /// `clear` or `swap`). Debug builds assert the precondition; release
    /// builds exhibit undefined behavior when it is violated.
    #[inline]
    pub unsafe fn at_unchecked(&self, key: &K) -> P {
        let idx = Self::idx(key);
        debug_assert!(self.contains(key), "at_unchecked: vacant key index {idx}");
        // SAFETY: the caller guarantees a live entry, so `idx` is in bounds
        // and the slot is occupied.
        unsafe { (*self.slots.get_unchecked(idx)).unwrap_unchecked() }
    }

    /// Overwrites the position of an already-live key.
    ///
    /// The key must be live (debug-asserted). Unlike
    /// [`insert`](Self::insert) this never grows the table, which is what
    /// makes it safe to call in hot paths after a `contains` check.
    ///
    /// # Panics
    /// Panics if the key's index is beyond the table (the key was never
    /// inserted).
    #[inline]
    pub fn update(&mut self, key: &K, pos: P) {
        let idx = Self::idx(key);
        debug_assert!(self.contains(key), "update: vacant key index {idx}");
        // `replace` keeps the live count honest even if a release build
        // reaches this with a vacant in-bounds slot.
        if self.slots[idx].replace(pos).is_none() {
            self.live += 1;
        }
    }

    /// Tombstones the key's slot, marking the index free again.
    ///
    /// Does not shrink the table or touch the caller's dense array.
    /// Invalidating an absent key is a no-op.
    #[inline]
    pub fn invalidate(&mut self, key: &K) {
        if let Some(slot) = self.slots.get_mut(Self::idx(key)) {
            if slot.take().is_some() {
                self.live -= 1;
            }
        }
    }

    /// Empties the table, keeping the allocation for reuse.
    ///
    /// O(table length). Afterwards `len() == 0` and every key is vacant,
    /// but [`data`](Self::data) still reports the retained buffer.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.live = 0;
    }

    /// Number of live entries. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no entry is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Length of the internal position table: largest index inserted + 1,
    /// or 0 before the first insert / after `clear`.
    #[inline]
    pub fn table_len(&self) -> usize {
        self.slots.len()
    }

    /// Raw view of the position table for inspection, or `None` before the
    /// first allocation.
    pub fn data(&self) -> Option<&[Option<P>]> {
        if self.slots.capacity() == 0 {
            None
        } else {
            Some(self.slots.as_slice())
        }
    }

    /// Iterates the raw position table (positions, not keys), vacancies
    /// included.
    pub fn positions(&self) -> impl Iterator<Item = Option<P>> + '_ {
        self.slots.iter().copied()
    }

    /// Exchanges the entire state of two tables in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Reserves backing capacity for indices `0..=max_index`.
    ///
    /// Pass the largest id you expect to insert. This only reserves; the
    /// table length still grows lazily on insert.
    pub fn reserve(&mut self, max_index: usize) {
        let want = max_index.saturating_add(1);
        if want > self.slots.len() {
            self.slots.reserve(want - self.slots.len());
        }
    }

    /// Backing capacity in slots.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Shrinks the backing allocation to the current table length.
    pub fn shrink_to_fit(&mut self) {
        self.slots.shrink_to_fit();
    }

    fn grow_for(&mut self, idx: usize) {
        if idx < self.slots.len() {
            return;
        }
        let new_len = idx
            .checked_add(1)
            .expect("SlotLookup: key index overflows table length");
        // Vec::resize reallocates geometrically, so monotonically
        // increasing ids stay amortized O(1).
        self.slots.resize(new_len, None);
    }
}

impl<K: IdKey, P: SlotIndex> Default for SlotLookup<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IdKey, P: SlotIndex> Clone for SlotLookup<K, P> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            live: self.live,
            _key: PhantomData,
        }
    }
}

impl<K: IdKey, P: SlotIndex> core::fmt::Debug for SlotLookup<K, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotLookup")
            .field("live", &self.live)
            .field("table_len", &self.slots.len())
            .field("slots", &self.slots)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::SlotLookup;
    use crate::key::IdKey;

    #[test]
    fn empty_table_has_no_allocation() {
        let lookup = SlotLookup::<usize>::new();
        assert_eq!(lookup.data(), None);
        assert_eq!(lookup.len(), 0);
        assert!(lookup.is_empty());
        assert_eq!(lookup.table_len(), 0);
    }

    #[test]
    fn insert_then_find_round_trips() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.insert(&3, 17);
        assert_eq!(lookup.find(&3, u32::MAX), 17);
        assert_eq!(lookup.get(&3), Some(17));
        assert!(lookup.contains(&3));
        assert_eq!(lookup.len(), 1);
    }

    #[test]
    fn absent_key_returns_fallback() {
        let lookup = SlotLookup::<u32>::new();
        assert_eq!(lookup.find(&9, 42), 42);
        assert_eq!(lookup.find(&9, 0), 0);
        assert_eq!(lookup.get(&9), None);
        assert!(!lookup.contains(&9));
    }

    #[test]
    fn invalidate_round_trips_to_vacant() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.insert(&5, 1);
        lookup.invalidate(&5);
        assert!(!lookup.contains(&5));
        assert_eq!(lookup.find(&5, 99), 99);
        assert_eq!(lookup.len(), 0);
    }

    #[test]
    fn invalidate_absent_key_is_noop() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.invalidate(&1000); // out of table bounds
        lookup.insert(&1, 0);
        lookup.invalidate(&0); // in bounds, vacant
        assert_eq!(lookup.len(), 1);
        assert!(lookup.contains(&1));
    }

    #[test]
    fn update_overwrites_live_position() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.insert(&2, 1);
        lookup.update(&2, 7);
        assert_eq!(lookup.find(&2, u32::MAX), 7);
        assert_eq!(lookup.len(), 1);
    }

    #[test]
    fn reinsert_after_invalidate_restores_validity() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.insert(&4, 1);
        lookup.invalidate(&4);
        lookup.insert(&4, 2);
        assert!(lookup.contains(&4));
        assert_eq!(lookup.find(&4, u32::MAX), 2);
        assert_eq!(lookup.len(), 1);
    }

    #[test]
    fn insert_overwrites_silently() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.insert(&6, 1);
        lookup.insert(&6, 2);
        assert_eq!(lookup.get(&6), Some(2));
        assert_eq!(lookup.len(), 1);
    }

    #[test]
    fn len_tracks_live_entries_through_churn() {
        let mut lookup = SlotLookup::<u32>::new();
        for k in 0..10u32 {
            lookup.insert(&k, k);
        }
        assert_eq!(lookup.len(), 10);
        for k in (0..10u32).step_by(2) {
            lookup.invalidate(&k);
        }
        assert_eq!(lookup.len(), 5);
        lookup.insert(&0, 0);
        assert_eq!(lookup.len(), 6);
        // Table capacity is unrelated to live count.
        assert_eq!(lookup.table_len(), 10);
    }

    #[test]
    fn clear_retains_buffer_resets_validity() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.insert(&8, 3);
        lookup.clear();
        assert_eq!(lookup.len(), 0);
        assert!(!lookup.contains(&8));
        assert_eq!(lookup.find(&8, 5), 5);
        assert!(lookup.data().is_some());
        assert_eq!(lookup.table_len(), 0);
    }

    #[test]
    fn swap_exchanges_full_state() {
        let mut a = SlotLookup::<u32>::new();
        let mut b = SlotLookup::<u32>::new();
        a.insert(&1, 10);
        a.insert(&2, 20);
        b.insert(&3, 30);

        let a_buf = a.data().unwrap().as_ptr();
        let b_buf = b.data().unwrap().as_ptr();

        a.swap(&mut b);

        assert_eq!(b.get(&1), Some(10));
        assert_eq!(b.get(&2), Some(20));
        assert_eq!(b.len(), 2);
        assert_eq!(a.get(&3), Some(30));
        assert_eq!(a.len(), 1);
        // Buffer identity travels with the contents.
        assert_eq!(a.data().unwrap().as_ptr(), b_buf);
        assert_eq!(b.data().unwrap().as_ptr(), a_buf);
    }

    // Port of the original usage scenario: one key exercised through the
    // whole lifecycle against a fallback of 1 (the external array's "end").
    #[test]
    fn single_key_lifecycle() {
        let mut lookup = SlotLookup::<usize>::new();
        let mut other = SlotLookup::<usize>::new();
        lookup.swap(&mut other);

        let k = 0usize;
        assert_eq!(lookup.data(), None);
        assert_eq!(lookup.len(), 0);
        assert_eq!(lookup.find(&k, 1), 1);
        assert!(!lookup.contains(&k));

        lookup.insert(&k, 0);
        assert_eq!(unsafe { lookup.at_unchecked(&k) }, 0);
        assert_eq!(lookup.find(&k, 1), 0);
        assert!(lookup.data().is_some());
        assert_eq!(lookup.len(), 1);
        assert!(lookup.contains(&k));

        lookup.clear();
        assert!(lookup.data().is_some());
        assert_eq!(lookup.len(), 0);
        assert_eq!(lookup.find(&k, 1), 1);
        assert!(!lookup.contains(&k));

        lookup.insert(&k, 0);
        lookup.invalidate(&k);
        assert_eq!(lookup.find(&k, 1), 1);
        assert!(!lookup.contains(&k));

        lookup.insert(&k, 0);
        lookup.update(&k, 10);
        assert_eq!(unsafe { lookup.at_unchecked(&k) }, 10);
        assert_eq!(lookup.find(&k, 20), 10);
        assert!(lookup.contains(&k));

        lookup.swap(&mut other);
        assert_eq!(lookup.data(), None);
        assert_eq!(lookup.len(), 0);
        assert_eq!(lookup.find(&k, 1), 1);
        assert!(!lookup.contains(&k));
    }

    #[test]
    fn insert_span_assigns_contiguous_positions() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.insert_span(&[4, 9, 2], 10);
        assert_eq!(lookup.get(&4), Some(10));
        assert_eq!(lookup.get(&9), Some(11));
        assert_eq!(lookup.get(&2), Some(12));
        assert_eq!(lookup.len(), 3);
        assert_eq!(lookup.table_len(), 10);
    }

    #[test]
    fn insert_span_empty_is_noop() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.insert_span(&[], 0);
        assert_eq!(lookup.data(), None);
        assert_eq!(lookup.len(), 0);
    }

    #[test]
    fn narrow_key_narrows_position_storage() {
        // A u8 projection caps the domain at 256 and stores u8 positions.
        let mut lookup = SlotLookup::<u8>::new();
        lookup.insert(&255, 3);
        assert_eq!(lookup.table_len(), 256);
        assert_eq!(lookup.get(&255), Some(3u8));
    }

    #[test]
    fn structured_key_uses_projection() {
        #[derive(Clone, Copy)]
        struct MyId {
            id: u8,
            _other: u32,
        }

        impl IdKey for MyId {
            type Index = u8;
            fn index(&self) -> u8 {
                self.id
            }
        }

        let mut lookup = SlotLookup::<MyId>::new();
        let a = MyId { id: 3, _other: 0 };
        let b = MyId { id: 3, _other: 9 }; // same id, different payload
        lookup.insert(&a, 0);
        assert!(lookup.contains(&b));
        assert_eq!(lookup.find(&b, 255), 0);
    }

    #[test]
    fn reserve_then_insert_does_not_move_buffer() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.reserve(63);
        assert!(lookup.capacity() >= 64);
        let buf = lookup.data().unwrap().as_ptr();
        for k in 0..64u32 {
            lookup.insert(&k, k);
        }
        assert_eq!(lookup.data().unwrap().as_ptr(), buf);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "update: vacant key")]
    fn update_vacant_key_asserts_in_debug() {
        let mut lookup = SlotLookup::<u32>::new();
        lookup.insert(&1, 0);
        lookup.invalidate(&1);
        lookup.update(&1, 5);
    }

    #[test]
    #[should_panic(expected = "vacant key")]
    fn at_vacant_key_panics() {
        let lookup = SlotLookup::<u32>::new();
        let _ = lookup.at(&1);
    }
}
