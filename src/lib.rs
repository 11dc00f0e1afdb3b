//! Small, self-contained id-keyed containers.
//!
//! ## Scope
//! This crate provides containers for keys that already *are* small unsigned
//! numbers (or project to one): entity ids, enum ordinals, compact handles.
//! Because the key's own value is the array index, there is no hashing and no
//! collision resolution anywhere in the crate.
//!
//! ## Key invariants
//! - Memory grows as large as the biggest id ever inserted, never larger.
//!   These structures are for small, densely-clustered id domains; sparse
//!   64-bit keys will waste memory proportional to the maximum key value.
//! - Absence is a value, not an error: lookups return `Option` or a
//!   caller-supplied fallback. Contract violations (`update` or
//!   `at_unchecked` on an absent key) are debug assertions, not results.
//! - No internal locking. Every operation is a bounded, synchronous,
//!   in-memory computation; callers provide their own synchronization.
//!
//! ## Notable entry points
//! - [`SlotLookup`]: key -> dense-array position table. Stores positions
//!   only; the payload lives in a caller-owned dense array.
//! - [`SlotMap`]: full key/value map built on [`SlotLookup`] plus a dense
//!   pair vector, with swap-and-pop removal.
//! - [`SlotSet`]: membership set for unsigned keys, packed into `u64` words.
//! - [`IdKey`]: the customization point projecting a key to its unsigned
//!   index. Implement it for your own id types; the projection's width
//!   decides how much memory the containers use.
//!
//! ## Design trade-offs
//! Direct indexing buys O(1) lookups with no hash and no probe chains, at
//! the cost of memory proportional to the key domain. Prefer these
//! containers when ids are handed out compactly; prefer a real hash map
//! when they are not.

pub mod key;
pub mod lookup;
pub mod slot_map;
pub mod slot_set;
#[cfg(test)]
pub mod test_utils;

pub use key::{IdKey, SlotIndex};
pub use lookup::SlotLookup;
pub use slot_map::SlotMap;
pub use slot_set::SlotSet;
