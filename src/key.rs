//! Key projection traits: how a key becomes an array index.
//!
//! [`IdKey`] is the customization point, playing the role a hasher plays for
//! a hash map: it projects a key to an unsigned "index value". Unlike a
//! hasher it must be a *perfect* projection — two live keys never share an
//! index — and its output type matters: a projection returning `u8` caps the
//! containers at 256 slots and shrinks their per-slot storage to match.
//!
//! [`SlotIndex`] is the unsigned-integral bound shared by index and position
//! domains. It is implemented for the unsigned primitives and is not meant
//! to be implemented outside the crate.

/// An unsigned integral type usable as a table index or stored position.
///
/// Implemented for `u8`, `u16`, `u32`, `u64` and `usize`.
pub trait SlotIndex: Copy + Eq + Ord + core::fmt::Debug {
    /// Largest representable value, as a `usize`.
    const MAX_USIZE: usize;

    /// Widens to `usize`. Lossless.
    fn to_usize(self) -> usize;

    /// Narrows from `usize`.
    ///
    /// # Panics
    /// Debug builds assert `v <= Self::MAX_USIZE`; release builds truncate.
    fn from_usize(v: usize) -> Self;
}

/// Projects a key to its unsigned index value.
///
/// Identity for the unsigned primitives. Implement it for structured id
/// types by returning the embedded id field:
///
/// ```
/// use slotkit::IdKey;
///
/// #[derive(Clone, Copy, PartialEq, Eq)]
/// struct EntityId(u16);
///
/// impl IdKey for EntityId {
///     type Index = u16;
///     fn index(&self) -> u16 {
///         self.0
///     }
/// }
/// ```
///
/// The containers assume the projection is stable (the same key always
/// yields the same index) and injective over live keys.
pub trait IdKey {
    /// Unsigned index domain. Its width caps table size and sets the
    /// default stored-position width.
    type Index: SlotIndex;

    /// The key's index value.
    fn index(&self) -> Self::Index;
}

macro_rules! impl_slot_index {
    ($($ty:ty),*) => {
        $(
            impl SlotIndex for $ty {
                const MAX_USIZE: usize = <$ty>::MAX as usize;

                #[inline(always)]
                fn to_usize(self) -> usize {
                    self as usize
                }

                #[inline(always)]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(
                        v <= Self::MAX_USIZE,
                        "index value {v} exceeds {}",
                        stringify!($ty)
                    );
                    v as $ty
                }
            }

            impl IdKey for $ty {
                type Index = $ty;

                #[inline(always)]
                fn index(&self) -> $ty {
                    *self
                }
            }
        )*
    };
}

impl_slot_index!(u8, u16, u32, u64, usize);
