/// Request to pre-allocate capacity when constructing a container, without adding any elements.
///
/// Passing a hint to [`DynArr::with_reserve_hint`](super::DynArr::with_reserve_hint) (or converting it with `From`)
/// produces an empty dynamic array with at least the requested capacity.
///
/// ```
/// use svec_common::collections::{make_reserve_hint, DynArr};
///
/// let arr = DynArr::<u32>::with_reserve_hint(make_reserve_hint(16));
/// assert!(arr.is_empty());
/// assert!(arr.capacity() >= 16);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[must_use = "a reserve hint does nothing unless passed to a constructor"]
pub struct ReserveHint {
    capacity: usize,
}

impl ReserveHint {
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Get the requested capacity
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Create a [`ReserveHint`] requesting `capacity` slots.
pub const fn make_reserve_hint(capacity: usize) -> ReserveHint {
    ReserveHint::new(capacity)
}
