mod dynarr;
mod reserve_hint;

use core::{alloc::Layout, fmt};

pub use dynarr::*;
pub use reserve_hint::*;

//--------------------------------------------------------------

macro_rules! impl_slice_partial_eq_generic {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty $(where $ty:ty: $bound:ident)?) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs  where
            T : PartialEq<U>,
            $($ty: $bound)?
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
            #[inline]
            #[allow(clippy::partialeq_ne_impl)]
            fn ne(&self, other: &$rhs) -> bool { self[..] != other[..] }
        }
    };
}
use impl_slice_partial_eq_generic;

//--------------------------------------------------------------

/// Error returned when reserving memory for a container fails.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// The requested capacity exceeds `isize::MAX` bytes, or the capacity computation overflowed.
    CapacityOverflow,
    /// The allocator could not provide memory for the given layout.
    AllocError(Layout),
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => f.write_str("memory allocation failed because the computed capacity exceeded the collection's maximum"),
            Self::AllocError(layout) => write!(f, "memory allocation of {} bytes (align {}) failed", layout.size(), layout.align()),
        }
    }
}

impl std::error::Error for TryReserveError {}

/// Error returned by checked element access when the index is not smaller than the length.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("index out of bounds")
    }
}

impl std::error::Error for OutOfRange {}

//--------------------------------------------------------------

/// A trait used to define a strategy to reserve additional memory for containers.
pub trait ReserveStrategy {
    /// Calculate the new capacity for a container.
    ///
    /// `cur_capacity` represents the current capacity of the container.
    ///
    /// `min_capacity` represents the minimum required capacity to be able to resize.
    ///
    /// The returned capacity is always at least `min_capacity`.
    /// Returns `Err(TryReserveError::CapacityOverflow)` if the capacity were to overflow.
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, TryReserveError>;
}

/// A reserve strategy that will try to either return double the current capacity, or the minimum required capacity, whichever is bigger.
///
/// Starting from an empty container, the first growth gives exactly the required capacity, so a single push allocates 1 slot.
#[derive(Clone, Copy, Default, Debug)]
pub struct DoubleOrMinReserveStrategy;

impl ReserveStrategy for DoubleOrMinReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, TryReserveError> {
        let double_cap = cur_capacity.saturating_mul(2);
        let new_cap = if double_cap > min_capacity { double_cap } else { min_capacity };
        if new_cap <= isize::MAX as usize {
            Ok(new_cap)
        } else if min_capacity <= isize::MAX as usize {
            Ok(min_capacity)
        } else {
            Err(TryReserveError::CapacityOverflow)
        }
    }
}

/// A reserve strategy that will return a power of 2 capacity
#[derive(Clone, Copy, Default, Debug)]
pub struct Pow2ReserveStrategy;

impl ReserveStrategy for Pow2ReserveStrategy {
    fn calculate(_cur_capacity: usize, min_capacity: usize) -> Result<usize, TryReserveError> {
        match min_capacity.checked_next_power_of_two() {
            Some(new_cap) if new_cap <= isize::MAX as usize => Ok(new_cap),
            _ => Err(TryReserveError::CapacityOverflow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_or_min() {
        assert_eq!(DoubleOrMinReserveStrategy::calculate(0, 1), Ok(1));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(1, 2), Ok(2));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, 5), Ok(8));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, 20), Ok(20));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(isize::MAX as usize, isize::MAX as usize), Ok(isize::MAX as usize));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(0, usize::MAX), Err(TryReserveError::CapacityOverflow));
    }

    #[test]
    fn pow2() {
        assert_eq!(Pow2ReserveStrategy::calculate(0, 0), Ok(1));
        assert_eq!(Pow2ReserveStrategy::calculate(0, 3), Ok(4));
        assert_eq!(Pow2ReserveStrategy::calculate(4, 5), Ok(8));
        assert_eq!(Pow2ReserveStrategy::calculate(0, usize::MAX), Err(TryReserveError::CapacityOverflow));
    }

    #[test]
    fn errors_display() {
        assert_eq!(OutOfRange.to_string(), "index out of bounds");
        assert!(TryReserveError::CapacityOverflow.to_string().contains("capacity"));
        let layout = Layout::new::<u64>();
        assert!(TryReserveError::AllocError(layout).to_string().contains("8 bytes"));
    }
}
