use core::{
    alloc::Layout,
    fmt,
    marker::PhantomData,
    mem::{self, size_of, ManuallyDrop},
    ptr::{self, NonNull},
    slice,
};
use std::alloc;

use svec_logging::{log_severe, LogCategory};

use crate::collections::TryReserveError;
use super::memory_tracking::{track_alloc, track_dealloc};

const LOG_CAT : LogCategory = LogCategory::new_with_sub("Memory", "Buffer");

/// Owner of a single contiguous block of `capacity` slots of `T`.
///
/// A buffer does not in any way inspect the memory it manages, it has no notion of which slots hold a live value.
/// When dropped it *will* free its memory, but it *won't* try to drop its contents.
/// It is up to the user of `Buffer` to handle the values actually *stored* inside of it.
///
/// - A capacity of 0, or a zero-sized `T`, never allocates, the pointer is then dangling (but aligned).
///   The requested capacity is still reported by [`Buffer::capacity`].
/// - All capacity computations are checked, overflowing `isize::MAX` bytes is reported as [`TryReserveError::CapacityOverflow`].
/// - Ownership can be transferred with [`Buffer::swap`], or relinquished with [`Buffer::release`] and re-adopted with [`Buffer::from_raw_parts`].
pub struct Buffer<T> {
    ptr:      NonNull<T>,
    capacity: usize,
    _phantom: PhantomData<T>,
}

unsafe impl<T: Send> Send for Buffer<T> {}
unsafe impl<T: Sync> Sync for Buffer<T> {}

static_assertions::const_assert_eq!(size_of::<Buffer<u64>>(), 2 * size_of::<usize>());

impl<T> Buffer<T> {
    /// Creates an empty buffer without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self { ptr: NonNull::dangling(), capacity: 0, _phantom: PhantomData }
    }

    /// Allocates a buffer with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity exceeds `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    #[must_use]
    pub fn allocate(capacity: usize) -> Self {
        match Self::try_allocate(capacity) {
            Ok(buf) => buf,
            Err(err) => handle_reserve_error(err),
        }
    }

    /// Tries to allocate a buffer with exactly `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity exceeds `isize::MAX` _bytes_, or if the allocator reports a failure.
    pub fn try_allocate(capacity: usize) -> Result<Self, TryReserveError> {
        let layout = Layout::array::<T>(capacity).map_err(|_| TryReserveError::CapacityOverflow)?;
        if layout.size() == 0 {
            return Ok(Self { ptr: NonNull::dangling(), capacity, _phantom: PhantomData });
        }

        // SAFETY: `layout` has a non-zero size
        let raw = unsafe { alloc::alloc(layout) };
        let Some(ptr) = NonNull::new(raw.cast::<T>()) else {
            return Err(TryReserveError::AllocError(layout));
        };
        track_alloc(layout);
        Ok(Self { ptr, capacity, _phantom: PhantomData })
    }

    /// Get the number of slots in the buffer.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the buffer owns an actual allocation.
    pub const fn is_allocated(&self) -> bool {
        self.capacity != 0 && size_of::<T>() != 0
    }

    /// Get a raw pointer to the first slot.
    /// Note that this is a dangling pointer when the buffer does not own an allocation.
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Get a raw mutable pointer to the first slot.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Reads the value out of slot `index`, leaving the slot logically uninitialized.
    ///
    /// # Safety
    ///
    /// - `index < capacity`
    /// - slot `index` needs to hold a live value, which may not be used again after this call
    pub unsafe fn read(&mut self, index: usize) -> T {
        debug_assert!(index < self.capacity);
        ptr::read(self.ptr.as_ptr().add(index))
    }

    /// Writes `value` to slot `index` without dropping what was there.
    ///
    /// # Safety
    ///
    /// - `index < capacity`
    /// - any live value in slot `index` is leaked
    pub unsafe fn write(&mut self, index: usize, value: T) {
        debug_assert!(index < self.capacity);
        ptr::write(self.ptr.as_ptr().add(index), value)
    }

    /// # Safety
    ///
    /// Slot `index` needs to be in bounds and hold a live value.
    pub unsafe fn get(&self, index: usize) -> &T {
        debug_assert!(index < self.capacity);
        &*self.ptr.as_ptr().add(index)
    }

    /// # Safety
    ///
    /// Slot `index` needs to be in bounds and hold a live value.
    pub unsafe fn get_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.capacity);
        &mut *self.ptr.as_ptr().add(index)
    }

    /// View the first `len` slots as a slice.
    ///
    /// # Safety
    ///
    /// `len <= capacity` and the first `len` slots need to hold live values.
    pub unsafe fn slice(&self, len: usize) -> &[T] {
        debug_assert!(len <= self.capacity);
        slice::from_raw_parts(self.ptr.as_ptr(), len)
    }

    /// View the first `len` slots as a mutable slice.
    ///
    /// # Safety
    ///
    /// `len <= capacity` and the first `len` slots need to hold live values.
    pub unsafe fn slice_mut(&mut self, len: usize) -> &mut [T] {
        debug_assert!(len <= self.capacity);
        slice::from_raw_parts_mut(self.ptr.as_ptr(), len)
    }

    /// Drops the values in slots `[start, end)` in place.
    ///
    /// # Safety
    ///
    /// `start <= end <= capacity` and all slots in the range need to hold live values, which are dead afterwards.
    pub unsafe fn drop_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.capacity);
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr().add(start), end - start));
    }

    /// Moves `count` values from `src[src_index..]` into `self[dst_index..]`.
    ///
    /// # Safety
    ///
    /// - both ranges need to be in bounds
    /// - the source slots need to hold live values and are logically uninitialized afterwards
    /// - live values in the destination slots are leaked
    pub unsafe fn move_from(&mut self, dst_index: usize, src: &Buffer<T>, src_index: usize, count: usize) {
        debug_assert!(dst_index + count <= self.capacity);
        debug_assert!(src_index + count <= src.capacity);
        ptr::copy_nonoverlapping(src.ptr.as_ptr().add(src_index), self.ptr.as_ptr().add(dst_index), count);
    }

    /// Moves `count` values within the buffer from slot `src` to slot `dst`, the ranges may overlap.
    ///
    /// # Safety
    ///
    /// Both ranges need to be in bounds.
    /// Source slots not covered by the destination range are logically uninitialized afterwards.
    pub unsafe fn shift(&mut self, src: usize, dst: usize, count: usize) {
        debug_assert!(src + count <= self.capacity);
        debug_assert!(dst + count <= self.capacity);
        let base = self.ptr.as_ptr();
        ptr::copy(base.add(src), base.add(dst), count);
    }

    /// Exchange ownership of the allocations of `self` and `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Relinquish ownership of the allocation, returning the pointer and capacity.
    ///
    /// After calling this function, the caller is responsible for the memory previously managed by the buffer.
    /// The only way to release it is to convert it back into a `Buffer` with [`Buffer::from_raw_parts`].
    #[must_use = "the memory will leak if the parts are not passed back to `Buffer::from_raw_parts`"]
    pub fn release(self) -> (NonNull<T>, usize) {
        let me = ManuallyDrop::new(self);
        (me.ptr, me.capacity)
    }

    /// Re-adopt an allocation returned from [`Buffer::release`].
    ///
    /// # Safety
    ///
    /// `ptr` and `capacity` need to come from a single call to [`Buffer::release`] for the same `T`,
    /// and the parts may not be adopted more than once.
    pub unsafe fn from_raw_parts(ptr: NonNull<T>, capacity: usize) -> Self {
        Self { ptr, capacity, _phantom: PhantomData }
    }

    fn current_layout(&self) -> Option<Layout> {
        if self.is_allocated() {
            // SAFETY: the same layout was successfully computed when allocating
            Some(unsafe { Layout::from_size_align_unchecked(size_of::<T>() * self.capacity, mem::align_of::<T>()) })
        } else {
            None
        }
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        if let Some(layout) = self.current_layout() {
            track_dealloc(layout);
            // SAFETY: the pointer was allocated with this layout in `try_allocate`
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), layout) };
        }
    }
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Central function for reserve error handling
#[cold]
#[track_caller]
pub(crate) fn handle_reserve_error(err: TryReserveError) -> ! {
    match err {
        TryReserveError::CapacityOverflow => {
            log_severe!(LOG_CAT, handle_reserve_error, "capacity overflow");
            panic!("capacity overflow");
        },
        TryReserveError::AllocError(layout) => {
            log_severe!(LOG_CAT, handle_reserve_error, "failed to allocate {} bytes (align {})", layout.size(), layout.align());
            alloc::handle_alloc_error(layout)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_does_not_allocate() {
        let buf = Buffer::<u32>::new();
        assert_eq!(buf.capacity(), 0);
        assert!(!buf.is_allocated());

        let buf = Buffer::<()>::allocate(16);
        assert_eq!(buf.capacity(), 16);
        assert!(!buf.is_allocated());
    }

    #[test]
    fn write_read_and_slice() {
        let mut buf = Buffer::<String>::allocate(4);
        assert_eq!(buf.capacity(), 4);
        assert!(buf.is_allocated());

        unsafe {
            buf.write(0, "a".to_string());
            buf.write(1, "b".to_string());
            assert_eq!(buf.slice(2), ["a", "b"]);

            buf.get_mut(1).push('c');
            assert_eq!(buf.get(1), "bc");

            let a = buf.read(0);
            assert_eq!(a, "a");
            buf.drop_range(1, 2);
        }
    }

    #[test]
    fn shift_handles_overlap() {
        let mut buf = Buffer::<u32>::allocate(5);
        unsafe {
            for i in 0..4 {
                buf.write(i, i as u32);
            }
            buf.shift(1, 2, 3);
            buf.write(1, 9);
            assert_eq!(buf.slice(5), [0, 9, 1, 2, 3]);
        }
    }

    #[test]
    fn move_between_buffers_and_swap() {
        let mut small = Buffer::<u32>::allocate(2);
        unsafe {
            small.write(0, 1);
            small.write(1, 2);
        }

        let mut big = Buffer::<u32>::allocate(4);
        unsafe { big.move_from(1, &small, 0, 2) };
        small.swap(&mut big);

        assert_eq!(small.capacity(), 4);
        assert_eq!(big.capacity(), 2);
        unsafe { assert_eq!(&small.slice(3)[1..], [1, 2]) };
    }

    #[test]
    fn release_and_readopt() {
        let buf = Buffer::<u64>::allocate(8);
        let (ptr, capacity) = buf.release();
        assert_eq!(capacity, 8);
        let buf = unsafe { Buffer::from_raw_parts(ptr, capacity) };
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn capacity_overflow_is_reported() {
        assert_eq!(Buffer::<u64>::try_allocate(usize::MAX).unwrap_err(), TryReserveError::CapacityOverflow);
        assert_eq!(Buffer::<u64>::try_allocate(isize::MAX as usize / 4).unwrap_err(), TryReserveError::CapacityOverflow);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn allocate_panics_on_overflow() {
        let _ = Buffer::<u64>::allocate(usize::MAX);
    }

    #[cfg(feature = "memory_tracking")]
    #[test]
    fn released_exactly_once() {
        use crate::mem::thread_alloc_stats;

        let before = thread_alloc_stats();
        {
            let mut a = Buffer::<u16>::allocate(3);
            let mut b = Buffer::<u16>::allocate(5);
            a.swap(&mut b);
            let (ptr, cap) = b.release();
            let _b = unsafe { Buffer::from_raw_parts(ptr, cap) };
            let _empty = Buffer::<u16>::allocate(0);
        }
        let delta = thread_alloc_stats().since(&before);
        assert_eq!(delta.allocs, 2);
        assert_eq!(delta.deallocs, 2);
        assert_eq!(delta.live_bytes, before.live_bytes);
    }
}
