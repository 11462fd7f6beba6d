use core::{
    borrow::{Borrow, BorrowMut},
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem::{self, ManuallyDrop},
    ops::{Deref, DerefMut, Index, IndexMut, Range},
    ptr,
    slice::{self, SliceIndex},
};

use scopeguard::ScopeGuard;
use svec_logging::{log_debug, log_warning, LogCategory};

use crate::mem::{handle_reserve_error, Buffer};
use super::{impl_slice_partial_eq_generic, DoubleOrMinReserveStrategy, OutOfRange, ReserveHint, ReserveStrategy, TryReserveError};

mod into_iter;

pub use into_iter::IntoIter;

const LOG_CAT : LogCategory = LogCategory::new_with_sub("Collections", "DynArr");

/// A contiguous growable array type, also known as a dynamic array, or DynArr.
///
/// Dynamic arrays have *O*(1) indexing, amortized *O*(1) push (to the end), and *O*(1) pop (from the back).
///
/// _Note: It was decided to not name this `Vec` as in the standard library, as this is easily confusable with a math vector_
///
/// # Examples
///
/// ```
/// use svec_common::collections::DynArr;
///
/// let mut arr: DynArr<i32> = DynArr::new();
/// arr.push(1);
/// arr.push(2);
///
/// assert_eq!(arr.len(), 2);
/// assert_eq!(arr[0], 1);
///
/// arr[0] = 7;
/// assert_eq!(arr[0], 7);
///
/// arr.extend([1, 2, 3]);
/// assert_eq!(arr, [7, 2, 1, 2, 3]);
/// ```
///
/// The [`dynarr!`](crate::dynarr) macro is provided for convenient initialization:
///
/// ```
/// use svec_common::dynarr;
///
/// let mut arr1 = dynarr![1, 2, 3];
/// arr1.push(4);
/// let arr2 = dynarr![1, 2, 3, 4];
/// assert_eq!(arr1, arr2);
///
/// let zeros = dynarr![0; 5];
/// assert_eq!(zeros, [0, 0, 0, 0, 0]);
/// ```
///
/// # Capacity and reallocation
///
/// The capacity of a dynamic array is the number of slots allocated for elements that can be added to it.
/// This is not to be confused with the length, which is the number of actual elements within the dynamic array.
/// When the length would exceed the capacity, a new buffer is allocated with a capacity chosen by the reserve strategy `R`,
/// the elements are moved into it and only then is the old buffer released.
/// With the default [`DoubleOrMinReserveStrategy`], the capacity doubles, starting at 1.
///
/// A growing operation never leaves the dynamic array half-migrated: either it completes,
/// or (when a panic occurs while constructing new elements) the dynamic array is left as it was.
///
/// # Invalidation
///
/// Any operation that may reallocate or shift elements takes `&mut self`,
/// so references and iterators into a dynamic array can't outlive such a call.
pub struct DynArr<T, R: ReserveStrategy = DoubleOrMinReserveStrategy> {
    buf:      Buffer<T>,
    len:      usize,
    _phantom: PhantomData<R>,
}

static_assertions::assert_impl_all!(DynArr<u32>: Send, Sync);
static_assertions::assert_eq_size!(DynArr<u8>, [usize; 3]);

impl<T, R: ReserveStrategy> DynArr<T, R> {
    /// Constructs a new, empty `DynArr<T>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Buffer::new(), len: 0, _phantom: PhantomData }
    }

    /// Constructs a new, empty `DynArr<T>` with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_reserve_hint(ReserveHint::new(capacity))
    }

    /// Constructs a new, empty `DynArr<T>`, reserving the capacity requested by `hint`.
    ///
    /// ```
    /// use svec_common::collections::{make_reserve_hint, DynArr};
    ///
    /// let arr: DynArr<String> = DynArr::with_reserve_hint(make_reserve_hint(5));
    /// assert_eq!(arr.len(), 0);
    /// assert_eq!(arr.capacity(), 5);
    /// ```
    #[must_use]
    pub fn with_reserve_hint(hint: ReserveHint) -> Self {
        let mut arr = Self::new();
        arr.reserve(hint.capacity());
        arr
    }

    /// Returns the total number of elements the dynamic array can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the number of elements in the dynamic array.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the dynamic array contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Makes sure the dynamic array can hold at least `new_capacity` elements.
    ///
    /// Unlike `Vec::reserve`, the argument is the absolute capacity, not the additional one.
    /// Does nothing if the capacity is already sufficient, otherwise the capacity becomes exactly `new_capacity`.
    /// Neither the length nor any element changes.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Examples
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let mut arr = dynarr![1];
    /// arr.reserve(10);
    /// assert_eq!(arr.capacity(), 10);
    /// arr.reserve(4);
    /// assert_eq!(arr.capacity(), 10);
    /// ```
    pub fn reserve(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity() {
            return;
        }
        if let Err(err) = self.grow_to(new_capacity) {
            handle_reserve_error(err);
        }
    }

    /// Tries to make sure the dynamic array can hold at least `new_capacity` elements.
    ///
    /// # Errors
    ///
    /// If the capacity overflows, or the allocator reports a failure, an error is returned and the dynamic array is left unchanged.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), TryReserveError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        self.grow_to(new_capacity).map_err(|err| {
            log_warning!(LOG_CAT, "Failed to reserve {new_capacity} elements: {err}");
            err
        })
    }

    /// Shortens the dynamic array, keeping the first `len` elements and dropping the rest immediately.
    ///
    /// If `len` is greater or equal to the dynamic array's current length, this has no effect.
    /// The capacity is left untouched.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let old_len = self.len;
        // Update the length first, so a panicking destructor can't cause a double drop
        self.len = len;
        unsafe { self.buf.drop_range(len, old_len) };
    }

    /// Extracts a slice containing the entire dynamic array.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { self.buf.slice(self.len) }
    }

    /// Extracts a mutable slice containing the entire dynamic array.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { self.buf.slice_mut(self.len) }
    }

    /// Returns a raw pointer to the dynamic array's buffer, or a dangling pointer if it did not allocate.
    ///
    /// The pointer is invalidated by any operation that reallocates.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns a raw mutable pointer to the dynamic array's buffer, or a dangling pointer if it did not allocate.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Returns a reference to the element at `index`, or [`OutOfRange`] if `index >= len`.
    ///
    /// The dynamic array is never changed by a failed lookup.
    ///
    /// ```
    /// use svec_common::{dynarr, collections::OutOfRange};
    ///
    /// let arr = dynarr![10, 40, 30];
    /// assert_eq!(arr.at(1), Ok(&40));
    /// assert_eq!(arr.at(3), Err(OutOfRange));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        self.as_slice().get(index).ok_or(OutOfRange)
    }

    /// Returns a mutable reference to the element at `index`, or [`OutOfRange`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        self.as_mut_slice().get_mut(index).ok_or(OutOfRange)
    }

    /// Removes an element from the dynamic array and returns it.
    ///
    /// The removed element is replaced by the last element of the dynamic array.
    /// This does not preserve ordering, but is *O*(1).
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of bounds.
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let mut arr = dynarr!["foo", "bar", "baz", "qux"];
    ///
    /// assert_eq!(arr.swap_remove(1), "bar");
    /// assert_eq!(arr, ["foo", "qux", "baz"]);
    ///
    /// assert_eq!(arr.swap_remove(0), "foo");
    /// assert_eq!(arr, ["baz", "qux"]);
    /// ```
    #[track_caller]
    pub fn swap_remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("swap_remove index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        unsafe {
            // Replace self[index] with the last element.
            // If the bounds check above succeeds, there must be a last element (which can be self[index] itself).
            let value = self.buf.read(index);
            self.buf.shift(len - 1, index, 1);
            self.len = len - 1;
            value
        }
    }

    /// Inserts an element at position `index`, shifting all elements after it to the right,
    /// and returns a reference to the inserted element.
    ///
    /// When the dynamic array is full, the elements are moved into a new buffer around the inserted element,
    /// instead of being moved twice.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3];
    /// *arr.insert(1, 4) += 1;
    /// assert_eq!(arr, [1, 5, 2, 3]);
    /// arr.insert(4, 6);
    /// assert_eq!(arr, [1, 5, 2, 3, 6]);
    /// ```
    ///
    /// # Time complexity
    ///
    /// Takes *O*([`DynArr::len`]) time.
    /// All items after the insertion index must be shifted to the right.
    #[track_caller]
    pub fn insert(&mut self, index: usize, element: T) -> &mut T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("insertion index (is {index}) should be <= len (is {len})");
        }

        let len = self.len;
        if index > len {
            assert_failed(index, len);
        }

        if len < self.capacity() {
            unsafe {
                // Shift everything over to make space, duplicating the `index`th element into two consecutive places.
                self.buf.shift(index, index + 1, len - index);
                // Overwrite the first copy of the `index`th element.
                self.buf.write(index, element);
            }
        } else {
            let new_capacity = self.amortized_capacity(1);
            let mut new_buf = Buffer::allocate(new_capacity);
            unsafe {
                new_buf.move_from(0, &self.buf, 0, index);
                new_buf.write(index, element);
                new_buf.move_from(index + 1, &self.buf, index, len - index);
            }
            log_debug!(LOG_CAT, Self::insert, "Reallocated dynamic array from {} to {new_capacity} elements", self.capacity());
            self.adopt(new_buf);
        }
        self.len = len + 1;
        unsafe { self.buf.get_mut(index) }
    }

    /// Removes and returns the element at position `index`, shifting all elements after it to the left.
    ///
    /// Note: Because this shifts over the remaining elements, it has a worst-case performance of *O*(*n*).
    /// If you don't need the order of elements to be preserved, use [`swap_remove`] instead.
    ///
    /// [`swap_remove`]: DynArr::swap_remove
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3];
    /// assert_eq!(arr.remove(1), 2);
    /// assert_eq!(arr, [1, 3]);
    /// ```
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        unsafe {
            // Copy it out, unsafely having a copy of the value on the stack and in the dynamic array at the same time.
            let value = self.buf.read(index);
            // Shift everything down to fill in that spot.
            self.buf.shift(index + 1, index, len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Drops the element at position `index`, shifting all elements after it to the left.
    ///
    /// Returns the position of the element that followed the erased one,
    /// which is equal to the new length when the last element was erased.
    ///
    /// The capacity is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3];
    /// assert_eq!(arr.erase(0), 0);
    /// assert_eq!(arr, [2, 3]);
    /// assert_eq!(arr.erase(1), 1);
    /// assert_eq!(arr.len(), 1);
    /// ```
    #[track_caller]
    pub fn erase(&mut self, index: usize) -> usize {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("erase index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        let value = unsafe {
            let value = self.buf.read(index);
            self.buf.shift(index + 1, index, len - index - 1);
            value
        };
        self.len = len - 1;
        drop(value);
        index
    }

    /// Appends an element to the back of the dynamic array.
    ///
    /// To push a copy of a value, push `value.clone()`.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Time complexity
    ///
    /// Takes amortized *O*(1) time.
    /// If the dynamic array's length would exceed its capacity after the push, *O*(*capacity*) time is taken to move the elements to a larger buffer.
    /// This expensive operation is offset by the *capacity* *O*(1) insertions it allows.
    #[inline]
    pub fn push(&mut self, value: T) {
        let len = self.len;
        if len == self.capacity() {
            self.grow_one();
        }
        unsafe { self.buf.write(len, value) };
        self.len = len + 1;
    }

    /// Appends an element if there is sufficient spare capacity, otherwise an error is returned with the element.
    ///
    /// Unlike [`push`], this method will not reallocate when there's insufficient capacity.
    /// The caller should use [`reserve`] or [`try_reserve`] to ensure that there is enough capacity.
    ///
    /// [`push`]: DynArr::push
    /// [`reserve`]: DynArr::reserve
    /// [`try_reserve`]: DynArr::try_reserve
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.len == self.capacity() {
            return Err(value);
        }
        unsafe { self.buf.write(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element from the dynamic array and returns it, or [`None`] if it is empty.
    ///
    /// # Time complexity
    ///
    /// Takes *O*(1) time.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            Some(unsafe { self.buf.read(self.len) })
        }
    }

    /// Drops the last element of the dynamic array, does nothing if it is empty.
    pub fn pop_back(&mut self) {
        drop(self.pop());
    }

    /// Drops all values, leaving the capacity and the buffer untouched.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchanges the contents of `self` and `other`.
    ///
    /// Only the buffers and lengths are exchanged, no element is moved.
    /// To swap 2 elements, use `as_mut_slice().swap(a, b)`.
    pub fn swap(&mut self, other: &mut Self) {
        self.buf.swap(&mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Moves the contents out of the dynamic array, leaving it empty without a buffer.
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3];
    /// let taken = arr.take();
    /// assert_eq!(taken, [1, 2, 3]);
    /// assert_eq!((arr.len(), arr.capacity()), (0, 0));
    /// ```
    #[must_use = "use `clear` to only drop the elements"]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    /// Replaces the contents of `self` by those of `source`, leaving `source` empty without a buffer.
    ///
    /// The previous contents of `self` are dropped.
    pub fn assign_take(&mut self, source: &mut Self) {
        let mut taken = source.take();
        self.swap(&mut taken);
    }

    /// Resizes the dynamic array in-place so that `len` is equal to `new_len`.
    ///
    /// If `new_len` is greater than `len`, the dynamic array is extended by the difference,
    /// with each additional slot filled with the result of calling the closure `f`.
    /// The new elements are created in a new buffer holding at least double the current capacity, before the existing elements are moved into it.
    /// If `f` panics, the elements created so far are dropped and the dynamic array is left unchanged.
    ///
    /// If `new_len` is less than `len`, the dynamic array is truncated.
    /// The capacity is kept, so alternating shrinking and growing calls double the capacity on every growth.
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3];
    /// let mut next = 4;
    /// arr.resize_with(5, || { next += 1; next - 1 });
    /// assert_eq!(arr, [1, 2, 3, 4, 5]);
    /// assert_eq!(arr.capacity(), 6);
    /// ```
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F) where
        F: FnMut() -> T
    {
        let len = self.len;
        if new_len <= len {
            self.truncate(new_len);
            return;
        }

        let new_capacity = self.amortized_capacity(new_len - len);
        // New slots are created first, so a panic in `f` leaves `self` untouched
        let mut new_buf = Self::fill_buffer(Buffer::allocate(new_capacity), len..new_len, |_| f());
        unsafe { new_buf.move_from(0, &self.buf, 0, len) };
        log_debug!(LOG_CAT, Self::resize_with::<F>, "Reallocated dynamic array from {} to {new_capacity} elements", self.capacity());
        self.adopt(new_buf);
        self.len = new_len;
    }

    /// Replace the current buffer by one with exactly `new_capacity` slots, moving all elements into it.
    fn grow_to(&mut self, new_capacity: usize) -> Result<(), TryReserveError> {
        debug_assert!(new_capacity >= self.len);
        let mut new_buf = Buffer::try_allocate(new_capacity)?;
        unsafe { new_buf.move_from(0, &self.buf, 0, self.len) };
        log_debug!(LOG_CAT, Self::grow_to, "Reallocated dynamic array from {} to {new_capacity} elements", self.capacity());
        self.adopt(new_buf);
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn grow_one(&mut self) {
        let new_capacity = self.amortized_capacity(1);
        if let Err(err) = self.grow_to(new_capacity) {
            handle_reserve_error(err);
        }
    }

    /// Capacity needed to hold `additional` more elements, according to the reserve strategy.
    #[track_caller]
    fn amortized_capacity(&self, additional: usize) -> usize {
        let new_capacity = self.len.checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)
            .and_then(|required| R::calculate(self.capacity(), required));
        match new_capacity {
            Ok(capacity) => capacity,
            Err(err) => handle_reserve_error(err),
        }
    }

    /// Swap in a fully populated buffer, releasing the old one.
    ///
    /// The live elements of the old buffer must already have been moved out.
    fn adopt(&mut self, mut new_buf: Buffer<T>) {
        self.buf.swap(&mut new_buf);
    }

    /// Fills the slots in `range` with the values returned by `f`, called with the slot's index.
    ///
    /// If `f` panics, the values written so far are dropped and the buffer is released.
    fn fill_buffer<F>(buf: Buffer<T>, range: Range<usize>, mut f: F) -> Buffer<T> where
        F: FnMut(usize) -> T
    {
        let start = range.start;
        let mut guard = scopeguard::guard((buf, start), |(mut buf, init)| unsafe {
            buf.drop_range(start, init);
        });
        for idx in range {
            let value = f(idx);
            let (buf, init) = &mut *guard;
            unsafe { buf.write(idx, value) };
            *init += 1;
        }
        ScopeGuard::into_inner(guard).0
    }

    /// Creates a dynamic array with `len` elements created by `f`, with a capacity of exactly `len`.
    fn from_fn(len: usize, f: impl FnMut(usize) -> T) -> Self {
        let buf = Self::fill_buffer(Buffer::allocate(len), 0..len, f);
        Self { buf, len, _phantom: PhantomData }
    }
}

impl<T: Default, R: ReserveStrategy> DynArr<T, R> {
    /// Creates a dynamic array with `len` default-constructed elements and a capacity of exactly `len`.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self::from_fn(len, |_| T::default())
    }

    /// Resizes the dynamic array in-place so that `len` is equal to `new_len`, filling new slots with `T::default()`.
    ///
    /// See [`DynArr::resize_with`].
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let mut arr = dynarr!["hello".to_string()];
    /// arr.resize(3);
    /// assert_eq!(arr, ["hello", "", ""]);
    ///
    /// arr.resize(1);
    /// assert_eq!(arr, ["hello"]);
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    pub fn resize(&mut self, new_len: usize) {
        self.resize_with(new_len, T::default)
    }
}

impl<T: Clone, R: ReserveStrategy> DynArr<T, R> {
    /// Creates a dynamic array with `len` clones of `value` and a capacity of exactly `len`.
    #[must_use]
    pub fn from_elem(value: T, len: usize) -> Self {
        Self::from_fn(len, |_| value.clone())
    }

    /// Replaces the contents of `self` by a copy of `source`.
    ///
    /// The copy is fully built before it is swapped in, so if cloning an element panics, `self` is left unchanged.
    /// The previous contents of `self` are dropped after the swap.
    pub fn assign(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap(&mut copy);
    }
}

//------------------------------------------------------------------------------------------------------------------------------

impl<T, R: ReserveStrategy> Deref for DynArr<T, R> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, R: ReserveStrategy> DerefMut for DynArr<T, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T: Clone, R: ReserveStrategy> Clone for DynArr<T, R> {
    /// Creates a copy with the same elements and the same capacity, an empty dynamic array copies into one without a buffer.
    fn clone(&self) -> Self {
        if self.is_empty() {
            return Self::new();
        }
        let src = self.as_slice();
        let buf = Self::fill_buffer(Buffer::allocate(self.capacity()), 0..src.len(), |idx| src[idx].clone());
        Self { buf, len: src.len(), _phantom: PhantomData }
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source);
    }
}

impl<T: Hash, R: ReserveStrategy> Hash for DynArr<T, R> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&**self, state)
    }
}

impl<T, I: SliceIndex<[T]>, R: ReserveStrategy> Index<I> for DynArr<T, R> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>, R: ReserveStrategy> IndexMut<I> for DynArr<T, R> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

impl<T, R: ReserveStrategy> FromIterator<T> for DynArr<T, R> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new();
        arr.extend(iter);
        arr
    }
}

impl<T, R: ReserveStrategy> IntoIterator for DynArr<T, R> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Creates a consuming iterator, that is, one that moves each value out of the dynamic array (from start to end).
    /// The dynamic array cannot be used after calling this.
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let arr = dynarr!["a".to_string(), "b".to_string()];
    /// let mut iter = arr.into_iter();
    ///
    /// let first = iter.next().unwrap();
    /// assert_eq!(first, "a");
    /// assert_eq!(iter.as_slice(), ["b"]);
    /// ```
    fn into_iter(self) -> Self::IntoIter {
        let me = ManuallyDrop::new(self);
        // SAFETY: `me` is never dropped, so the buffer is only owned by the iterator
        let buf = unsafe { ptr::read(&me.buf) };
        IntoIter::new(buf, me.len)
    }
}

impl<'a, T, R: ReserveStrategy> IntoIterator for &'a DynArr<T, R> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, R: ReserveStrategy> IntoIterator for &'a mut DynArr<T, R> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, R: ReserveStrategy> Extend<T> for DynArr<T, R> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if self.capacity() - self.len < lower {
            let new_capacity = self.amortized_capacity(lower);
            self.reserve(new_capacity);
        }
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a, R: ReserveStrategy> Extend<&'a T> for DynArr<T, R> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl_slice_partial_eq_generic!([R0: ReserveStrategy, R1: ReserveStrategy] DynArr<T, R0>, DynArr<U, R1>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, &[U]);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, &mut [U]);
impl_slice_partial_eq_generic!([R: ReserveStrategy] &[T], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] &mut [T], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, [U]);
impl_slice_partial_eq_generic!([R: ReserveStrategy] [T], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy, const N: usize] DynArr<T, R>, [U; N]);
impl_slice_partial_eq_generic!([R: ReserveStrategy, const N: usize] [T; N], DynArr<U, R>);

impl<T, R0, R1> PartialOrd<DynArr<T, R1>> for DynArr<T, R0> where
    T: PartialOrd,
    R0: ReserveStrategy,
    R1: ReserveStrategy
{
    #[inline]
    fn partial_cmp(&self, other: &DynArr<T, R1>) -> Option<Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T: Eq, R: ReserveStrategy> Eq for DynArr<T, R> {}

impl<T: Ord, R: ReserveStrategy> Ord for DynArr<T, R> {
    fn cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<T, R: ReserveStrategy> Drop for DynArr<T, R> {
    fn drop(&mut self) {
        unsafe { self.buf.drop_range(0, self.len) };
        // Buffer handles deallocation
    }
}

impl<T, R: ReserveStrategy> Default for DynArr<T, R> {
    /// Creates an empty `DynArr<T>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, R: ReserveStrategy> fmt::Debug for DynArr<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T, R: ReserveStrategy> AsRef<[T]> for DynArr<T, R> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, R: ReserveStrategy> AsMut<[T]> for DynArr<T, R> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, R: ReserveStrategy> Borrow<[T]> for DynArr<T, R> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, R: ReserveStrategy> BorrowMut<[T]> for DynArr<T, R> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, R: ReserveStrategy> From<ReserveHint> for DynArr<T, R> {
    fn from(hint: ReserveHint) -> Self {
        Self::with_reserve_hint(hint)
    }
}

impl<T: Clone, R: ReserveStrategy> From<&[T]> for DynArr<T, R> {
    /// Creates a dynamic array with a copy of each element in `slice`, with a capacity of exactly `slice.len()`.
    fn from(slice: &[T]) -> Self {
        Self::from_fn(slice.len(), |idx| slice[idx].clone())
    }
}

impl<T: Clone, R: ReserveStrategy> From<&mut [T]> for DynArr<T, R> {
    fn from(slice: &mut [T]) -> Self {
        Self::from(&*slice)
    }
}

impl<T: Clone, R: ReserveStrategy, const N: usize> From<&[T; N]> for DynArr<T, R> {
    fn from(arr: &[T; N]) -> Self {
        Self::from(arr.as_slice())
    }
}

impl<T, R: ReserveStrategy, const N: usize> From<[T; N]> for DynArr<T, R> {
    /// Moves the elements of `arr` into a new dynamic array, with a capacity of exactly `N`.
    fn from(arr: [T; N]) -> Self {
        let mut buf = Buffer::allocate(N);
        let arr = ManuallyDrop::new(arr);
        unsafe { ptr::copy_nonoverlapping(arr.as_ptr(), buf.as_mut_ptr(), N) };
        Self { buf, len: N, _phantom: PhantomData }
    }
}

//------------------------------------------------------------------------------------------------------------------------------

/// Creates a [`DynArr`] containing the arguments.
///
/// `dynarr!` allows `DynArr`s to be defined with the same syntax as array expressions.
/// There are two forms of this macro:
///
/// - Create a [`DynArr`] containing a given list of elements:
///
/// ```
/// use svec_common::dynarr;
///
/// let arr = dynarr![1, 2, 3];
/// assert_eq!(arr[0], 1);
/// assert_eq!(arr[1], 2);
/// assert_eq!(arr[2], 3);
/// ```
///
/// - Create a [`DynArr`] from a given element and size:
///
/// ```
/// use svec_common::dynarr;
///
/// let arr = dynarr![1; 3];
/// assert_eq!(arr, [1, 1, 1]);
/// ```
///
/// Both forms give a capacity equal to the number of elements.
/// The second form requires `T: Clone`, it clones `elem` for every slot.
#[macro_export]
macro_rules! dynarr {
    () => {
        <$crate::collections::DynArr<_>>::new()
    };
    ($elem:expr; $n:expr) => {
        <$crate::collections::DynArr<_>>::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        <$crate::collections::DynArr<_>>::from([$($x),+])
    };
}
