use core::{
    fmt,
    iter::FusedIterator,
};

use crate::mem::Buffer;
use super::DynArr;

/// An iterator that moves out of a dynamic array.
///
/// This `struct` is created by the `into_iter` method on [`DynArr`] (provided by the [`IntoIterator`] trait).
///
/// # Example
///
/// ```
/// use svec_common::dynarr;
///
/// let arr = dynarr![0, 1, 2];
/// let iter: svec_common::collections::IntoIter<_> = arr.into_iter();
/// assert_eq!(iter.collect::<Vec<_>>(), [0, 1, 2]);
/// ```
pub struct IntoIter<T> {
    buf:   Buffer<T>,
    /// Index of the next element to yield from the front.
    front: usize,
    /// One past the index of the next element to yield from the back.
    back:  usize,
}

impl<T> IntoIter<T> {
    /// Takes ownership of `buf`, of which the first `len` slots hold live values.
    pub(super) fn new(buf: Buffer<T>, len: usize) -> Self {
        Self { buf, front: 0, back: len }
    }

    /// Returns the remaining items of this iterator as a slice.
    ///
    /// ```
    /// use svec_common::dynarr;
    ///
    /// let arr = dynarr!['a', 'b', 'c'];
    /// let mut into_iter = arr.into_iter();
    /// assert_eq!(into_iter.as_slice(), &['a', 'b', 'c']);
    /// let _ = into_iter.next().unwrap();
    /// assert_eq!(into_iter.as_slice(), &['b', 'c']);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        unsafe { &self.buf.slice(self.back)[self.front..] }
    }

    /// Returns the remaining items of this iterator as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let front = self.front;
        unsafe { &mut self.buf.slice_mut(self.back)[front..] }
    }
}

impl<T> AsRef<[T]> for IntoIter<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            None
        } else {
            let value = unsafe { self.buf.read(self.front) };
            self.front += 1;
            Some(value)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            None
        } else {
            self.back -= 1;
            Some(unsafe { self.buf.read(self.back) })
        }
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: Clone> Clone for IntoIter<T> {
    fn clone(&self) -> Self {
        DynArr::<T>::from(self.as_slice()).into_iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        unsafe { self.buf.drop_range(self.front, self.back) };
        // Buffer handles deallocation
    }
}
