//! Growable, gap-free sequence of elements
//!
//! A [`Sequence`] keeps its elements packed in slots `0 .. len()` of a
//! single owned buffer. The buffer's slot count is tracked here rather than
//! left to [`Vec`]'s own growth heuristics: it starts at a caller hint or
//! [`DEFAULT_CAPACITY`], doubles each time an insertion finds it full, and
//! never shrinks.
//!
//! Elements may carry resources that need releasing before the element goes
//! away. A [`Cleanup`] callback, if configured, runs on the outgoing element
//! during [`Sequence::replace`] and [`Sequence::delete`], and on every live
//! element, first to last, when the sequence is disposed or dropped.
//! Elements that only shift position during an insert or delete are moved,
//! not cleaned up.

use crate::Error;
use std::cmp::Ordering;
use std::rc::Rc;
use std::{fmt, mem, slice};

/// Number of slots reserved when no capacity hint is given
pub const DEFAULT_CAPACITY: usize = 4;

/// Callback run on an element right before it leaves a container
///
/// Shared via [`Rc`] so that a [`crate::BucketMap`] can give the same
/// callback to each of its buckets.
pub type Cleanup<T> = Rc<dyn Fn(&mut T)>;

/// Resizable contiguous sequence of elements
///
/// Positions are element indices. Every operation that takes an index
/// panics if the index falls outside the live range, the same way slice
/// indexing does.
pub struct Sequence<T> {
    /// Live elements, exactly `len()` of them with no gaps
    items: Vec<T>,
    /// Number of slots reserved in `items`
    ///
    /// Kept separately so the doubling policy is exact, independent of
    /// whatever extra room the allocator hands back.
    capacity: usize,
    /// Optional callback for elements leaving the sequence
    cleanup: Option<Cleanup<T>>,
    /// Owned by a [`crate::BucketMap`], which logs lifecycle events itself
    bucket: bool,
}

impl<T> Sequence<T> {
    /// Make a new empty [`Sequence`] with default settings.
    pub fn new() -> Result<Self, Error> {
        SequenceBuilder::new().build()
    }

    /// Make a new empty [`Sequence`] with room for `hint` elements.
    ///
    /// A hint of zero selects [`DEFAULT_CAPACITY`].
    pub fn with_capacity(hint: usize) -> Result<Self, Error> {
        SequenceBuilder::new().initial_capacity(hint).build()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of element slots currently reserved.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Width of one stored element, in bytes.
    pub fn element_size(&self) -> usize {
        mem::size_of::<T>()
    }

    /// Borrow the element at `index`.
    ///
    /// Panics if `index >= len()`.
    pub fn at(&self, index: usize) -> &T {
        self.check_index(index);
        &self.items[index]
    }

    /// Mutably borrow the element at `index`.
    ///
    /// Panics if `index >= len()`.
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        self.check_index(index);
        &mut self.items[index]
    }

    /// Overwrite the element at `index`.
    ///
    /// The previous occupant is passed to the cleanup callback first, if
    /// there is one. Panics if `index >= len()`.
    pub fn replace(&mut self, element: T, index: usize) {
        self.check_index(index);
        let slot = &mut self.items[index];
        if let Some(cleanup) = &self.cleanup {
            cleanup(&mut *slot);
        }
        *slot = element;
    }

    /// Insert an element at `index`, shifting later elements one slot right.
    ///
    /// `index == len()` inserts at the end. Panics if `index > len()`.
    pub fn insert(&mut self, element: T, index: usize) {
        assert!(
            index <= self.items.len(),
            "insert position {} out of range for sequence of length {}",
            index,
            self.items.len()
        );
        self.reserve_slot();
        self.items.insert(index, element);
    }

    /// Add an element after the last one.
    pub fn append(&mut self, element: T) {
        self.reserve_slot();
        self.items.push(element);
    }

    /// Remove the element at `index`, shifting later elements one slot left.
    ///
    /// The removed element is passed to the cleanup callback first, if
    /// there is one. Panics if `index >= len()`.
    pub fn delete(&mut self, index: usize) {
        self.check_index(index);
        if let Some(cleanup) = &self.cleanup {
            cleanup(&mut self.items[index]);
        }
        drop(self.items.remove(index));
    }

    /// Reorder all elements using a three-way comparison.
    ///
    /// The sort is not stable. Equal elements end up in no particular
    /// relative order.
    pub fn sort(&mut self, compare: impl FnMut(&T, &T) -> Ordering) {
        self.items.sort_unstable_by(compare);
    }

    /// Visit every element in index order with some caller data.
    ///
    /// The visitor may modify elements in place. It has no way to add or
    /// remove elements while the traversal runs.
    pub fn map<A: ?Sized>(&mut self, mut visit: impl FnMut(&mut T, &mut A), aux: &mut A) {
        for item in self.items.iter_mut() {
            visit(item, &mut *aux);
        }
    }

    /// Find the position of an element equal to `key`.
    ///
    /// Only positions `start .. len()` are examined. `compare` is called
    /// with the key first and a stored element second, and `Equal` counts
    /// as a match.
    ///
    /// With `sorted` set, the range is bisected, so it must already be in
    /// ascending order under `compare`; any one of several equal elements
    /// may be returned. Otherwise the range is scanned from `start` and the
    /// first match wins.
    ///
    /// Panics if `start >= len()`, which includes every search of an empty
    /// sequence.
    pub fn search(
        &self,
        key: &T,
        mut compare: impl FnMut(&T, &T) -> Ordering,
        start: usize,
        sorted: bool,
    ) -> Option<usize> {
        assert!(
            start < self.items.len(),
            "search start {} out of range for sequence of length {}",
            start,
            self.items.len()
        );
        let tail = &self.items[start..];
        let found = if sorted {
            tail.binary_search_by(|item| compare(key, item).reverse())
                .ok()
        } else {
            tail.iter()
                .position(|item| compare(key, item) == Ordering::Equal)
        };
        found.map(|offset| start + offset)
    }

    /// Release every element and the storage.
    ///
    /// Equivalent to dropping the sequence: each live element is passed to
    /// the cleanup callback in index order.
    pub fn dispose(self) {
        drop(self);
    }

    /// View the live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate over the live elements in index order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate mutably over the live elements in index order.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Assemble an empty sequence from already validated settings.
    fn from_parts(capacity: usize, cleanup: Option<Cleanup<T>>, bucket: bool) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            cleanup,
            bucket,
        }
    }

    /// Panic unless `index` names a live element.
    #[inline(always)]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.items.len(),
            "index {} out of range for sequence of length {}",
            index,
            self.items.len()
        );
    }

    /// Make sure there's a free slot for one more element.
    #[inline(always)]
    fn reserve_slot(&mut self) {
        if self.items.len() == self.capacity {
            self.grow();
        }
    }

    /// Double the reserved slot count.
    fn grow(&mut self) {
        let from = self.capacity;
        self.capacity = match from.checked_mul(2) {
            Some(to) => to,
            None => panic!("sequence capacity overflow growing from {} slots", from),
        };
        self.items.reserve_exact(self.capacity - self.items.len());
        tracing::trace!(from, to = self.capacity, "growing sequence storage");
    }
}

impl<T> Drop for Sequence<T> {
    fn drop(&mut self) {
        if let Some(cleanup) = &self.cleanup {
            for item in self.items.iter_mut() {
                cleanup(item);
            }
        }
        if !self.bucket {
            tracing::trace!(
                elements = self.items.len(),
                capacity = self.capacity,
                "disposed sequence"
            );
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("items", &self.items)
            .field("capacity", &self.capacity)
            .field("cleanup", &self.cleanup.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Sequence<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Builder for creating [`Sequence`] instances with custom settings
pub struct SequenceBuilder<T> {
    /// Requested starting slot count, zero for the default
    initial_capacity: usize,
    /// Cleanup callback handed to each built sequence
    cleanup: Option<Cleanup<T>>,
    /// Build map buckets, which skip their own lifecycle events
    bucket: bool,
}

impl<T> SequenceBuilder<T> {
    /// Create a new [`SequenceBuilder`] with default settings.
    ///
    /// Immediately calling [`Self::build()`] would be equivalent to using
    /// [`Sequence::new()`].
    pub fn new() -> Self {
        Self {
            initial_capacity: 0,
            cleanup: None,
            bucket: false,
        }
    }

    /// Reserve room for `hint` elements up front.
    ///
    /// Zero selects [`DEFAULT_CAPACITY`].
    pub fn initial_capacity(&mut self, hint: usize) -> &mut Self {
        self.initial_capacity = hint;
        self
    }

    /// Run `cleanup` on each element right before it leaves the sequence.
    pub fn cleanup(&mut self, cleanup: impl Fn(&mut T) + 'static) -> &mut Self {
        self.cleanup = Some(Rc::new(cleanup));
        self
    }

    /// Set or clear an already shared cleanup callback.
    pub(crate) fn shared_cleanup(&mut self, cleanup: Option<Cleanup<T>>) -> &mut Self {
        self.cleanup = cleanup;
        self
    }

    /// Mark built sequences as buckets of a map.
    pub(crate) fn bucket(&mut self) -> &mut Self {
        self.bucket = true;
        self
    }

    /// Build an empty [`Sequence`] with the selected options.
    ///
    /// Fails with [`Error::ZeroSizedElement`] if `T` has no size.
    pub fn build(&self) -> Result<Sequence<T>, Error> {
        if mem::size_of::<T>() == 0 {
            return Err(Error::ZeroSizedElement);
        }
        let capacity = match self.initial_capacity {
            0 => DEFAULT_CAPACITY,
            hint => hint,
        };
        if !self.bucket {
            tracing::debug!(
                element_size = mem::size_of::<T>(),
                capacity,
                "built sequence"
            );
        }
        Ok(Sequence::from_parts(capacity, self.cleanup.clone(), self.bucket))
    }
}

impl<T> Default for SequenceBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use super::{Sequence, SequenceBuilder, DEFAULT_CAPACITY};
    use crate::Error;

    #[test]
    fn capacity_doubles_when_full() {
        let mut seq = Sequence::new().unwrap();
        assert_eq!(seq.capacity(), DEFAULT_CAPACITY);
        for i in 0..4_u32 {
            seq.append(i);
        }
        assert_eq!(seq.capacity(), 4);
        seq.append(4);
        assert_eq!(seq.capacity(), 8);
        for i in 5..9_u32 {
            seq.insert(i, 0);
        }
        assert_eq!(seq.capacity(), 16);
        assert_eq!(seq.len(), 9);
    }

    #[test]
    fn capacity_hint_is_exact() {
        let mut seq = Sequence::with_capacity(3).unwrap();
        assert_eq!(seq.capacity(), 3);
        for i in 0..4_u8 {
            seq.append(i);
        }
        assert_eq!(seq.capacity(), 6);
        assert!(seq.items.capacity() >= 6);
    }

    #[test]
    fn capacity_never_shrinks() {
        let mut seq = Sequence::new().unwrap();
        for i in 0..20_u64 {
            seq.append(i);
        }
        let reserved = seq.capacity();
        while !seq.is_empty() {
            seq.delete(0);
        }
        assert_eq!(seq.capacity(), reserved);
    }

    #[test]
    fn zero_sized_elements_rejected() {
        assert!(matches!(
            SequenceBuilder::<()>::new().build(),
            Err(Error::ZeroSizedElement)
        ));
    }
}
