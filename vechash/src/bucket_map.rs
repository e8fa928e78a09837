//! Hash table layer
//!
//! A [`BucketMap`] owns a fixed array of [`Sequence`] buckets. A
//! caller-supplied [`Hasher`] maps each element to one bucket, and a
//! caller-supplied [`Comparator`] decides whether two elements in the same
//! bucket are the same logical entry. Within a bucket, entries are kept in
//! arrival order and found by linear scan.
//!
//! The bucket count is chosen at construction and never changes. There is
//! no rehashing, so a skewed hash makes one bucket long and its lookups
//! linear in that length.

use crate::sequence::{Cleanup, Sequence, SequenceBuilder};
use crate::Error;
use std::cmp::Ordering;
use std::rc::Rc;
use std::{fmt, mem};

/// Hash callback: maps an element and a bucket count to a bucket index
///
/// The result must be less than the bucket count for every element.
pub type Hasher<T> = Rc<dyn Fn(&T, usize) -> usize>;

/// Comparison callback: `Equal` means both elements are the same entry
pub type Comparator<T> = Rc<dyn Fn(&T, &T) -> Ordering>;

/// Outcome of [`BucketMap::enter`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum Entered {
    /// No equal entry existed, so the element was added to its bucket.
    Appended,
    /// An equal entry existed and was overwritten in place.
    Replaced,
}

/// Hash table with a fixed number of [`Sequence`] buckets
///
/// Each distinct entry, as judged by the comparator, is stored at most once.
pub struct BucketMap<T> {
    /// One sequence per bucket, never resized in count
    buckets: Box<[Sequence<T>]>,
    /// Maps elements to bucket indices
    hasher: Hasher<T>,
    /// Detects equal entries within a bucket
    comparator: Comparator<T>,
}

impl<T> BucketMap<T> {
    /// Make a new empty [`BucketMap`] with `num_buckets` buckets and the
    /// given callbacks.
    ///
    /// Fails with [`Error::NoBuckets`] if `num_buckets` is zero.
    pub fn new(
        num_buckets: usize,
        hasher: impl Fn(&T, usize) -> usize + 'static,
        comparator: impl Fn(&T, &T) -> Ordering + 'static,
    ) -> Result<Self, Error> {
        BucketMapBuilder::new()
            .buckets(num_buckets)
            .hasher(hasher)
            .comparator(comparator)
            .build()
    }

    /// Total number of entries across all buckets.
    pub fn count(&self) -> usize {
        self.buckets.iter().map(Sequence::len).sum()
    }

    /// True if no bucket holds any entry.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Sequence::is_empty)
    }

    /// Number of buckets, fixed at construction.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Width of one stored element, in bytes.
    pub fn element_size(&self) -> usize {
        mem::size_of::<T>()
    }

    /// Borrow one bucket.
    ///
    /// Panics if `index >= num_buckets()`.
    pub fn bucket(&self, index: usize) -> &Sequence<T> {
        self.check_bucket(index);
        &self.buckets[index]
    }

    /// Visit every entry with some caller data, bucket by bucket.
    ///
    /// Within a bucket, entries are visited in arrival order. The visitor
    /// may modify entries in place, but changing anything the hasher or
    /// comparator looks at leaves that entry unreachable by [`Self::lookup`].
    pub fn map<A: ?Sized>(&mut self, mut visit: impl FnMut(&mut T, &mut A), aux: &mut A) {
        for bucket in self.buckets.iter_mut() {
            bucket.map(&mut visit, &mut *aux);
        }
    }

    /// Insert an element, or replace the equal entry already present.
    ///
    /// A replaced entry goes through the cleanup callback, if there is one.
    /// Panics if the hasher returns an index outside `0 .. num_buckets()`.
    pub fn enter(&mut self, element: T) -> Entered {
        let index = self.bucket_index(&element);
        match self.search_bucket(index, &element) {
            Some(position) => {
                self.buckets[index].replace(element, position);
                Entered::Replaced
            }
            None => {
                self.buckets[index].append(element);
                Entered::Appended
            }
        }
    }

    /// Find the entry equal to `key`.
    ///
    /// Panics if the hasher returns an index outside `0 .. num_buckets()`.
    pub fn lookup(&self, key: &T) -> Option<&T> {
        let index = self.bucket_index(key);
        self.search_bucket(index, key)
            .map(|position| self.buckets[index].at(position))
    }

    /// Find the entry equal to `key`, for modification in place.
    ///
    /// Changing anything the hasher or comparator looks at leaves the entry
    /// unreachable by later lookups.
    pub fn lookup_mut(&mut self, key: &T) -> Option<&mut T> {
        let index = self.bucket_index(key);
        let position = self.search_bucket(index, key)?;
        Some(self.buckets[index].at_mut(position))
    }

    /// Iterate over all entries, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.iter().flat_map(|bucket| bucket.iter())
    }

    /// Release every entry and all buckets.
    ///
    /// Equivalent to dropping the map. Buckets are released in index order,
    /// so the cleanup callback sees entries in the same order as
    /// [`Self::iter`].
    pub fn dispose(self) {
        drop(self);
    }

    /// Run the hasher and check its result.
    fn bucket_index(&self, element: &T) -> usize {
        let num_buckets = self.buckets.len();
        let index = (self.hasher)(element, num_buckets);
        assert!(
            index < num_buckets,
            "hash function returned bucket {} for a map of {} buckets",
            index,
            num_buckets
        );
        index
    }

    /// Linear scan of one bucket for an entry equal to `key`.
    fn search_bucket(&self, index: usize, key: &T) -> Option<usize> {
        let bucket = &self.buckets[index];
        if bucket.is_empty() {
            return None;
        }
        bucket.search(key, |a, b| (self.comparator)(a, b), 0, false)
    }

    /// Panic unless `index` names a bucket.
    fn check_bucket(&self, index: usize) {
        assert!(
            index < self.buckets.len(),
            "bucket {} out of range for a map of {} buckets",
            index,
            self.buckets.len()
        );
    }
}

impl<T> Drop for BucketMap<T> {
    fn drop(&mut self) {
        tracing::trace!(
            entries = self.count(),
            buckets = self.buckets.len(),
            "disposed bucket map"
        );
    }
}

impl<T: fmt::Debug> fmt::Debug for BucketMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketMap")
            .field("buckets", &self.buckets)
            .finish_non_exhaustive()
    }
}

/// Builder for creating [`BucketMap`] instances with custom settings
///
/// The bucket count, hasher and comparator have no defaults and must be
/// set before [`Self::build()`] succeeds.
pub struct BucketMapBuilder<T> {
    /// Number of buckets to allocate
    num_buckets: usize,
    /// Starting slot count for each bucket, zero for the default
    bucket_capacity: usize,
    /// Hash callback, required
    hasher: Option<Hasher<T>>,
    /// Comparison callback, required
    comparator: Option<Comparator<T>>,
    /// Cleanup callback shared by every bucket
    cleanup: Option<Cleanup<T>>,
}

impl<T> BucketMapBuilder<T> {
    /// Create a new [`BucketMapBuilder`] with nothing configured.
    pub fn new() -> Self {
        Self {
            num_buckets: 0,
            bucket_capacity: 0,
            hasher: None,
            comparator: None,
            cleanup: None,
        }
    }

    /// Select the number of buckets.
    pub fn buckets(&mut self, num_buckets: usize) -> &mut Self {
        self.num_buckets = num_buckets;
        self
    }

    /// Select the starting slot count of every bucket.
    ///
    /// Zero selects [`crate::DEFAULT_CAPACITY`].
    pub fn bucket_capacity(&mut self, hint: usize) -> &mut Self {
        self.bucket_capacity = hint;
        self
    }

    /// Select the hash callback.
    pub fn hasher(&mut self, hasher: impl Fn(&T, usize) -> usize + 'static) -> &mut Self {
        self.hasher = Some(Rc::new(hasher));
        self
    }

    /// Select the comparison callback.
    pub fn comparator(&mut self, comparator: impl Fn(&T, &T) -> Ordering + 'static) -> &mut Self {
        self.comparator = Some(Rc::new(comparator));
        self
    }

    /// Run `cleanup` on each entry right before it's replaced or dropped.
    pub fn cleanup(&mut self, cleanup: impl Fn(&mut T) + 'static) -> &mut Self {
        self.cleanup = Some(Rc::new(cleanup));
        self
    }

    /// Build an empty [`BucketMap`] with the selected options.
    pub fn build(&self) -> Result<BucketMap<T>, Error> {
        if self.num_buckets == 0 {
            return Err(Error::NoBuckets);
        }
        let hasher = self.hasher.clone().ok_or(Error::MissingHasher)?;
        let comparator = self.comparator.clone().ok_or(Error::MissingComparator)?;

        let mut bucket = SequenceBuilder::new();
        bucket
            .initial_capacity(self.bucket_capacity)
            .shared_cleanup(self.cleanup.clone())
            .bucket();
        let buckets = (0..self.num_buckets)
            .map(|_| bucket.build())
            .collect::<Result<Box<[_]>, _>>()?;

        tracing::debug!(
            element_size = mem::size_of::<T>(),
            buckets = self.num_buckets,
            "built bucket map"
        );
        Ok(BucketMap {
            buckets,
            hasher,
            comparator,
        })
    }
}

impl<T> Default for BucketMapBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use super::{BucketMap, BucketMapBuilder, Entered};
    use crate::{callbacks, Error};

    #[test]
    #[should_panic(expected = "hash function returned bucket 4 for a map of 4 buckets")]
    fn hash_equal_to_bucket_count_panics() {
        let mut map = BucketMap::new(4, |_: &u32, n| n, callbacks::natural).unwrap();
        map.enter(1);
    }

    #[test]
    #[should_panic(expected = "hash function returned bucket 7")]
    fn lookup_checks_hash_range() {
        let map = BucketMap::new(2, |v: &u32, _| *v as usize, callbacks::natural).unwrap();
        let _ = map.lookup(&7);
    }

    #[test]
    fn builder_requires_callbacks() {
        let mut builder = BucketMapBuilder::<u32>::new();
        assert!(matches!(builder.build(), Err(Error::NoBuckets)));
        builder.buckets(3);
        assert!(matches!(builder.build(), Err(Error::MissingHasher)));
        builder.hasher(callbacks::modulo);
        assert!(matches!(builder.build(), Err(Error::MissingComparator)));
        builder.comparator(callbacks::natural);
        let map = builder.build().unwrap();
        assert_eq!(map.num_buckets(), 3);
        assert!(map.is_empty());
    }

    #[test]
    fn bucket_capacity_applies_to_every_bucket() {
        let map = BucketMapBuilder::<u64>::new()
            .buckets(5)
            .bucket_capacity(16)
            .hasher(callbacks::modulo)
            .comparator(callbacks::natural)
            .build()
            .unwrap();
        for i in 0..5 {
            assert_eq!(map.bucket(i).capacity(), 16);
        }
    }

    #[test]
    fn entries_land_in_hashed_bucket() {
        let mut map = BucketMap::new(3, callbacks::modulo::<i64>, callbacks::natural).unwrap();
        for v in [-4_i64, -3, 0, 1, 2, 7, 8] {
            assert_eq!(map.enter(v), Entered::Appended);
        }
        assert_eq!(map.bucket(0).as_slice(), &[-3, 0]);
        assert_eq!(map.bucket(1).as_slice(), &[1, 7]);
        assert_eq!(map.bucket(2).as_slice(), &[-4, 2, 8]);
    }
}
