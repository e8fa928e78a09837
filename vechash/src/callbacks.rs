//! Ready-made hash and comparison callbacks
//!
//! These cover the common cases for [`crate::BucketMap`] and for
//! [`crate::Sequence::sort`] / [`crate::Sequence::search`]. Anything with the
//! right signature works just as well.

use num_traits::PrimInt;
use std::cmp::Ordering;
use std::hash::{BuildHasher, Hash};

/// Fixed `ahash` seeds, so an element maps to the same bucket every time
const HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Bucket an integer key by its Euclidean remainder.
///
/// Negative keys still land in `0 .. num_buckets`. Panics if
/// `num_buckets` is zero.
pub fn modulo<K: PrimInt>(key: &K, num_buckets: usize) -> usize {
    match key.to_i128() {
        Some(k) => k.rem_euclid(num_buckets as i128) as usize,
        // Only u128 values above i128::MAX end up here
        None => key
            .to_u128()
            .map_or(0, |k| (k % num_buckets as u128) as usize),
    }
}

/// Bucket any hashable element.
///
/// Uses a fixed-seed hasher, so results are stable across calls and
/// across processes, but not across releases of this crate.
pub fn hashed<T: Hash + ?Sized>(element: &T, num_buckets: usize) -> usize {
    let state = ahash::RandomState::with_seeds(
        HASH_SEEDS[0],
        HASH_SEEDS[1],
        HASH_SEEDS[2],
        HASH_SEEDS[3],
    );
    (BuildHasher::hash_one(&state, element) % num_buckets as u64) as usize
}

/// Compare elements by their [`Ord`] implementation.
pub fn natural<T: Ord + ?Sized>(a: &T, b: &T) -> Ordering {
    a.cmp(b)
}

/// Compare elements by a key extracted from each.
///
/// Useful when elements are key/payload pairs and only the key decides
/// whether two entries are the same.
pub fn by_key<T, K: Ord, F: Fn(&T) -> K>(key: F) -> impl Fn(&T, &T) -> Ordering {
    move |a: &T, b: &T| key(a).cmp(&key(b))
}

#[cfg(test)]
mod test {
    use super::{by_key, hashed, modulo, natural};
    use std::cmp::Ordering;

    #[test]
    fn modulo_range() {
        assert_eq!(modulo(&5_i32, 4), 1);
        assert_eq!(modulo(&-1_i32, 4), 3);
        assert_eq!(modulo(&i64::MIN, 7), 6);
        assert_eq!(modulo(&u128::MAX, 10), 5);
        assert_eq!(modulo(&200_u8, 1000), 200);
    }

    #[test]
    fn hashed_is_stable() {
        for n in 1..50 {
            let a = hashed("bucket", n);
            assert!(a < n);
            assert_eq!(a, hashed("bucket", n));
        }
    }

    #[test]
    fn comparators() {
        assert_eq!(natural(&1, &2), Ordering::Less);
        assert_eq!(natural("b", "a"), Ordering::Greater);
        let cmp = by_key(|pair: &(u8, &str)| pair.0);
        assert_eq!(cmp(&(3, "x"), &(3, "y")), Ordering::Equal);
        assert_eq!(cmp(&(2, "x"), &(3, "x")), Ordering::Less);
    }
}
