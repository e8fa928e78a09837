//! Error types for the `vechash` crate

/// Errors that could occur while constructing a container
///
/// Only construction is fallible. Index and bucket range violations on a
/// live container are caller bugs, and they panic instead.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The element type has no size.
    ///
    /// Every slot in a container must hold at least one byte.
    #[error("zero-sized element types can't be stored in a vechash container")]
    ZeroSizedElement,

    /// A [`crate::BucketMap`] was configured with zero buckets.
    #[error("a bucket map needs at least one bucket")]
    NoBuckets,

    /// A [`crate::BucketMap`] was built without a hash function.
    #[error("no hash function was provided for the bucket map")]
    MissingHasher,

    /// A [`crate::BucketMap`] was built without a comparison function.
    #[error("no comparison function was provided for the bucket map")]
    MissingComparator,
}
