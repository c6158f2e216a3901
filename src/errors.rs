use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported by [`PerfMapBuilder::build`](crate::PerfMapBuilder::build).
///
/// All three conditions abort the build without leaving a usable table, and
/// none of them is retryable for the same key set and hash family: recovery
/// requires a different hash family or a different key set.
#[derive(Debug, Error)]
pub enum PerfMapError {
    /// A heap allocation failed while assembling the table or its scratch
    /// buffers. All partial allocations are dropped before this is returned.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// A primary bucket would hold more than 255 keys. This is a structural
    /// property of the key set and hash family combination.
    #[error("bucket {bucket} would hold more than 255 keys")]
    BucketOverflow {
        /// Index of the overflowing bucket.
        bucket: u32,
    },

    /// No `(size, seed)` pair within the bounded search space separates the
    /// members of a multi-key bucket.
    #[error("bucket {bucket}: no (size, seed) pair separates its {keys} keys")]
    UnresolvedCollision {
        /// Index of the unresolvable bucket.
        bucket: u32,
        /// Number of keys that collided into the bucket.
        keys: u8,
    },
}

pub type Result<T> = std::result::Result<T, PerfMapError>;
