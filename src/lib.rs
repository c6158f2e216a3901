//! Compact perfect-hash lookup tables for fixed, build-time key sets.
//!
//! The `perfmap` crate builds, from a key set that is fully known up front,
//! an immutable two-level lookup table that resolves every build-set key to
//! its original index with bounded worst-case work: one primary hash picks a
//! bucket, one secondary hash picks a slot inside it, and two table reads
//! finish the job. Collisions are resolved at build time by a bounded search
//! over per-bucket secondary table sizes and hash seeds, so a build either
//! produces a table with guaranteed O(1) lookups or fails with a classified
//! error — it can never hang.
//!
//! The table stores indices only, never keys. A probe that was not part of
//! the build set therefore resolves to an arbitrary in-range index rather
//! than a not-found signal; callers keep the original records and confirm a
//! hit by comparing keys after the lookup.
//!
//! ```
//! use perfmap::PerfMapBuilder;
//!
//! # fn main() -> perfmap::Result<()> {
//! let keys = ["US0378331005", "DE000BAY0017", "FR0000131104", "GB0002374006"];
//! let builder = PerfMapBuilder::default();
//! let table = builder.build(&keys[..])?;
//!
//! for (i, key) in keys.iter().enumerate() {
//!     assert_eq!(table.lookup(key.as_bytes(), builder.hasher()), i as u32);
//! }
//!
//! // Absent probes still land somewhere in range; compare before trusting.
//! let index = table.lookup(b"XS0000000000", builder.hasher());
//! assert!((index as usize) < keys.len());
//! # Ok(())
//! # }
//! ```

mod hasher;
pub use hasher::{FoldHasher, PerfMapHasher, SdbmHasher};

mod keys;
pub use keys::{FixedKeys, PerfMapKeys};

mod table;
pub use table::{PerfMap, PerfMapBucket, PerfMapInfo};

mod builder;
pub use builder::PerfMapBuilder;

mod errors;
pub use errors::{PerfMapError, Result};
