use crate::errors::{PerfMapError, Result};
use crate::hasher::{FoldHasher, PerfMapHasher};
use crate::keys::PerfMapKeys;
use crate::table::{bucket_of, slot_of, PerfMap, PerfMapBucket, PerfMapInfo};

/// Largest secondary table a bucket may grow to, and therefore also the
/// occupancy cap of a primary bucket. Part of the format: `size` is a byte.
const SECONDARY_SIZE_MAX: u16 = 255;

/// Secondary seeds tried per candidate size before growing the table.
const SEED_ATTEMPTS: u32 = 24;

/// Builder producing [`PerfMap`] tables from a fixed key set.
///
/// The builder owns the hash family instance used for primary placement and
/// the secondary-hash search; the same instance (or an equal one) must later
/// be passed to [`PerfMap::lookup`]. The family type parameter `H` allows
/// swapping in custom [`PerfMapHasher`] implementations; a `&H` is itself a
/// hasher, so a borrowed family can be shared between builder and callers.
///
/// Construction runs in two passes: the first sizes every bucket and settles
/// its `(size, param)` resolution, the second fills the index table by
/// re-deriving every key's position with the lookup arithmetic itself, which
/// pins builder and lookup to the same addressing.
#[derive(Debug)]
pub struct PerfMapBuilder<H: PerfMapHasher = FoldHasher> {
    hasher: H,
}

impl<H: PerfMapHasher + Default> Default for PerfMapBuilder<H> {
    fn default() -> Self {
        Self {
            hasher: H::default(),
        }
    }
}

impl PerfMapBuilder {
    /// Creates a new builder with the default hash family.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        <Self as Default>::default()
    }
}

impl<H: PerfMapHasher> PerfMapBuilder<H> {
    /// Creates a builder over a caller-supplied hash family.
    pub fn with_hasher(hasher: H) -> Self {
        Self { hasher }
    }

    /// The hash family this builder places keys with. Lookups against the
    /// built table must use the same family.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Builds a perfect-hash table over `keys`.
    ///
    /// Every key in the set resolves to its index afterwards; see
    /// [`PerfMap::lookup`] for the probe-side contract. The key set must not
    /// be mutated while the build runs.
    ///
    /// # Errors
    ///
    /// Fails with [`PerfMapError::BucketOverflow`] when more than 255 keys
    /// share a primary bucket, with [`PerfMapError::UnresolvedCollision`]
    /// when the bounded `(size, seed)` search cannot separate a bucket's
    /// members, and with [`PerfMapError::Allocation`] when the heap gives
    /// out. No partially built table survives any failure.
    ///
    /// # Panics
    ///
    /// Panics if the key set holds more than `u32::MAX` keys; the index
    /// table stores 32-bit indices.
    ///
    /// # Examples
    ///
    /// ```
    /// use perfmap::PerfMapBuilder;
    ///
    /// # fn main() -> perfmap::Result<()> {
    /// let keys = ["apple", "banana", "cherry", "date"];
    /// let builder = PerfMapBuilder::default();
    /// let table = builder.build(&keys[..])?;
    /// assert_eq!(table.lookup(b"cherry", builder.hasher()), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn build<K: PerfMapKeys + ?Sized>(&self, keys: &K) -> Result<PerfMap> {
        let n = keys.len();
        assert!(n <= u32::MAX as usize, "key set exceeds u32 index range");
        if n == 0 {
            return Ok(PerfMap::default());
        }
        // The literal n/2 would size a one-key set at zero buckets.
        let bucket_count = if n == 1 { 1 } else { n / 2 };

        // First pass, step one: tally bucket occupancy under the primary hash.
        let mut counts: Vec<u8> = zeroed(bucket_count)?;
        for i in 0..n {
            let bucket = bucket_of(self.hasher.hash(keys.key(i), 0), bucket_count);
            if counts[bucket] == SECONDARY_SIZE_MAX as u8 {
                return Err(PerfMapError::BucketOverflow {
                    bucket: bucket as u32,
                });
            }
            counts[bucket] += 1;
        }

        // Step two: group (key index, primary hash) pairs per bucket.
        let mut groups: Vec<Vec<(u32, u32)>> = zeroed(bucket_count)?;
        for (bucket, &count) in counts.iter().enumerate() {
            if count > 0 {
                groups[bucket].try_reserve_exact(usize::from(count))?;
            }
        }
        for i in 0..n {
            let hash = self.hasher.hash(keys.key(i), 0);
            groups[bucket_of(hash, bucket_count)].push((i as u32, hash));
        }

        // Step three: resolve every bucket, appending slot ranges contiguously.
        let mut buckets: Vec<PerfMapBucket> = zeroed(bucket_count)?;
        let mut cursor: u32 = 0;
        for (i, group) in groups.iter().enumerate() {
            match group.len() {
                0 => {}
                1 => {
                    buckets[i].offset = cursor;
                    cursor += 1;
                }
                k => {
                    let (size, param) =
                        self.resolve_bucket(keys, group)
                            .ok_or(PerfMapError::UnresolvedCollision {
                                bucket: i as u32,
                                keys: k as u8,
                            })?;
                    buckets[i] = PerfMapBucket {
                        offset: cursor,
                        size,
                        param,
                    };
                    cursor += u32::from(size);
                }
            }
        }

        // Second pass: place every key by the lookup arithmetic itself.
        let mut index: Vec<u32> = zeroed(cursor as usize)?;
        for i in 0..n {
            let key = keys.key(i);
            let bucket = buckets[bucket_of(self.hasher.hash(key, 0), bucket_count)];
            let secondary = self.hasher.hash(key, u32::from(bucket.param));
            index[bucket.offset as usize + slot_of(secondary, bucket.size)] = i as u32;
        }

        let empty_buckets = counts.iter().filter(|&&c| c == 0).count() as u32;
        let singleton_buckets = counts.iter().filter(|&&c| c == 1).count() as u32;
        let info = PerfMapInfo {
            key_count: n as u32,
            bucket_count: bucket_count as u32,
            slot_count: cursor,
            empty_buckets,
            singleton_buckets,
            multi_key_buckets: bucket_count as u32 - empty_buckets - singleton_buckets,
            table_bytes: (buckets.len() * std::mem::size_of::<PerfMapBucket>()
                + index.len() * std::mem::size_of::<u32>()) as u64,
        };
        Ok(PerfMap::from_parts(buckets, index, info))
    }

    /// Searches for the first `(size, seed)` pair that maps the group's keys
    /// to pairwise-distinct slots.
    ///
    /// Sizes are tried in increasing order starting at the group's key count
    /// and seeds in increasing order within each size, so the first hit is
    /// the smallest workable secondary table. Seed `0` reuses each key's
    /// primary hash instead of evaluating a fresh one, matching what lookup
    /// computes for `param == 0`.
    fn resolve_bucket<K: PerfMapKeys + ?Sized>(
        &self,
        keys: &K,
        group: &[(u32, u32)],
    ) -> Option<(u8, u8)> {
        for size in group.len() as u16..=SECONDARY_SIZE_MAX {
            for seed in 0..SEED_ATTEMPTS {
                let mut taken = [false; 256];
                let mut distinct = true;
                for &(key_index, primary) in group {
                    let hash = if seed == 0 {
                        primary
                    } else {
                        self.hasher.hash(keys.key(key_index as usize), seed)
                    };
                    let slot = slot_of(hash, size as u8);
                    if taken[slot] {
                        distinct = false;
                        break;
                    }
                    taken[slot] = true;
                }
                if distinct {
                    return Some((size as u8, seed as u8));
                }
            }
        }
        None
    }
}

/// Fallibly allocates a zero-initialized scratch or table vector.
fn zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, T::default());
    Ok(v)
}
