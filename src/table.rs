use serde::Serialize;

use crate::PerfMapHasher;

/// One primary-hash bucket record.
///
/// `size == 0` is a sentinel covering both empty and single-key buckets: a
/// singleton occupies one index-table slot at `offset` and needs no
/// secondary hash, an empty bucket owns no slots at all. Multi-key buckets
/// carry the secondary table size and the seed the builder settled on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PerfMapBucket {
    /// Start position of this bucket's slots in the index table.
    pub offset: u32,
    /// Secondary hash table size, or `0` for the empty/singleton sentinel.
    pub size: u8,
    /// Secondary hash seed; `0` reuses the primary hash's low byte.
    pub param: u8,
}

/// Maps a 32-bit primary hash onto a bucket by fixed-point scaling, which
/// draws on the hash's high bits rather than a modulus.
#[inline]
pub(crate) fn bucket_of(hash: u32, bucket_count: usize) -> usize {
    ((u64::from(hash) * bucket_count as u64) >> 32) as usize
}

/// Maps a secondary hash onto a slot within a bucket of `size` slots using
/// the same byte-scaling scheme, `0` for the sentinel classes.
#[inline]
pub(crate) fn slot_of(hash: u32, size: u8) -> usize {
    if size > 0 {
        usize::from((u16::from(hash as u8) * u16::from(size)) >> 8)
    } else {
        0
    }
}

/// Immutable two-level perfect-hash lookup table.
///
/// Built once by [`PerfMapBuilder`](crate::PerfMapBuilder) from a fixed key
/// set, then resolves any build-set key to its original index in constant
/// time. The table owns exactly two heap arrays (bucket table and index
/// table) and is not `Clone`: moves transfer ownership, and dropping it
/// releases both arrays. Lookups take `&self` and touch no mutable state,
/// so a built table can be shared across threads freely.
#[derive(Debug, Default)]
pub struct PerfMap {
    buckets: Vec<PerfMapBucket>,
    index: Vec<u32>,
    info: PerfMapInfo,
}

impl PerfMap {
    pub(crate) fn from_parts(
        buckets: Vec<PerfMapBucket>,
        index: Vec<u32>,
        info: PerfMapInfo,
    ) -> Self {
        Self {
            buckets,
            index,
            info,
        }
    }

    /// Resolves `probe` to an index into the original key set.
    ///
    /// For a key that was part of the build set this is its original index.
    /// For any other probe the result is an arbitrary in-range index, not an
    /// error: the table stores no keys, so the caller must compare the
    /// returned record's key against `probe` to confirm a match.
    ///
    /// Every lookup performs exactly one primary and one secondary hash
    /// evaluation and one read from each table. The secondary hash is
    /// evaluated even when the bucket's `param` is `0` (where the result is
    /// already known to equal the primary hash) so that lookup latency does
    /// not vary between singleton and multi-key buckets.
    ///
    /// # Panics
    ///
    /// Panics if the table was built from an empty key set; such a table has
    /// no in-range index to return and querying it is outside the lookup
    /// contract.
    pub fn lookup<H: PerfMapHasher>(&self, probe: &[u8], hasher: &H) -> u32 {
        let primary = hasher.hash(probe, 0);
        let bucket = self.buckets[bucket_of(primary, self.buckets.len())];
        let secondary = hasher.hash(probe, u32::from(bucket.param));
        self.index[bucket.offset as usize + slot_of(secondary, bucket.size)]
    }

    /// Number of primary buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of slots in the index table.
    pub fn slot_count(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` for a table built from an empty key set.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The bucket table.
    pub fn buckets(&self) -> &[PerfMapBucket] {
        &self.buckets
    }

    /// The flattened index table.
    pub fn index(&self) -> &[u32] {
        &self.index
    }

    /// Layout summary recorded at build time.
    pub fn info(&self) -> &PerfMapInfo {
        &self.info
    }
}

/// Summary of a built table's shape, suitable for JSON output.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PerfMapInfo {
    /// Number of keys the table was built from.
    pub key_count: u32,
    /// Number of primary buckets (`key_count / 2`).
    pub bucket_count: u32,
    /// Total index-table slots, including secondary-table padding.
    pub slot_count: u32,
    /// Buckets no key mapped to.
    pub empty_buckets: u32,
    /// Buckets resolved by the single-slot sentinel.
    pub singleton_buckets: u32,
    /// Buckets that required a secondary-hash search.
    pub multi_key_buckets: u32,
    /// In-memory footprint of the two arrays in bytes.
    pub table_bytes: u64,
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::*;

    fn sample_keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{i:012}")).collect()
    }

    /// Wraps a family and counts evaluations; lookups must cost exactly two.
    struct CountingHasher {
        inner: FoldHasher,
        calls: Cell<u64>,
    }

    impl PerfMapHasher for CountingHasher {
        fn hash(&self, key: &[u8], seed: u32) -> u32 {
            self.calls.set(self.calls.get() + 1);
            self.inner.hash(key, seed)
        }
    }

    #[test]
    fn test_round_trip() {
        let keys = sample_keys(5000);
        let builder = PerfMapBuilder::default();
        let table = builder.build(&keys[..]).unwrap();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(table.lookup(key.as_bytes(), builder.hasher()), i as u32);
        }
    }

    #[test]
    fn test_absent_probe_stays_in_range() {
        let keys = sample_keys(1000);
        let builder = PerfMapBuilder::default();
        let table = builder.build(&keys[..]).unwrap();
        for i in 0..1000u64 {
            let probe = format!("{:012}", 1_000_000 + i);
            let index = table.lookup(probe.as_bytes(), builder.hasher());
            assert!((index as usize) < keys.len());
            // The caller-side membership test: compare before trusting.
            assert_ne!(keys[index as usize], probe);
        }
    }

    #[test]
    fn test_lookup_costs_two_hash_evaluations() {
        let keys = sample_keys(400);
        let hasher = CountingHasher {
            inner: FoldHasher::new(),
            calls: Cell::new(0),
        };
        let builder = PerfMapBuilder::with_hasher(hasher);
        let table = builder.build(&keys[..]).unwrap();

        let singleton = table.buckets().iter().any(|b| b.size == 0);
        let multi = table.buckets().iter().any(|b| b.size > 0);
        assert!(singleton && multi, "want both bucket classes covered");

        for key in &keys {
            let before = builder.hasher().calls.get();
            table.lookup(key.as_bytes(), builder.hasher());
            assert_eq!(builder.hasher().calls.get() - before, 2);
        }
    }

    #[test]
    fn test_concurrent_lookups() {
        let keys = sample_keys(2000);
        let builder = PerfMapBuilder::default();
        let table = builder.build(&keys[..]).unwrap();

        std::thread::scope(|scope| {
            for worker in 0..4usize {
                let table = &table;
                let keys = &keys;
                let hasher = builder.hasher();
                scope.spawn(move || {
                    for (i, key) in keys.iter().enumerate().skip(worker).step_by(4) {
                        assert_eq!(table.lookup(key.as_bytes(), hasher), i as u32);
                    }
                });
            }
        });
    }

    #[test]
    fn test_move_transfers_ownership() {
        let keys = sample_keys(100);
        let builder = PerfMapBuilder::default();
        let table = builder.build(&keys[..]).unwrap();
        let moved = Box::new(table);
        assert_eq!(moved.lookup(keys[7].as_bytes(), builder.hasher()), 7);
    }

    #[test]
    fn test_info_accounting() {
        let keys = sample_keys(3000);
        let builder = PerfMapBuilder::default();
        let table = builder.build(&keys[..]).unwrap();
        let info = table.info();

        assert_eq!(info.key_count, 3000);
        assert_eq!(info.bucket_count as usize, table.bucket_count());
        assert_eq!(info.slot_count as usize, table.slot_count());
        assert_eq!(
            info.empty_buckets + info.singleton_buckets + info.multi_key_buckets,
            info.bucket_count
        );
        let padded: u32 = table
            .buckets()
            .iter()
            .map(|b| u32::from(b.size))
            .sum::<u32>()
            + info.singleton_buckets;
        assert_eq!(padded, info.slot_count);
    }

    #[test]
    fn test_family_substitution() {
        // sdbm weighs leading bytes heaviest, so vary those: reversed digits.
        let keys: Vec<String> = (0..2000)
            .map(|i| format!("{i:012}").chars().rev().collect())
            .collect();
        let builder = PerfMapBuilder::with_hasher(SdbmHasher);
        let table = builder.build(&keys[..]).unwrap();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(table.lookup(key.as_bytes(), &SdbmHasher), i as u32);
        }
    }
}
