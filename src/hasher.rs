use std::hash::BuildHasher;

use foldhash::fast::FixedState;

/// Seed-parameterized hash family used for both building and probing.
///
/// `hash` must be deterministic for a fixed `(key, seed)` pair. Seed `0` is
/// the primary hash that places a key into its bucket; small positive seeds
/// are tried during the builder's secondary-hash search, so distinct seeds
/// must materially reshape the output rather than merely shifting it.
///
/// Implementations are interchangeable, but a table can only be probed with
/// the same family instance it was built with.
pub trait PerfMapHasher {
    /// Hashes `key` under `seed` into a 32-bit value.
    fn hash(&self, key: &[u8], seed: u32) -> u32;
}

impl<H: PerfMapHasher + ?Sized> PerfMapHasher for &H {
    fn hash(&self, key: &[u8], seed: u32) -> u32 {
        (**self).hash(key, seed)
    }
}

/// Default hash family backed by [`foldhash`].
///
/// The state seed mixes a caller-chosen 64-bit base seed with the 32-bit
/// search seed, so every search seed selects an unrelated member of the
/// family. Two tables built with different base seeds place keys into
/// entirely different buckets.
#[derive(Debug, Default, Clone, Copy)]
pub struct FoldHasher {
    seed: u64,
}

impl FoldHasher {
    /// Creates the family with base seed `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the family with a caller-chosen base seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl PerfMapHasher for FoldHasher {
    fn hash(&self, key: &[u8], seed: u32) -> u32 {
        let spread = u64::from(seed).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        FixedState::with_seed(self.seed ^ spread).hash_one(key) as u32
    }
}

/// The sdbm multiplicative family, parameterized by perturbing its `65599`
/// multiplier with the seed.
///
/// Weaker than [`FoldHasher`] but fully portable and cheap; it is the family
/// the table layout was originally tuned against and doubles as a stable
/// reference in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdbmHasher;

impl PerfMapHasher for SdbmHasher {
    fn hash(&self, key: &[u8], seed: u32) -> u32 {
        let k = 65599u32.wrapping_add(seed);
        let mut hash = 0u32;
        for &byte in key {
            hash = hash.wrapping_mul(k).wrapping_add(u32::from(byte));
        }
        hash
    }
}
