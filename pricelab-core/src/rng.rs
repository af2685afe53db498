//! Deterministic seed hierarchy.
//!
//! A master seed is expanded into per-key sub-seeds via BLAKE3 hashing. The
//! sub-seed for a key depends only on `(master, label, key)`, never on the
//! order in which keys are visited, so anything ordered by sub-seed is
//! independent of input order.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Sub-seed for `key` within the `label` namespace.
    pub fn sub_seed(&self, label: &str, key: &[u8]) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(label.as_bytes());
        // length prefix keeps ("ab", "c") and ("a", "bc") apart
        hasher.update(&(key.len() as u64).to_le_bytes());
        hasher.update(key);
        let hash = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(word)
    }

    /// Seeded StdRng for `key` within the `label` namespace.
    pub fn rng_for(&self, label: &str, key: &[u8]) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(label, key))
    }
}
