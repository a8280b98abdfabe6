//! The process-wide PRG of §5, modelled as an injected handle instead
//! of a hidden global so tests can substitute a deterministic seed
//! (Design Notes §9) and reproduce identical `vec_X`/`vec_Y` across
//! both parties for the scenarios in §8.

use {
    rand_chacha::ChaCha20Rng,
    rand_core::{CryptoRng, RngCore, SeedableRng},
};

/// A seedable RNG handle. Wraps `ChaCha20Rng` rather than exposing it
/// directly so callers depend on this crate's API, not on
/// `rand_chacha`'s.
pub struct DeterministicRng(ChaCha20Rng);

impl DeterministicRng {
    /// A reproducible RNG from an explicit 32-byte seed, for tests that
    /// need both parties to generate matching sets.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(ChaCha20Rng::from_seed(seed))
    }

    /// A non-reproducible RNG seeded from the OS, for real runs.
    pub fn from_entropy() -> Self {
        Self(ChaCha20Rng::from_entropy())
    }
}

impl RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for DeterministicRng {}

#[cfg(test)]
mod test {
    use super::*;
    use rand_core::RngCore;

    #[test]
    fn same_seed_reproduces_same_stream() {
        let mut a = DeterministicRng::from_seed([7u8; 32]);
        let mut b = DeterministicRng::from_seed([7u8; 32]);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = DeterministicRng::from_seed([1u8; 32]);
        let mut b = DeterministicRng::from_seed([2u8; 32]);
        assert_ne!(a.next_u64(), b.next_u64());
    }
}
