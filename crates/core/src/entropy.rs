//! Randomness sources for the uniform test input.
//!
//! The harness never reaches for process-wide randomness on its own. Every
//! entry point takes an [`EntropySource`], so a run can use the operating
//! system ([`OsEntropy`]) or be replayed bit-for-bit from a seed
//! ([`SeededEntropy`]).
//!
//! # Determinism
//!
//! `SeededEntropy` is backed by a ChaCha8 generator. Given the same seed the
//! byte stream is identical across runs and platforms.

use crate::error::EntropyError;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Supplier of raw random bytes.
pub trait EntropySource {
    /// Fill `buf` entirely with random bytes.
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError>;
}

impl<S: EntropySource + ?Sized> EntropySource for &mut S {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError> {
        (**self).fill(buf)
    }
}

/// Operating system entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::getrandom(buf)?;
        Ok(())
    }
}

/// Reproducible entropy from a 64-bit seed.
#[derive(Debug, Clone)]
pub struct SeededEntropy {
    rng: ChaCha8Rng,
}

impl SeededEntropy {
    /// Create a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError> {
        self.rng.try_fill_bytes(buf)?;
        Ok(())
    }
}

/// What to do when refilling the uniform source block fails mid-run.
///
/// Reusing the previous block is fine for a rough statistical test as long
/// as chunks are long enough, but it is not acceptable when the shaped
/// output will be judged for anything security-sensitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefillPolicy {
    /// Keep the previous block and carry on
    #[default]
    ReuseLast,

    /// Abort the run with the entropy error
    FailFast,
}
