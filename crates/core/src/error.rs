//! Error types for the conformance harness.
//!
//! Every contract violation is reported as a structured error that ends the
//! run. Statistical noise (for example a byte-accounting discrepancy) is
//! logged instead and never shows up here.

use crate::shaper::{Direction, PacketSleep};
use thiserror::Error;

/// Top-level error type for all harness operations.
///
/// Each variant corresponds to a specific failure domain:
/// - Cadence: packet length or sleep outside the encoder contract
/// - Shaping: a shape/unshape call broke its progress or bounds contract
/// - Entropy: the randomness source could not supply bytes
/// - Round trip: decoded bytes differ from the original input
/// - Config: the harness was configured with unusable parameters
#[derive(Debug, Error)]
pub enum Error {
    /// Packet cadence contract violation
    #[error("cadence contract violation: {0}")]
    Cadence(#[from] CadenceError),

    /// Byte shaping contract violation
    #[error("{direction} contract violation: {source}")]
    Shaping {
        direction: Direction,
        #[source]
        source: ShapingError,
    },

    /// Randomness source failure
    #[error("entropy source error: {0}")]
    Entropy(#[from] EntropyError),

    /// Shape-then-unshape did not recover the input
    #[error("round trip error: {0}")]
    RoundTrip(#[from] RoundTripError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a shaping violation with the direction it happened in.
    pub fn shaping(direction: Direction, source: ShapingError) -> Self {
        Self::Shaping { direction, source }
    }
}

/// Packet cadence violations, each tagged with the offending trial.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CadenceError {
    /// Encoder asked to send an empty packet
    #[error("trial {trial}: encoder wanted to send a zero-length packet")]
    ZeroLengthPacket { trial: usize },

    /// Encoder asked to send more than its declared maximum
    #[error("trial {trial}: encoder wanted to send len {length} > {max}")]
    PacketTooLong { trial: usize, length: u16, max: u16 },

    /// Encoder asked to sleep a negative amount
    #[error("trial {trial}: encoder wanted to sleep negative amount ({sleep})")]
    NegativeSleep { trial: usize, sleep: PacketSleep },
}

/// Violations of the shape/unshape call contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapingError {
    /// Call neither produced nor consumed anything
    #[error("call {call}: no progress (produced 0, consumed 0)")]
    NoProgress { call: usize },

    /// More bytes reported produced than fit in the destination
    #[error("call {call}: produced {produced} > {capacity} bytes (over by {})", .produced - .capacity)]
    ProducedOverCapacity {
        call: usize,
        produced: usize,
        capacity: usize,
    },

    /// More bytes reported consumed than were offered
    #[error("call {call}: consumed {consumed} > {remaining} bytes (over by {})", .consumed - .remaining)]
    ConsumedOverSource {
        call: usize,
        consumed: usize,
        remaining: usize,
    },
}

/// Randomness source failures.
#[derive(Debug, Error)]
pub enum EntropyError {
    /// Operating system entropy unavailable
    #[error("cannot get random bytes: {0}")]
    Os(#[from] getrandom::Error),

    /// Generator-backed source failed
    #[error("cannot get random bytes: {0}")]
    Rng(#[from] rand::Error),

    /// Source refuses to supply more bytes
    #[error("entropy source exhausted")]
    Exhausted,
}

/// Round-trip verification failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoundTripError {
    /// Decoder recovered a different number of bytes
    #[error("decoded length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Decoder recovered different bytes
    #[error("decoded byte mismatch at offset {offset}: expected {expected:#04x}, got {actual:#04x}")]
    ByteMismatch {
        offset: usize,
        expected: u8,
        actual: u8,
    },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
