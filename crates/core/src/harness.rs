//! Public entry points and run configuration.
//!
//! [`validate_expected_performance`] measures a single encoder: packet
//! cadence first, then byte shaping over uniform random input.
//! [`validate_one_direction`] does the same and then checks that the
//! paired decoder recovers shaped bytes exactly.
//!
//! Both return on the first contract violation. Test suites can simply
//! propagate the error with `?` or unwrap it to fail the test.

use crate::cadence::validate_cadence;
use crate::entropy::{EntropySource, RefillPolicy};
use crate::error::{Error, Result};
use crate::roundtrip::verify_round_trip;
use crate::shaper::{Decoder, Encoder};
use crate::shaping::validate_shaping;
use crate::stats::{fmt_opt, PerformanceReport};
use tracing::{info, info_span};

/// Cadence trials per run.
pub const PACKET_ITERATIONS: usize = 10_000;

/// Length of each uniform source block.
pub const UNIFORM_CHUNK_LEN: usize = 4096;

/// Uniform source blocks per run.
pub const UNIFORM_CHUNK_COUNT: usize = 10;

/// Parameters for a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Cadence trials
    pub packet_iterations: usize,

    /// Bytes per uniform source block (also the destination capacity)
    pub chunk_len: usize,

    /// Number of source blocks shaped
    pub chunk_count: usize,

    /// Behavior when refilling a source block fails
    pub refill_policy: RefillPolicy,
}

impl HarnessConfig {
    /// Set the number of cadence trials.
    pub fn with_packet_iterations(mut self, packet_iterations: usize) -> Self {
        self.packet_iterations = packet_iterations;
        self
    }

    /// Set the uniform source block length.
    pub fn with_chunk_len(mut self, chunk_len: usize) -> Self {
        self.chunk_len = chunk_len;
        self
    }

    /// Set the number of source blocks shaped.
    pub fn with_chunk_count(mut self, chunk_count: usize) -> Self {
        self.chunk_count = chunk_count;
        self
    }

    /// Set the behavior on a failed source refill.
    pub fn with_refill_policy(mut self, refill_policy: RefillPolicy) -> Self {
        self.refill_policy = refill_policy;
        self
    }

    /// Total source bytes a run offers the encoder.
    pub fn expected_source_bytes(&self) -> u64 {
        self.chunk_len as u64 * self.chunk_count as u64
    }

    /// Reject parameters that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.packet_iterations == 0 {
            return Err(Error::Config("packet_iterations must be > 0".to_string()));
        }
        if self.chunk_len == 0 {
            return Err(Error::Config("chunk_len must be > 0".to_string()));
        }
        if self.chunk_count == 0 {
            return Err(Error::Config("chunk_count must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            packet_iterations: PACKET_ITERATIONS,
            chunk_len: UNIFORM_CHUNK_LEN,
            chunk_count: UNIFORM_CHUNK_COUNT,
            refill_policy: RefillPolicy::default(),
        }
    }
}

/// Measure an encoder's cadence and byte shaping.
///
/// Logs throughput, expansion and the shaped byte distribution, and
/// returns the same numbers as a [`PerformanceReport`].
pub fn validate_expected_performance<E, S>(
    encoder: &mut E,
    entropy: &mut S,
    config: &HarnessConfig,
) -> Result<PerformanceReport>
where
    E: Encoder,
    S: EntropySource,
{
    config.validate()?;
    let _span = info_span!("expected_performance").entered();

    let cadence = validate_cadence(encoder, config.packet_iterations)?;
    let shaping = validate_shaping(encoder, entropy, config)?;
    let report = PerformanceReport { cadence, shaping };

    info!(
        "expected uniform transfer rate: {} B/s = {} b/s",
        fmt_opt(report.uniform_bytes_per_second()),
        fmt_opt(report.uniform_bits_per_second()),
    );

    Ok(report)
}

/// Measure an encoder, then check the decoder inverts it.
pub fn validate_one_direction<E, D, S>(
    encoder: &mut E,
    decoder: &mut D,
    entropy: &mut S,
    config: &HarnessConfig,
) -> Result<PerformanceReport>
where
    E: Encoder,
    D: Decoder,
    S: EntropySource,
{
    let report = validate_expected_performance(encoder, entropy, config)?;

    let _span = info_span!("one_direction").entered();
    verify_round_trip(encoder, decoder, entropy, config.chunk_len)?;

    Ok(report)
}
