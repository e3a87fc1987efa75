//! Byte-shaping validation.
//!
//! Feeds blocks of uniformly random source bytes through an encoder's
//! `shape_bytes` and checks every call against the transform contract:
//!
//! ```text
//! produced <= dst.len()
//! consumed <= src.len()
//! produced > 0 || consumed > 0
//! ```
//!
//! The shaped output is tallied into a byte-value histogram so the run can
//! report how close the shaped stream looks to uniform.
//!
//! # Buffers
//!
//! The source block and the destination block are allocated once per run
//! and reused for every chunk.

use crate::entropy::{EntropySource, RefillPolicy};
use crate::error::{Error, Result, ShapingError};
use crate::harness::HarnessConfig;
use crate::shaper::{Direction, Encoder};
use crate::stats::{fmt_opt, ByteHistogram, ShapingReport};
use tracing::{debug, info, warn};

/// Totals from driving one source block through a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformTotals {
    /// Transform calls made
    pub calls: usize,

    /// Source bytes consumed
    pub consumed: usize,

    /// Output bytes produced
    pub produced: usize,
}

/// Drive `transform` over `src` until it is fully consumed.
///
/// Each call gets the whole of `dst` and the unconsumed tail of `src`.
/// Produced bytes are handed to `sink` before the next call overwrites
/// `dst`.
///
/// # Errors
/// `Error::Shaping` tagged with `direction` on the first call that makes
/// no progress or reports counts outside its buffers.
pub fn drive_transform<T, K>(
    direction: Direction,
    dst: &mut [u8],
    src: &[u8],
    mut transform: T,
    mut sink: K,
) -> Result<TransformTotals>
where
    T: FnMut(&mut [u8], &[u8]) -> (usize, usize),
    K: FnMut(&[u8]),
{
    let mut totals = TransformTotals::default();
    let mut tail = src;

    while !tail.is_empty() {
        let call = totals.calls;
        let (produced, consumed) = transform(dst, tail);
        totals.calls += 1;

        let violation = if produced == 0 && consumed == 0 {
            Some(ShapingError::NoProgress { call })
        } else if produced > dst.len() {
            Some(ShapingError::ProducedOverCapacity {
                call,
                produced,
                capacity: dst.len(),
            })
        } else if consumed > tail.len() {
            Some(ShapingError::ConsumedOverSource {
                call,
                consumed,
                remaining: tail.len(),
            })
        } else {
            None
        };
        if let Some(violation) = violation {
            return Err(Error::shaping(direction, violation));
        }

        sink(&dst[..produced]);
        totals.produced += produced;
        totals.consumed += consumed;
        tail = &tail[consumed..];
    }

    Ok(totals)
}

/// Shape `config.chunk_count` blocks of random bytes through `encoder`.
///
/// The first fill of the source block must succeed. Later refills follow
/// `config.refill_policy`.
///
/// # Errors
/// - `Error::Entropy` if the initial fill fails, or a refill fails under `RefillPolicy::FailFast`
/// - `Error::Shaping` on any contract violation by `encoder`
pub fn validate_shaping<E, S>(
    encoder: &mut E,
    entropy: &mut S,
    config: &HarnessConfig,
) -> Result<ShapingReport>
where
    E: Encoder,
    S: EntropySource,
{
    let mut source = vec![0u8; config.chunk_len];
    let mut shaped = vec![0u8; config.chunk_len];
    entropy.fill(&mut source)?;

    let mut histogram = ByteHistogram::new();
    let mut consumed: u64 = 0;
    let mut produced: u64 = 0;

    for chunk in 0..config.chunk_count {
        if let Err(e) = entropy.fill(&mut source) {
            match config.refill_policy {
                RefillPolicy::ReuseLast => {
                    debug!(chunk, error = %e, "entropy refill failed, reusing previous block");
                }
                RefillPolicy::FailFast => return Err(e.into()),
            }
        }

        let totals = drive_transform(
            Direction::Shape,
            &mut shaped,
            &source,
            |dst, src| encoder.shape_bytes(dst, src),
            |out| histogram.record(out),
        )?;

        consumed += totals.consumed as u64;
        produced += totals.produced as u64;
    }

    let report = ShapingReport {
        expected_source: config.expected_source_bytes(),
        source_consumed: consumed,
        shaped_produced: produced,
        histogram,
    };

    if !report.is_fully_consumed() {
        warn!(
            "somehow consumed {} != {} bytes",
            report.source_consumed, report.expected_source
        );
    }

    info!(
        "simulated average shaped/uniform expansion: {} ({} / {})",
        report
            .expansion_percent()
            .map_or_else(|| "n/a".to_string(), |p| format!("{:+.0}%", p)),
        report.shaped_produced,
        report.source_consumed,
    );
    info!(
        "shaped byte distribution -log: {}",
        report.self_information()
    );
    debug!(
        entropy_bits_per_byte = report.shannon_entropy(),
        ratio = %fmt_opt(report.expansion_ratio()),
        "shaped stream summary"
    );

    Ok(report)
}
