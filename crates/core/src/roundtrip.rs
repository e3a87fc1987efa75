//! Shape-then-unshape recovery check.
//!
//! A random block is shaped by the encoder, the shaped stream is unshaped
//! by the decoder, and the result must equal the original byte for byte.
//! Both directions are held to the same call contract as byte-shaping
//! validation.

use crate::entropy::EntropySource;
use crate::error::{Result, RoundTripError};
use crate::shaper::{Decoder, Direction, Encoder};
use crate::shaping::drive_transform;
use tracing::info;

/// Sizes observed during a successful round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTripReport {
    /// Original block length
    pub original_len: usize,

    /// Shaped stream length
    pub shaped_len: usize,

    /// `shape_bytes` calls made
    pub shape_calls: usize,

    /// `unshape_bytes` calls made
    pub unshape_calls: usize,
}

/// Verify that `decoder` recovers `len` random bytes shaped by `encoder`.
///
/// # Errors
/// - `Error::Entropy` if the random block cannot be drawn
/// - `Error::Shaping` on a contract violation in either direction
/// - `Error::RoundTrip` if the recovered bytes differ from the original
pub fn verify_round_trip<E, D, S>(
    encoder: &mut E,
    decoder: &mut D,
    entropy: &mut S,
    len: usize,
) -> Result<RoundTripReport>
where
    E: Encoder,
    D: Decoder,
    S: EntropySource,
{
    let mut original = vec![0u8; len];
    entropy.fill(&mut original)?;

    let mut scratch = vec![0u8; len.max(1)];

    let mut shaped = Vec::with_capacity(len);
    let shape = drive_transform(
        Direction::Shape,
        &mut scratch,
        &original,
        |dst, src| encoder.shape_bytes(dst, src),
        |out| shaped.extend_from_slice(out),
    )?;

    let mut decoded = Vec::with_capacity(len);
    let unshape = drive_transform(
        Direction::Unshape,
        &mut scratch,
        &shaped,
        |dst, src| decoder.unshape_bytes(dst, src),
        |out| decoded.extend_from_slice(out),
    )?;

    if let Some(offset) = original
        .iter()
        .zip(decoded.iter())
        .position(|(a, b)| a != b)
    {
        return Err(RoundTripError::ByteMismatch {
            offset,
            expected: original[offset],
            actual: decoded[offset],
        }
        .into());
    }
    if decoded.len() != original.len() {
        return Err(RoundTripError::LengthMismatch {
            expected: original.len(),
            actual: decoded.len(),
        }
        .into());
    }

    let report = RoundTripReport {
        original_len: len,
        shaped_len: shaped.len(),
        shape_calls: shape.calls,
        unshape_calls: unshape.calls,
    };
    info!(
        "round trip recovered {} B from {} shaped B ({} shape / {} unshape calls)",
        report.original_len, report.shaped_len, report.shape_calls, report.unshape_calls
    );

    Ok(report)
}
