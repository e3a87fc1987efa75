//! Packet cadence validation.
//!
//! Samples the packet lengths and inter-packet sleeps an encoder chooses and
//! checks each against the encoder contract:
//!
//! ```text
//! 0 < next_packet_length() <= max_packet_length()
//! next_packet_sleep() >= 0
//! ```
//!
//! Length and sleep are queried independently on every trial, so encoders
//! that vary both dynamically (to mimic a target traffic profile) are
//! measured as they behave, not as a fixed-rate approximation.

use crate::error::{CadenceError, Result};
use crate::shaper::{Encoder, PacketSleep};
use crate::stats::{fmt_opt, CadenceReport};
use tracing::{info, warn};

/// Run `trials` cadence trials against `encoder`.
///
/// The declared maximum is read once; it is a run-level constant. The
/// total duration saturates at `PacketSleep::max_value()`.
///
/// # Errors
/// - `CadenceError::ZeroLengthPacket` if a trial asks for an empty packet
/// - `CadenceError::PacketTooLong` if a trial exceeds the declared maximum
/// - `CadenceError::NegativeSleep` if a trial asks for a negative delay
pub fn validate_cadence<E: Encoder>(encoder: &mut E, trials: usize) -> Result<CadenceReport> {
    let max = encoder.max_packet_length();
    let mut total_bytes: u64 = 0;
    let mut total_duration = PacketSleep::zero();

    for trial in 0..trials {
        let length = encoder.next_packet_length();
        if length == 0 {
            return Err(CadenceError::ZeroLengthPacket { trial }.into());
        }
        if length > max {
            return Err(CadenceError::PacketTooLong { trial, length, max }.into());
        }

        let sleep = encoder.next_packet_sleep();
        if sleep < PacketSleep::zero() {
            return Err(CadenceError::NegativeSleep { trial, sleep }.into());
        }

        total_bytes += u64::from(length);
        total_duration = match total_duration.checked_add(&sleep) {
            Some(sum) => sum,
            None => {
                if total_duration != PacketSleep::max_value() {
                    warn!(trial, "total simulated duration overflowed, saturating");
                }
                PacketSleep::max_value()
            }
        };
    }

    let report = CadenceReport {
        trials,
        total_bytes,
        total_duration,
    };

    info!(
        "simulated average shaped transfer rate: {} B/s = {} b/s ({} B / {:.2} s; granularity {:.3} s)",
        fmt_opt(report.bytes_per_second()),
        fmt_opt(report.bits_per_second()),
        report.total_bytes,
        report.total_seconds(),
        report.granularity_seconds(),
    );

    Ok(report)
}
