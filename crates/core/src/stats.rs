//! Sample aggregates and reports for a validation run.
//!
//! This module turns the raw tallies of a run into the descriptive numbers
//! the harness logs:
//! - Simulated throughput from the packet cadence
//! - Expansion ratio of shaped output over consumed input
//! - Per-byte-value self-information of the shaped output
//!
//! # Reading the numbers
//!
//! None of this is a security verdict. A perfectly uniform byte stream
//! shows every self-information value near 8.0 and a Shannon entropy near
//! 8 bits/byte; large deviations are a hint for a human to look closer.

use crate::shaper::PacketSleep;
use std::fmt;

/// Number of distinct byte values.
pub const BYTE_VALUES: usize = 256;

/// Frequency histogram of byte values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteHistogram {
    counts: [u64; BYTE_VALUES],
    total: u64,
}

impl ByteHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self {
            counts: [0; BYTE_VALUES],
            total: 0,
        }
    }

    /// Tally every byte in `bytes`.
    pub fn record(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.counts[b as usize] += 1;
        }
        self.total += bytes.len() as u64;
    }

    /// Occurrences of `value`.
    pub fn count(&self, value: u8) -> u64 {
        self.counts[value as usize]
    }

    /// Total bytes tallied.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Raw counts indexed by byte value.
    pub fn counts(&self) -> &[u64; BYTE_VALUES] {
        &self.counts
    }

    /// `-log2(count / total)` for every byte value.
    ///
    /// Values that never appeared have no estimate.
    pub fn self_information(&self) -> SelfInformation {
        let mut values = [None; BYTE_VALUES];
        if self.total > 0 {
            let total = self.total as f64;
            for (slot, &count) in values.iter_mut().zip(self.counts.iter()) {
                if count > 0 {
                    *slot = Some(-(count as f64 / total).log2());
                }
            }
        }
        SelfInformation { values }
    }

    /// Shannon entropy in bits/byte. 0.0 for an empty histogram.
    pub fn shannon_entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let n = self.total as f64;
        let mut h = 0.0;
        for &c in &self.counts {
            if c > 0 {
                let p = c as f64 / n;
                h -= p * p.log2();
            }
        }
        h
    }
}

impl Default for ByteHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Self-information estimate per byte value.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfInformation {
    values: [Option<f64>; BYTE_VALUES],
}

impl SelfInformation {
    /// Estimate for `value`, or `None` if it never appeared.
    pub fn get(&self, value: u8) -> Option<f64> {
        self.values[value as usize]
    }

    /// All estimates indexed by byte value.
    pub fn values(&self) -> &[Option<f64>; BYTE_VALUES] {
        &self.values
    }

    /// Number of byte values with no estimate.
    pub fn missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// True if every byte value has an estimate within `tolerance` of `target`.
    pub fn all_within(&self, target: f64, tolerance: f64) -> bool {
        self.values
            .iter()
            .all(|v| matches!(v, Some(bits) if (bits - target).abs() <= tolerance))
    }
}

impl fmt::Display for SelfInformation {
    /// Space-separated, one decimal place, `*` for values never seen.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match value {
                Some(bits) => write!(f, "{:.1}", bits)?,
                None => f.write_str("*")?,
            }
        }
        Ok(())
    }
}

/// Totals from a cadence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceReport {
    /// Trials performed
    pub trials: usize,

    /// Sum of all packet lengths
    pub total_bytes: u64,

    /// Sum of all packet sleeps
    pub total_duration: PacketSleep,
}

impl CadenceReport {
    /// Total simulated time in seconds.
    pub fn total_seconds(&self) -> f64 {
        duration_secs(self.total_duration)
    }

    /// Simulated shaped throughput in bytes/second.
    ///
    /// `None` if no simulated time passed.
    pub fn bytes_per_second(&self) -> Option<f64> {
        let secs = self.total_seconds();
        if secs > 0.0 {
            Some(self.total_bytes as f64 / secs)
        } else {
            None
        }
    }

    /// Simulated shaped throughput in bits/second.
    pub fn bits_per_second(&self) -> Option<f64> {
        self.bytes_per_second().map(|bps| bps * 8.0)
    }

    /// Average simulated time per trial, in seconds.
    pub fn granularity_seconds(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.total_seconds() / self.trials as f64
        }
    }
}

/// Totals from a byte-shaping run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapingReport {
    /// Source bytes offered across all chunks
    pub expected_source: u64,

    /// Source bytes the encoder reported consumed
    pub source_consumed: u64,

    /// Shaped bytes the encoder reported produced
    pub shaped_produced: u64,

    /// Value histogram of the shaped bytes
    pub histogram: ByteHistogram,
}

impl ShapingReport {
    /// Whether every offered source byte was consumed.
    pub fn is_fully_consumed(&self) -> bool {
        self.source_consumed == self.expected_source
    }

    /// Shaped bytes per consumed byte. `None` if nothing was consumed.
    pub fn expansion_ratio(&self) -> Option<f64> {
        if self.source_consumed == 0 {
            None
        } else {
            Some(self.shaped_produced as f64 / self.source_consumed as f64)
        }
    }

    /// Overhead of shaping as a percentage (0% means no expansion).
    pub fn expansion_percent(&self) -> Option<f64> {
        self.expansion_ratio().map(|r| 100.0 * (r - 1.0))
    }

    /// Self-information vector of the shaped output.
    pub fn self_information(&self) -> SelfInformation {
        self.histogram.self_information()
    }

    /// Shannon entropy of the shaped output in bits/byte.
    pub fn shannon_entropy(&self) -> f64 {
        self.histogram.shannon_entropy()
    }
}

/// Combined result of a full expected-performance run.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub cadence: CadenceReport,
    pub shaping: ShapingReport,
}

impl PerformanceReport {
    /// Raw application throughput once shaping overhead is backed out, in bytes/second.
    pub fn uniform_bytes_per_second(&self) -> Option<f64> {
        let bps = self.cadence.bytes_per_second()?;
        match self.shaping.expansion_ratio() {
            Some(ratio) if ratio > 0.0 => Some(bps / ratio),
            _ => None,
        }
    }

    /// Raw application throughput in bits/second.
    pub fn uniform_bits_per_second(&self) -> Option<f64> {
        self.uniform_bytes_per_second().map(|bps| bps * 8.0)
    }

    /// Export as simple `key=value` lines (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "trials={}\n\
             total_bytes={}\n\
             total_seconds={:.6}\n\
             bytes_per_second={}\n\
             source_consumed={}\n\
             shaped_produced={}\n\
             expansion_ratio={}\n\
             uniform_bytes_per_second={}\n\
             shannon_entropy={:.4}\n\
             missing_byte_values={}\n",
            self.cadence.trials,
            self.cadence.total_bytes,
            self.cadence.total_seconds(),
            fmt_opt(self.cadence.bytes_per_second()),
            self.shaping.source_consumed,
            self.shaping.shaped_produced,
            fmt_opt(self.shaping.expansion_ratio()),
            fmt_opt(self.uniform_bytes_per_second()),
            self.shaping.shannon_entropy(),
            self.shaping.self_information().missing(),
        )
    }
}

/// Seconds in a signed duration, with nanosecond precision where it fits.
pub(crate) fn duration_secs(d: PacketSleep) -> f64 {
    match d.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => d.num_milliseconds() as f64 / 1e3,
    }
}

/// Scientific notation for a rate, `n/a` when absent.
pub(crate) fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2e}", v),
        None => "n/a".to_string(),
    }
}
