//! shaping-harness-core: Statistical conformance harness for packet shapers
//!
//! This library checks implementations of the two roles of a
//! traffic-analysis-resistant packet shaper:
//! - an `Encoder` that turns application bytes into a packet stream with
//!   controlled packet lengths and inter-packet delays
//! - a `Decoder` that reverses the byte transform
//!
//! It drives the encoder through randomized input, enforces its output
//! contract, and reports descriptive statistics (throughput, expansion
//! ratio, byte-value self-information).
//!
//! # Architecture
//!
//! - `shaper`: Encoder/Decoder capability traits
//! - `entropy`: Explicit randomness sources and refill policy
//! - `cadence`: Packet length and sleep validation
//! - `shaping`: Byte-shaping validation and the contract-checked transform driver
//! - `roundtrip`: Shape-then-unshape recovery check
//! - `stats`: Histograms, self-information and reports
//! - `harness`: Run configuration and public entry points
//! - `stub`: Deterministic reference shapers for test suites
//!
//! # Design Principles
//!
//! - **Fail fast**: The first contract violation ends the run with a structured error
//! - **Tolerate noise**: Statistical oddities are logged, never fatal
//! - **Deterministic**: Seeded entropy makes runs reproducible
//! - **Descriptive, not a proof**: The numbers are for human judgment, not a security certificate

pub mod cadence;
pub mod entropy;
pub mod error;
pub mod harness;
pub mod roundtrip;
pub mod shaper;
pub mod shaping;
pub mod stats;
pub mod stub;

// Re-export commonly used types
pub use entropy::{EntropySource, OsEntropy, RefillPolicy, SeededEntropy};
pub use error::{Error, Result};
pub use harness::{validate_expected_performance, validate_one_direction, HarnessConfig};
pub use shaper::{Decoder, Encoder, PacketSleep};
pub use stats::PerformanceReport;
