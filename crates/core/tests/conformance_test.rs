//! Integration tests for the conformance harness.
//!
//! These drive whole runs through the public entry points with stub and
//! randomized encoders, and check both the contract enforcement and the
//! reported statistics.

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shaping_harness_core::{
    error::{CadenceError, EntropyError, ShapingError},
    shaper::Direction,
    stub::{FixedCadence, IdentityShaper, XorShaper},
    validate_expected_performance, validate_one_direction, Decoder, Encoder, EntropySource,
    Error, HarnessConfig, OsEntropy, PacketSleep, RefillPolicy, SeededEntropy,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Small run so tests stay fast.
fn quick_config() -> HarnessConfig {
    HarnessConfig::default()
        .with_packet_iterations(500)
        .with_chunk_len(1024)
        .with_chunk_count(3)
}

/// Encoder with randomized packet sizes and exponential inter-packet gaps,
/// padding every shaped byte with one random byte.
struct PoissonPadder {
    rng: ChaCha8Rng,
    max: u16,
    mean_gap_ms: f64,
}

impl PoissonPadder {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max: 1200,
            mean_gap_ms: 20.0,
        }
    }
}

impl Encoder for PoissonPadder {
    fn max_packet_length(&self) -> u16 {
        self.max
    }

    fn next_packet_length(&mut self) -> u16 {
        self.rng.gen_range(1..=self.max)
    }

    fn next_packet_sleep(&mut self) -> PacketSleep {
        let u: f64 = self.rng.gen();
        let gap_ms = -self.mean_gap_ms * (1.0 - u).ln();
        PacketSleep::microseconds((gap_ms * 1000.0) as i64)
    }

    fn shape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
        let n = (dst.len() / 2).min(src.len());
        for (i, &b) in src[..n].iter().enumerate() {
            dst[2 * i] = b;
            dst[2 * i + 1] = self.rng.gen();
        }
        (2 * n, n)
    }
}

/// Encoder that stalls after a number of successful shape calls.
struct Stalling {
    inner: IdentityShaper,
    good_calls: usize,
}

impl Encoder for Stalling {
    fn max_packet_length(&self) -> u16 {
        self.inner.max_packet_length()
    }

    fn next_packet_length(&mut self) -> u16 {
        self.inner.next_packet_length()
    }

    fn next_packet_sleep(&mut self) -> PacketSleep {
        self.inner.next_packet_sleep()
    }

    fn shape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
        if self.good_calls == 0 {
            return (0, 0);
        }
        self.good_calls -= 1;
        self.inner.shape_bytes(dst, src)
    }
}

/// Source that always fails.
struct NoEntropy;

impl EntropySource for NoEntropy {
    fn fill(&mut self, _buf: &mut [u8]) -> Result<(), EntropyError> {
        Err(EntropyError::Exhausted)
    }
}

#[test]
fn test_fixed_cadence_measurement_is_exact_and_repeatable() {
    init_tracing();
    let config = quick_config();
    let length = 1000;
    let sleep = PacketSleep::milliseconds(7);

    let mut first = None;
    for _ in 0..2 {
        let mut enc = FixedCadence::new(1500, length, sleep);
        let report =
            validate_expected_performance(&mut enc, &mut SeededEntropy::new(1), &config).unwrap();

        let n = config.packet_iterations as i32;
        assert_eq!(report.cadence.total_bytes, u64::from(length) * n as u64);
        assert_eq!(report.cadence.total_duration, sleep * n);

        if let Some(prev) = first.replace(report.cadence) {
            assert_eq!(prev, report.cadence);
        }
    }
}

#[test]
fn test_identity_entropy_vector_near_uniform() {
    init_tracing();
    let config = HarnessConfig::default().with_packet_iterations(100);
    let mut enc = IdentityShaper::new();

    let report =
        validate_expected_performance(&mut enc, &mut SeededEntropy::new(2024), &config).unwrap();

    let info = report.shaping.self_information();
    assert_eq!(info.missing(), 0);
    assert!(info.all_within(8.0, 1.0), "self-information: {}", info);
    assert!(report.shaping.shannon_entropy() > 7.9);
    assert_eq!(report.shaping.expansion_ratio(), Some(1.0));
}

#[test]
fn test_identity_with_os_entropy() {
    init_tracing();
    let mut enc = IdentityShaper::new();

    let report =
        validate_expected_performance(&mut enc, &mut OsEntropy, &quick_config()).unwrap();
    assert!(report.shaping.is_fully_consumed());
}

#[test]
fn test_poisson_padder_statistics() {
    init_tracing();
    let config = quick_config();
    let mut enc = PoissonPadder::new(77);

    let report =
        validate_expected_performance(&mut enc, &mut SeededEntropy::new(5), &config).unwrap();

    assert_eq!(report.shaping.expansion_ratio(), Some(2.0));
    assert_eq!(report.shaping.expansion_percent(), Some(100.0));

    let shaped = report.cadence.bytes_per_second().unwrap();
    let uniform = report.uniform_bytes_per_second().unwrap();
    assert!((shaped / uniform - 2.0).abs() < 1e-9);
}

#[test]
fn test_forward_progress_violation_fails_run() {
    init_tracing();
    let mut enc = Stalling {
        inner: IdentityShaper::with_max_per_call(100),
        good_calls: 4,
    };

    let err = validate_expected_performance(&mut enc, &mut SeededEntropy::new(1), &quick_config())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Shaping {
            direction: Direction::Shape,
            source: ShapingError::NoProgress { call: 4 }
        }
    ));
}

#[test]
fn test_zero_length_packet_fails_run() {
    let mut enc = FixedCadence::new(1500, 0, PacketSleep::milliseconds(1));

    let err = validate_expected_performance(&mut enc, &mut SeededEntropy::new(1), &quick_config())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Cadence(CadenceError::ZeroLengthPacket { trial: 0 })
    ));
}

#[test]
fn test_negative_sleep_fails_run() {
    let mut enc = FixedCadence::new(1500, 100, PacketSleep::milliseconds(-3));

    let err = validate_expected_performance(&mut enc, &mut SeededEntropy::new(1), &quick_config())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Cadence(CadenceError::NegativeSleep { trial: 0, .. })
    ));
}

#[test]
fn test_max_packet_length_boundary() {
    let config = quick_config();

    let mut at_max = FixedCadence::new(1500, 1500, PacketSleep::milliseconds(1));
    assert!(validate_expected_performance(&mut at_max, &mut SeededEntropy::new(1), &config).is_ok());

    let mut over_max = FixedCadence::new(1500, 1501, PacketSleep::milliseconds(1));
    let err = validate_expected_performance(&mut over_max, &mut SeededEntropy::new(1), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Cadence(CadenceError::PacketTooLong { .. })
    ));
}

#[test]
fn test_huge_sleeps_complete_without_panic() {
    let mut enc = FixedCadence::new(1500, 100, PacketSleep::max_value() / 2);
    let config = quick_config().with_packet_iterations(3);

    let report =
        validate_expected_performance(&mut enc, &mut SeededEntropy::new(1), &config).unwrap();
    assert_eq!(report.cadence.total_bytes, 300);
    assert_eq!(report.cadence.total_duration, PacketSleep::max_value());
}

#[test]
fn test_entropy_failure_before_shaping_is_fatal() {
    let mut enc = IdentityShaper::new();

    let err = validate_expected_performance(&mut enc, &mut NoEntropy, &quick_config())
        .unwrap_err();
    assert!(matches!(err, Error::Entropy(EntropyError::Exhausted)));
}

#[test]
fn test_invalid_config_rejected() {
    let mut enc = IdentityShaper::new();
    let config = quick_config().with_chunk_count(0);

    let err =
        validate_expected_performance(&mut enc, &mut SeededEntropy::new(1), &config).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_one_direction_round_trip() {
    init_tracing();
    let mut enc = XorShaper::new(0xa5);
    let mut dec = XorShaper::new(0xa5);

    let report = validate_one_direction(
        &mut enc,
        &mut dec,
        &mut SeededEntropy::new(11),
        &quick_config().with_refill_policy(RefillPolicy::FailFast),
    )
    .unwrap();

    assert!(report.shaping.is_fully_consumed());
}

#[test]
fn test_one_direction_detects_bad_decoder() {
    /// Decoder that zeroes everything.
    struct Zeroing;

    impl Decoder for Zeroing {
        fn unshape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
            let n = dst.len().min(src.len());
            dst[..n].fill(0);
            (n, n)
        }
    }

    let mut enc = IdentityShaper::new();
    let mut dec = Zeroing;

    let err = validate_one_direction(
        &mut enc,
        &mut dec,
        &mut SeededEntropy::new(11),
        &quick_config(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::RoundTrip(_)));
}

#[test]
fn test_one_direction_checks_unshape_contract() {
    /// Decoder that claims to have produced more than fits.
    struct Overflowing;

    impl Decoder for Overflowing {
        fn unshape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
            (dst.len() + 1, src.len())
        }
    }

    let mut enc = IdentityShaper::new();
    let mut dec = Overflowing;

    let err = validate_one_direction(
        &mut enc,
        &mut dec,
        &mut SeededEntropy::new(11),
        &quick_config(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Shaping {
            direction: Direction::Unshape,
            source: ShapingError::ProducedOverCapacity { .. }
        }
    ));
}

fn tiny_config() -> HarnessConfig {
    HarnessConfig::default()
        .with_packet_iterations(20)
        .with_chunk_len(64)
        .with_chunk_count(1)
}

proptest! {
    #[test]
    fn prop_in_range_cadence_accepted(
        (max, length) in (1u16..=u16::MAX).prop_flat_map(|max| (Just(max), 1..=max)),
        sleep_us in 0i64..1_000_000,
    ) {
        let mut enc = FixedCadence::new(max, length, PacketSleep::microseconds(sleep_us));
        let config = tiny_config();

        let report = validate_expected_performance(&mut enc, &mut SeededEntropy::new(0), &config).unwrap();
        prop_assert_eq!(report.cadence.total_bytes, u64::from(length) * 20);
        prop_assert_eq!(report.cadence.total_duration, PacketSleep::microseconds(sleep_us * 20));
    }

    #[test]
    fn prop_oversized_packet_rejected(
        (max, length) in (1u16..u16::MAX).prop_flat_map(|max| (Just(max), (max + 1)..=u16::MAX)),
    ) {
        let mut enc = FixedCadence::new(max, length, PacketSleep::milliseconds(1));

        let err = validate_expected_performance(&mut enc, &mut SeededEntropy::new(0), &tiny_config()).unwrap_err();
        prop_assert!(
            matches!(err, Error::Cadence(CadenceError::PacketTooLong { trial: 0, .. })),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn prop_negative_sleep_rejected(sleep_us in i64::MIN / 1_000..0) {
        let mut enc = FixedCadence::new(100, 10, PacketSleep::microseconds(sleep_us));

        let err = validate_expected_performance(&mut enc, &mut SeededEntropy::new(0), &tiny_config()).unwrap_err();
        prop_assert!(
            matches!(err, Error::Cadence(CadenceError::NegativeSleep { trial: 0, .. })),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn prop_partial_progress_accounts_every_byte(per_call in 1usize..=64, seed in any::<u64>()) {
        let mut enc = IdentityShaper::with_max_per_call(per_call);
        let config = tiny_config().with_chunk_count(3);

        let report = validate_expected_performance(&mut enc, &mut SeededEntropy::new(seed), &config).unwrap();
        prop_assert!(report.shaping.is_fully_consumed());
        prop_assert_eq!(report.shaping.shaped_produced, 192);
        prop_assert_eq!(report.shaping.histogram.total(), 192);
    }
}
