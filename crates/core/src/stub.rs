//! Deterministic reference shapers.
//!
//! These are not shaping algorithms. They are fixed, fully predictable
//! encoders and decoders for test suites that need a known-good baseline
//! (or a known-bad one, by tweaking the fields).

use crate::shaper::{Decoder, Encoder, PacketSleep};

/// Default declared maximum packet length for the stubs (a typical MTU).
pub const STUB_MAX_PACKET: u16 = 1500;

/// Fixed packet length and sleep, identity byte shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCadence {
    /// Declared maximum packet length
    pub max: u16,

    /// Length returned for every packet
    pub length: u16,

    /// Sleep returned before every packet
    pub sleep: PacketSleep,
}

impl FixedCadence {
    pub fn new(max: u16, length: u16, sleep: PacketSleep) -> Self {
        Self { max, length, sleep }
    }
}

impl Encoder for FixedCadence {
    fn max_packet_length(&self) -> u16 {
        self.max
    }

    fn next_packet_length(&mut self) -> u16 {
        self.length
    }

    fn next_packet_sleep(&mut self) -> PacketSleep {
        self.sleep
    }

    fn shape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
        map_bytes(dst, src, usize::MAX, |b| b)
    }
}

/// Copies input to output unchanged, in both directions.
///
/// Cadence is full-size packets every millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityShaper {
    max_per_call: usize,
}

impl IdentityShaper {
    pub fn new() -> Self {
        Self {
            max_per_call: usize::MAX,
        }
    }

    /// Move at most `max_per_call` bytes per call, to exercise partial progress.
    pub fn with_max_per_call(max_per_call: usize) -> Self {
        Self { max_per_call }
    }
}

impl Default for IdentityShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for IdentityShaper {
    fn max_packet_length(&self) -> u16 {
        STUB_MAX_PACKET
    }

    fn next_packet_length(&mut self) -> u16 {
        STUB_MAX_PACKET
    }

    fn next_packet_sleep(&mut self) -> PacketSleep {
        PacketSleep::milliseconds(1)
    }

    fn shape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
        map_bytes(dst, src, self.max_per_call, |b| b)
    }
}

impl Decoder for IdentityShaper {
    fn unshape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
        map_bytes(dst, src, self.max_per_call, |b| b)
    }
}

/// XORs every byte with a fixed key. Its own inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorShaper {
    key: u8,
}

impl XorShaper {
    pub fn new(key: u8) -> Self {
        Self { key }
    }
}

impl Encoder for XorShaper {
    fn max_packet_length(&self) -> u16 {
        STUB_MAX_PACKET
    }

    fn next_packet_length(&mut self) -> u16 {
        STUB_MAX_PACKET
    }

    fn next_packet_sleep(&mut self) -> PacketSleep {
        PacketSleep::milliseconds(1)
    }

    fn shape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
        let key = self.key;
        map_bytes(dst, src, usize::MAX, |b| b ^ key)
    }
}

impl Decoder for XorShaper {
    fn unshape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
        let key = self.key;
        map_bytes(dst, src, usize::MAX, |b| b ^ key)
    }
}

/// Map up to `cap` bytes from `src` into `dst` one-for-one.
fn map_bytes(dst: &mut [u8], src: &[u8], cap: usize, f: impl Fn(u8) -> u8) -> (usize, usize) {
    let n = dst.len().min(src.len()).min(cap);
    for (d, &s) in dst[..n].iter_mut().zip(&src[..n]) {
        *d = f(s);
    }
    (n, n)
}
