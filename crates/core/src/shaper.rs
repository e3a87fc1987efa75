//! Capability traits for the shaping roles under test.
//!
//! The harness never builds shaping logic itself. Callers hand it anything
//! that implements [`Encoder`] (and [`Decoder`] for two-directional runs),
//! whether that is constant-rate padding, Poisson-timed packetization or a
//! format-transforming cipher.

use std::fmt;

/// Delay before sending the next packet.
///
/// Signed so that an encoder reporting a negative delay can be caught
/// instead of being clamped away by the type.
pub type PacketSleep = chrono::Duration;

/// Outgoing side of a shaping transformer.
pub trait Encoder {
    /// Largest packet the encoder will ever ask to send.
    fn max_packet_length(&self) -> u16;

    /// Length of the next packet to send, in `1..=max_packet_length()`.
    fn next_packet_length(&mut self) -> u16;

    /// Delay to wait before sending the next packet. Never negative.
    fn next_packet_sleep(&mut self) -> PacketSleep;

    /// Shape bytes from `src` into `dst`.
    ///
    /// Returns `(produced, consumed)`: bytes written to the front of `dst`
    /// and bytes read from the front of `src`. At least one must be
    /// nonzero.
    fn shape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize);
}

/// Incoming side of a shaping transformer.
pub trait Decoder {
    /// Inverse of [`Encoder::shape_bytes`], with the same `(produced, consumed)` contract.
    fn unshape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize);
}

impl<E: Encoder + ?Sized> Encoder for &mut E {
    fn max_packet_length(&self) -> u16 {
        (**self).max_packet_length()
    }

    fn next_packet_length(&mut self) -> u16 {
        (**self).next_packet_length()
    }

    fn next_packet_sleep(&mut self) -> PacketSleep {
        (**self).next_packet_sleep()
    }

    fn shape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
        (**self).shape_bytes(dst, src)
    }
}

impl<D: Decoder + ?Sized> Decoder for &mut D {
    fn unshape_bytes(&mut self, dst: &mut [u8], src: &[u8]) -> (usize, usize) {
        (**self).unshape_bytes(dst, src)
    }
}

/// Which half of the transformer a byte transform call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Shape,
    Unshape,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Shape => f.write_str("shape"),
            Direction::Unshape => f.write_str("unshape"),
        }
    }
}
