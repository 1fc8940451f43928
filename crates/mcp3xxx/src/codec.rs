//! Bit-level request/response codec.
//!
//! A request is laid out MSB-first as
//!
//! ```text
//! | start | mode | channel select | sample | null | reading placeholder | pad |
//! |   1   |  1   | channel_width  |   1    |  1   |   resolution_bits   | 0-7 |
//! ```
//!
//! The chip drives the reading on the clock edges occupied by the
//! placeholder, so the response has the same length as the request.

use core::ops::{Deref, DerefMut};

use crate::error::CodecError;
use crate::profile::{ChipProfile, FIXED_HEADER_BITS, MAX_RESOLUTION_BITS};
use crate::Mode;

/// Longest frame any [`ChipProfile`] can produce, in bytes.
pub const MAX_FRAME_LEN: usize =
    (FIXED_HEADER_BITS + u8::BITS + MAX_RESOLUTION_BITS as u32).div_ceil(8) as usize;

/// Byte-aligned transfer buffer exchanged with the SPI device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl DerefMut for Frame {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

/// MSB-first bit accumulator used while building a request.
///
/// Holds at most [`BitSequence::CAPACITY`] bits. Only [`encode`] builds one,
/// and a [`ChipProfile`] never describes a longer frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BitSequence {
    bits: u64,
    len: u32,
}

impl BitSequence {
    pub(crate) const CAPACITY: u32 = MAX_FRAME_LEN as u32 * 8;

    pub(crate) const fn new() -> Self {
        Self { bits: 0, len: 0 }
    }

    /// Appends the low `width` bits of `value`.
    pub(crate) fn push(&mut self, value: u64, width: u32) -> &mut Self {
        debug_assert!(self.len + width <= Self::CAPACITY, "bit sequence overflow");

        if width == 0 {
            return self;
        }

        let mask = u64::MAX >> (u64::BITS - width);

        self.bits = (self.bits << width) | (value & mask);
        self.len += width;

        self
    }

    /// Zero bits needed to reach the next byte boundary.
    pub(crate) const fn padding(&self) -> u32 {
        (8 - self.len % 8) % 8
    }

    /// Right-pads with zeros up to a byte boundary. Aligned sequences are
    /// left untouched.
    pub(crate) fn pad_to_byte(&mut self) -> &mut Self {
        let padding = self.padding();
        self.push(0, padding)
    }

    /// Pads and splits into bytes, most significant byte first.
    pub(crate) fn to_frame(mut self) -> Frame {
        self.pad_to_byte();

        let len = (self.len / 8) as usize;
        let mut bytes = [0; MAX_FRAME_LEN];

        for (index, byte) in bytes.iter_mut().take(len).enumerate() {
            let shift = self.len - 8 * (index as u32 + 1);
            *byte = (self.bits >> shift) as u8;
        }

        Frame { bytes, len }
    }
}

/// Bit `index` of `bytes`, counting from the MSB of the first byte.
fn bit_at(bytes: &[u8], index: u32) -> u64 {
    let byte = bytes[(index / 8) as usize];
    u64::from((byte >> (7 - index % 8)) & 1)
}

/// Builds the request selecting `channel` in `mode`.
pub fn encode(profile: &ChipProfile, channel: u8, mode: Mode) -> Result<Frame, CodecError> {
    profile.check_channel(channel)?;

    let mut bits = BitSequence::new();

    bits.push(1, 1)
        .push(mode.bit().into(), 1)
        .push(channel.into(), profile.channel_width())
        // sample
        .push(0, 1)
        // null
        .push(0, 1)
        .push(0, profile.resolution_bits());

    Ok(bits.to_frame())
}

/// Extracts the reading from a response of the same shape as the request.
///
/// Bits after the reading field are ignored.
pub fn decode(profile: &ChipProfile, response: &[u8]) -> Result<u32, CodecError> {
    let skip = profile.skip_bits();
    let needed_bits = skip + profile.resolution_bits();
    let available_bits = response.len().saturating_mul(8);

    if available_bits < needed_bits as usize {
        return Err(CodecError::TruncatedResponse {
            needed_bits,
            available_bits,
        });
    }

    let reading = (skip..needed_bits).fold(0u64, |acc, index| (acc << 1) | bit_at(response, index));

    Ok(reading as u32)
}
