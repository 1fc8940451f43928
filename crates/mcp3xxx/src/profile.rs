//! Chip models described as plain data.

use crate::error::CodecError;

/// Start, mode, sample and null bits surrounding the channel select field.
pub(crate) const FIXED_HEADER_BITS: u32 = 4;

/// Widest reading a [`u32`] can carry.
pub(crate) const MAX_RESOLUTION_BITS: u8 = 32;

/// Bit layout and clock limit of a specific ADC model.
///
/// Every model of the family speaks the same protocol; only these numbers
/// differ, so one codec serves them all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipProfile {
    name: &'static str,
    channel_count: u8,
    resolution_bits: u8,
    max_speed_hz: u32,
}

impl ChipProfile {
    /// Describes a chip model.
    ///
    /// Fails with [`CodecError::InvalidProfile`] if any parameter is zero or
    /// the resolution is wider than a [`u32`] reading.
    pub const fn new(
        name: &'static str,
        channel_count: u8,
        resolution_bits: u8,
        max_speed_hz: u32,
    ) -> Result<Self, CodecError> {
        if channel_count == 0 || resolution_bits == 0 || max_speed_hz == 0 {
            return Err(CodecError::InvalidProfile);
        }

        if resolution_bits > MAX_RESOLUTION_BITS {
            return Err(CodecError::InvalidProfile);
        }

        Ok(Self {
            name,
            channel_count,
            resolution_bits,
            max_speed_hz,
        })
    }

    #[cfg(any(feature = "mcp300x", feature = "mcp320x"))]
    const fn builtin(
        name: &'static str,
        channel_count: u8,
        resolution_bits: u8,
        max_speed_hz: u32,
    ) -> Self {
        match Self::new(name, channel_count, resolution_bits, max_speed_hz) {
            Ok(profile) => profile,
            Err(_) => panic!("invalid built-in chip profile"),
        }
    }

    /// Model name, e.g. `"MCP3208"`.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Number of addressable input channels.
    pub const fn channel_count(&self) -> u8 {
        self.channel_count
    }

    /// Width of a reading in bits.
    pub const fn resolution_bits(&self) -> u32 {
        self.resolution_bits as u32
    }

    /// Advisory upper bound for the SPI clock. The driver never configures
    /// the bus itself.
    pub const fn max_speed_hz(&self) -> u32 {
        self.max_speed_hz
    }

    /// Bits needed to address the highest channel, `ceil(log2(channel_count))`.
    pub const fn channel_width(&self) -> u32 {
        u8::BITS - (self.channel_count - 1).leading_zeros()
    }

    /// Bits clocked before the first reading bit appears on the wire.
    pub const fn skip_bits(&self) -> u32 {
        FIXED_HEADER_BITS + self.channel_width()
    }

    /// Unpadded length of a request.
    pub const fn frame_bits(&self) -> u32 {
        self.skip_bits() + self.resolution_bits()
    }

    /// Length in bytes of both the request and the response.
    pub const fn frame_len(&self) -> usize {
        self.frame_bits().div_ceil(8) as usize
    }

    /// Largest reading the chip can return, `2^resolution_bits - 1`.
    pub const fn max_reading(&self) -> u32 {
        u32::MAX >> (u32::BITS - self.resolution_bits())
    }

    pub(crate) const fn check_channel(&self, channel: u8) -> Result<(), CodecError> {
        if channel < self.channel_count {
            Ok(())
        } else {
            Err(CodecError::InvalidChannel {
                channel,
                channel_count: self.channel_count,
            })
        }
    }
}

#[cfg(feature = "mcp300x")]
/// MCP3002: 2 channels, 10-bit.
pub const MCP3002: ChipProfile = ChipProfile::builtin("MCP3002", 2, 10, 1_200_000);
#[cfg(feature = "mcp300x")]
/// MCP3004: 4 channels, 10-bit.
pub const MCP3004: ChipProfile = ChipProfile::builtin("MCP3004", 4, 10, 1_350_000);
#[cfg(feature = "mcp300x")]
/// MCP3008: 8 channels, 10-bit.
pub const MCP3008: ChipProfile = ChipProfile::builtin("MCP3008", 8, 10, 1_350_000);

#[cfg(feature = "mcp320x")]
/// MCP3202: 2 channels, 12-bit.
pub const MCP3202: ChipProfile = ChipProfile::builtin("MCP3202", 2, 12, 900_000);
#[cfg(feature = "mcp320x")]
/// MCP3204: 4 channels, 12-bit.
pub const MCP3204: ChipProfile = ChipProfile::builtin("MCP3204", 4, 12, 1_000_000);
#[cfg(feature = "mcp320x")]
/// MCP3208: 8 channels, 12-bit.
pub const MCP3208: ChipProfile = ChipProfile::builtin("MCP3208", 8, 12, 1_000_000);

/// Every model enabled through cargo features.
pub const BUILTIN: &[ChipProfile] = &[
    #[cfg(feature = "mcp300x")]
    MCP3002,
    #[cfg(feature = "mcp300x")]
    MCP3004,
    #[cfg(feature = "mcp300x")]
    MCP3008,
    #[cfg(feature = "mcp320x")]
    MCP3202,
    #[cfg(feature = "mcp320x")]
    MCP3204,
    #[cfg(feature = "mcp320x")]
    MCP3208,
];

/// Looks up a built-in model, ignoring ASCII case.
pub fn by_name(name: &str) -> Option<ChipProfile> {
    BUILTIN
        .iter()
        .find(|profile| profile.name.eq_ignore_ascii_case(name))
        .copied()
}
