//! Provides a driver for Microchip MCP3xxx style successive-approximation ADCs via the `embedded-hal` ecosystem.
//!
//! All supported chips share one serial protocol and differ only in channel
//! count, resolution and maximum clock. Those numbers live in a
//! [`ChipProfile`], and a single codec serves every model:
//!
//! ```
//! use mcp3xxx::{codec, profile::MCP3208, Mode};
//!
//! let request = codec::encode(&MCP3208, 0, Mode::Single).unwrap();
//! assert_eq!(&*request, &[0b1100_0000, 0x00, 0x00]);
//!
//! // The chip answers on the same clock edges.
//! let response = [0b0000_0001, 0b0101_0111, 0b1000_0000];
//! assert_eq!(codec::decode(&MCP3208, &response), Ok(0xABC));
//! ```
//!
//! # Features
//!
//! - **`mcp300x`** / **`mcp320x`** (default): built-in 10 and 12 bit model profiles.
//! - **`defmt`** enables `defmt::Format` on public types and trace logging of every transfer.

#![no_std]
#![forbid(unsafe_code)]

use embedded_hal::spi::SpiDevice;

pub mod codec;
mod driver;
mod error;
pub mod profile;

pub use codec::{Frame, MAX_FRAME_LEN};
pub use driver::Mcp3xxx;
pub use error::{CodecError, Error};
pub use profile::ChipProfile;

/// How the chip interprets the channel select field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Channel measured against ground.
    #[default]
    Single,
    /// Channel measured against its paired channel.
    Differential,
}

impl Mode {
    /// Value of the mode bit on the wire.
    pub const fn bit(self) -> u8 {
        match self {
            Mode::Single => 1,
            Mode::Differential => 0,
        }
    }
}

impl From<bool> for Mode {
    /// `true` selects single-ended mode.
    fn from(single_ended: bool) -> Self {
        if single_ended {
            Mode::Single
        } else {
            Mode::Differential
        }
    }
}

/// Performs one conversion on `spi`: encode, a single full-duplex transfer,
/// decode.
///
/// The channel is validated before the bus is touched. Transfer failures are
/// returned as [`Error::Transport`] and never retried.
pub fn measure<SPI: SpiDevice>(
    profile: &ChipProfile,
    spi: &mut SPI,
    channel: u8,
    mode: Mode,
) -> Result<u32, Error<SPI::Error>> {
    let mut frame = codec::encode(profile, channel, mode)?;

    #[cfg(feature = "defmt")]
    defmt::trace!("{} ch{} {}: tx {}", profile.name(), channel, mode, &*frame);

    spi.transfer_in_place(&mut frame).map_err(Error::Transport)?;

    let reading = codec::decode(profile, &frame)?;

    #[cfg(feature = "defmt")]
    defmt::trace!("{} ch{}: rx {} = {}", profile.name(), channel, &*frame, reading);

    Ok(reading)
}
