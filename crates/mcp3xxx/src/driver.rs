use core::ops::Range;

use embedded_hal::spi::SpiDevice;

use crate::{measure, ChipProfile, Error, Mode};

/// MCP3xxx driver
pub struct Mcp3xxx<SPI> {
    spi: SPI,
    profile: ChipProfile,
}

impl<SPI: SpiDevice> Mcp3xxx<SPI> {
    /// Creates a new driver from an SPI peripheral and the model it talks to.
    /// Please ensure the SPI bus is in SPI mode 0, aka (0, 0), and clocked no
    /// faster than [`ChipProfile::max_speed_hz`].
    pub fn new(spi: SPI, profile: ChipProfile) -> Self {
        (spi, profile).into()
    }

    /// The chip model this driver talks to.
    pub fn profile(&self) -> &ChipProfile {
        &self.profile
    }

    /// Read a channel and return the value as a [`u32`] in
    /// `0..=profile.max_reading()`.
    pub fn read_with_mode(&mut self, channel: u8, mode: Mode) -> Result<u32, Error<SPI::Error>> {
        measure(&self.profile, &mut self.spi, channel, mode)
    }

    /// Read a channel in single-ended mode.
    pub fn read(&mut self, channel: u8) -> Result<u32, Error<SPI::Error>> {
        self.read_with_mode(channel, Mode::Single)
    }

    /// Read a channel in differential mode.
    pub fn read_differential(&mut self, channel: u8) -> Result<u32, Error<SPI::Error>> {
        self.read_with_mode(channel, Mode::Differential)
    }

    /// Read channels `0..n` into `readings`, where `n` is the smaller of the
    /// buffer length and the channel count. Stops at the first failure.
    pub fn read_all(&mut self, mode: Mode, readings: &mut [u32]) -> Result<usize, Error<SPI::Error>> {
        let mut count = 0;

        for (channel, reading) in self.channels().zip(readings.iter_mut()) {
            *reading = self.read_with_mode(channel, mode)?;
            count += 1;
        }

        Ok(count)
    }

    /// Iterate over all valid channel indices.
    pub fn channels(&self) -> Range<u8> {
        0..self.profile.channel_count()
    }

    /// Hands the SPI peripheral back, e.g. to close the bus.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> From<(SPI, ChipProfile)> for Mcp3xxx<SPI> {
    fn from((spi, profile): (SPI, ChipProfile)) -> Self {
        Self { spi, profile }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodecError;
    use embedded_hal::spi::{Error as _, ErrorKind, ErrorType, Operation};

    #[derive(Debug, PartialEq)]
    struct MockError;

    impl embedded_hal::spi::Error for MockError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn bit(words: &[u8], index: u32) -> u32 {
        u32::from((words[(index / 8) as usize] >> (7 - index % 8)) & 1)
    }

    fn set_bit(words: &mut [u8], index: u32, value: u32) {
        let mask = 1 << (7 - index % 8);
        let byte = &mut words[(index / 8) as usize];

        if value & 1 == 1 {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Behaves like the chip described by `profile`: answers `100 + channel`
    /// in single-ended mode and `200 + channel` in differential mode.
    struct MockSpi {
        profile: ChipProfile,
        transfers: usize,
        last_len: usize,
        fail: bool,
    }

    impl MockSpi {
        fn new(profile: ChipProfile) -> Self {
            Self {
                profile,
                transfers: 0,
                last_len: 0,
                fail: false,
            }
        }
    }

    impl ErrorType for MockSpi {
        type Error = MockError;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            assert_eq!(operations.len(), 1);

            self.transfers += 1;

            if self.fail {
                return Err(MockError);
            }

            match &mut operations[0] {
                Operation::TransferInPlace(words) => {
                    self.last_len = words.len();

                    assert_eq!(words.len(), self.profile.frame_len());
                    assert_eq!(bit(words, 0), 1, "Missing start flag");

                    let single_ended = bit(words, 1) == 1;
                    let channel = (2..2 + self.profile.channel_width())
                        .fold(0, |acc, index| (acc << 1) | bit(words, index));

                    let reading = (if single_ended { 100 } else { 200 }) + channel;

                    // Header and padding are driven low, the reading MSB-first.
                    words.fill(0);

                    let skip = self.profile.skip_bits();
                    let resolution = self.profile.resolution_bits();

                    for offset in 0..resolution {
                        set_bit(words, skip + offset, reading >> (resolution - 1 - offset));
                    }
                }
                _ => panic!("Not an expected operation"),
            }

            Ok(())
        }
    }

    fn mcp3208() -> ChipProfile {
        ChipProfile::new("MCP3208", 8, 12, 1_000_000).unwrap()
    }

    #[test]
    fn mock_spi() {
        let mut mcp = Mcp3xxx::new(MockSpi::new(mcp3208()), mcp3208());

        assert_eq!(mcp.read(0), Ok(100));
        assert_eq!(mcp.read(1), Ok(101));
        assert_eq!(mcp.read(7), Ok(107));
        assert_eq!(mcp.read_differential(3), Ok(203));
        assert_eq!(mcp.read_with_mode(5, Mode::from(false)), Ok(205));

        assert_eq!(mcp.release().transfers, 5);
    }

    #[test]
    fn invalid_channel_never_touches_the_bus() {
        let mut mcp = Mcp3xxx::new(MockSpi::new(mcp3208()), mcp3208());

        assert_eq!(
            mcp.read(8),
            Err(Error::Codec(CodecError::InvalidChannel {
                channel: 8,
                channel_count: 8
            }))
        );

        assert_eq!(mcp.release().transfers, 0);
    }

    #[test]
    fn transport_errors_are_passed_through() {
        let spi = MockSpi {
            fail: true,
            ..MockSpi::new(mcp3208())
        };
        let mut mcp = Mcp3xxx::new(spi, mcp3208());

        let err = mcp.read(2).unwrap_err();

        assert!(err.is_transport());
        assert_eq!(err, Error::Transport(MockError));
        assert!(matches!(err, Error::Transport(e) if e.kind() == ErrorKind::Other));
        assert_eq!(mcp.release().transfers, 1);
    }

    #[test]
    fn read_all_channels() {
        let mut mcp = Mcp3xxx::new(MockSpi::new(mcp3208()), mcp3208());
        let mut readings = [0; 10];

        assert_eq!(mcp.read_all(Mode::Single, &mut readings), Ok(8));
        assert_eq!(readings[..8], [100, 101, 102, 103, 104, 105, 106, 107]);
        assert_eq!(readings[8..], [0, 0]);

        let mut readings = [0; 2];
        assert_eq!(mcp.read_all(Mode::Differential, &mut readings), Ok(2));
        assert_eq!(readings, [200, 201]);
    }

    #[test]
    fn channels_cover_profile() {
        let mcp = Mcp3xxx::new(MockSpi::new(mcp3208()), mcp3208());

        assert_eq!(mcp.channels().count(), 8);
        assert_eq!(mcp.channels().last(), Some(7));
        assert_eq!(mcp.profile().name(), "MCP3208");
    }

    #[test]
    fn byte_aligned_profile_round_trip() {
        // 1 + 1 + 2 + 1 + 1 + 10 = 16 bits, no padding
        let mcp3004 = ChipProfile::new("MCP3004", 4, 10, 1_350_000).unwrap();
        let mut mcp = Mcp3xxx::new(MockSpi::new(mcp3004), mcp3004);

        for channel in mcp.channels() {
            assert_eq!(mcp.read(channel), Ok(100 + u32::from(channel)));
            assert_eq!(mcp.read_differential(channel), Ok(200 + u32::from(channel)));
        }

        let spi = mcp.release();
        assert_eq!(spi.last_len, 2);
        assert_eq!(spi.last_len, mcp3004.frame_len());
        assert_eq!(spi.transfers, 8);
    }

    #[test]
    fn transfer_length_follows_profile() {
        // 1 + 1 + 1 + 1 + 1 + 10 = 15 bits, one pad bit
        let mcp3002 = ChipProfile::new("MCP3002", 2, 10, 1_200_000).unwrap();
        let mut mcp = Mcp3xxx::new(MockSpi::new(mcp3002), mcp3002);

        assert_eq!(mcp.read(1), Ok(101));
        assert_eq!(mcp.read_differential(0), Ok(200));
        assert_eq!(mcp.release().last_len, mcp3002.frame_len());

        let mut mcp = Mcp3xxx::new(MockSpi::new(mcp3208()), mcp3208());

        assert_eq!(mcp.read(6), Ok(106));
        assert_eq!(mcp.release().last_len, 3);
    }

    #[test]
    fn mismatched_chip_reply_is_rejected() {
        // The device answers like an MCP3004 (2 bytes) while the driver is set
        // up for an MCP3208 (3 bytes).
        let mcp3004 = ChipProfile::new("MCP3004", 4, 10, 1_350_000).unwrap();
        let mut spi = MockSpi::new(mcp3004);
        let mut frame = crate::codec::encode(&mcp3004, 2, Mode::Single).unwrap();

        spi.transfer_in_place(&mut frame).unwrap();

        assert_eq!(crate::codec::decode(&mcp3004, &frame), Ok(102));
        assert_eq!(
            crate::codec::decode(&mcp3208(), &frame),
            Err(CodecError::TruncatedResponse {
                needed_bits: 19,
                available_bits: 16
            })
        );
    }
}
