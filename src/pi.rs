use std::cell::RefCell;
use std::time::Duration;

use anyhow::Context;
use embedded_hal::spi::SpiDevice;
use embedded_hal_bus::spi::RefCellDevice;
use mcp3xxx::{profile, ChipProfile, Mcp3xxx, Mode};
use rppal::gpio::Gpio;
use rppal::spi::{Bus, Mode as SpiMode, SlaveSelect, Spi};

/// Host side settings: `pi [model] [chip-select-gpio] [speed-hz]`.
struct HostConfig {
    profile: ChipProfile,
    chip_select: u8,
    speed_hz: u32,
}

impl HostConfig {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, anyhow::Error> {
        let profile = match args.next() {
            Some(name) => profile::by_name(&name)
                .with_context(|| format!("unknown chip model {name:?}"))?,
            None => profile::MCP3208,
        };

        let chip_select = match args.next() {
            Some(pin) => pin.parse().context("invalid chip select pin")?,
            None => 24,
        };

        let speed_hz = match args.next() {
            Some(speed) => speed.parse().context("invalid SPI speed")?,
            None => profile.max_speed_hz(),
        };

        Ok(Self {
            profile,
            chip_select,
            speed_hz,
        })
    }
}

fn poll<SPI>(mcp: &mut Mcp3xxx<SPI>) -> Result<(), anyhow::Error>
where
    SPI: SpiDevice,
    SPI::Error: Send + Sync + 'static,
{
    for channel in mcp.channels() {
        let data = mcp.read_with_mode(channel, Mode::Single)?;

        println!("{} channel {channel}: {data}", mcp.profile().name());
    }

    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let config = HostConfig::from_args(std::env::args().skip(1))?;

    let gpio = Gpio::new()?;

    let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, config.speed_hz, SpiMode::Mode0)?;

    let spi = RefCell::new(spi);

    let device = RefCellDevice::new_no_delay(&spi, gpio.get(config.chip_select)?.into_output());

    let mut mcp = Mcp3xxx::new(device, config.profile);

    eprintln!(
        "{} on SPI0 at {} Hz, chip select GPIO {}",
        config.profile.name(),
        config.speed_hz,
        config.chip_select
    );

    loop {
        poll(&mut mcp)?;

        std::thread::sleep(Duration::from_millis(500));
    }
}
