//! Prints the command frame of every channel of every built-in chip model,
//! for checking wiring and logic analyser captures against the datasheet.

use mcp3xxx::{codec, profile, ChipProfile, Mode};

fn main() -> Result<(), anyhow::Error> {
    let filter = std::env::args().nth(1);

    let profiles = profile::BUILTIN
        .iter()
        .filter(|profile| match &filter {
            Some(name) => profile.name().eq_ignore_ascii_case(name),
            None => true,
        })
        .collect::<Vec<_>>();

    if profiles.is_empty() {
        anyhow::bail!("unknown chip model {:?}", filter.unwrap_or_default());
    }

    for profile in profiles {
        dump(profile)?;
    }

    Ok(())
}

fn dump(profile: &ChipProfile) -> Result<(), anyhow::Error> {
    println!(
        "{}: {} channels, {}-bit, {} Hz max, {} select bits, {}-byte frame",
        profile.name(),
        profile.channel_count(),
        profile.resolution_bits(),
        profile.max_speed_hz(),
        profile.channel_width(),
        profile.frame_len(),
    );

    for channel in 0..profile.channel_count() {
        for mode in [Mode::Single, Mode::Differential] {
            let frame = codec::encode(profile, channel, mode)?;

            let hex = frame
                .iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<_>>()
                .join(" ");

            println!("  ch{channel} {:<12} {hex}", format!("{mode:?}"));
        }
    }

    println!();

    Ok(())
}
