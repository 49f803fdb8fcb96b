//! Game Boy sound demo CLI
//!
//! Programs a short scene through the register interface and plays it on the
//! default audio device, or renders it to a WAV file.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gbapu::{export_to_wav, output, register_channel, Apu, ApuConfig, Mixer, Register};
#[cfg(feature = "streaming")]
use gbapu::RegisterWriter;

const DEFAULT_SECONDS: f32 = 3.0;

/// One register write scheduled at a point in the scene
#[derive(Debug, Clone, Copy)]
struct ScriptedWrite {
    at: Duration,
    address: u16,
    value: u8,
}

impl ScriptedWrite {
    fn new(at_ms: u64, register: Register, value: u8) -> Self {
        ScriptedWrite {
            at: Duration::from_millis(at_ms),
            address: register.addr(),
            value,
        }
    }
}

/// Split an 11-bit frequency code into (NRx3, NRx4 high bits)
fn frequency_bytes(raw: u16) -> (u8, u8) {
    ((raw & 0xFF) as u8, ((raw >> 8) & 0x07) as u8)
}

/// Frequency code closest to `hz` for a square channel
fn raw_for_hz(hz: f64) -> u16 {
    (2048.0 - 131_072.0 / hz).round().clamp(0.0, 2047.0) as u16
}

/// 440 Hz square on channel 1, a repeating decaying pluck on channel 2 and
/// a triangle on channel 3.
fn demo_script(seconds: f32) -> Vec<ScriptedWrite> {
    let mut script = vec![
        ScriptedWrite::new(0, Register::Nr52, 0x80),
        ScriptedWrite::new(0, Register::Nr51, 0xFF),
        ScriptedWrite::new(0, Register::Nr50, 0x77),
    ];

    // Triangle wavetable: 0..15 then 15..0
    for i in 0..16u16 {
        let rise = (2 * i) as u8;
        let (a, b) = if i < 8 { (rise, rise + 1) } else { (31 - rise, 30 - rise) };
        script.push(ScriptedWrite {
            at: Duration::ZERO,
            address: gbapu::apu::registers::WAVE_RAM_START + i,
            value: (a << 4) | b,
        });
    }

    let (lo, hi) = frequency_bytes(raw_for_hz(440.0));
    script.extend([
        ScriptedWrite::new(0, Register::Nr10, 0x00),
        ScriptedWrite::new(0, Register::Nr11, 0x80),
        ScriptedWrite::new(0, Register::Nr12, 0x80),
        ScriptedWrite::new(0, Register::Nr13, lo),
        ScriptedWrite::new(0, Register::Nr14, 0x80 | hi),
    ]);

    // Wave channel plays at half the square formula's frequency: 880 -> 440 Hz.
    let (lo, hi) = frequency_bytes(raw_for_hz(880.0));
    script.extend([
        ScriptedWrite::new(0, Register::Nr30, 0x80),
        ScriptedWrite::new(0, Register::Nr32, 0x40),
        ScriptedWrite::new(0, Register::Nr33, lo),
        ScriptedWrite::new(0, Register::Nr34, 0x80 | hi),
    ]);

    let (lo, hi) = frequency_bytes(raw_for_hz(660.0));
    let total_ms = (seconds * 1000.0) as u64;
    for at in (250..total_ms).step_by(500) {
        script.extend([
            ScriptedWrite::new(at, Register::Nr21, 0x40),
            ScriptedWrite::new(at, Register::Nr22, 0xF2),
            ScriptedWrite::new(at, Register::Nr23, lo),
            ScriptedWrite::new(at, Register::Nr24, 0x80 | hi),
        ]);
    }

    script
}

/// Play the script in real time from the emulation side
#[cfg(feature = "streaming")]
fn run_script(
    writer: &RegisterWriter,
    script: &[ScriptedWrite],
    seconds: f32,
) -> gbapu::Result<()> {
    use std::thread;
    use std::time::Instant;

    let start = Instant::now();
    for write in script {
        if let Some(wait) = write.at.checked_sub(start.elapsed()) {
            thread::sleep(wait);
        }
        writer.write(write.address, write.value)?;
    }
    if let Some(rest) = Duration::from_secs_f32(seconds).checked_sub(start.elapsed()) {
        thread::sleep(rest);
    }
    Ok(())
}

/// Render the script without an audio device
fn render_offline(
    config: ApuConfig,
    script: &[ScriptedWrite],
    seconds: f32,
) -> anyhow::Result<Vec<i16>> {
    let mut apu = Apu::new(config)?;
    let mixer = Mixer::new();
    let (writer, mut events) = register_channel(config.event_queue_capacity.max(script.len()));

    let total = (seconds * config.sample_rate as f32) as usize;
    let mut samples = Vec::with_capacity(total);
    let mut pending = script.iter().peekable();

    while samples.len() < total {
        let now = Duration::from_secs_f64(samples.len() as f64 / config.sample_rate as f64);
        while let Some(write) = pending.next_if(|w| w.at <= now) {
            writer.write(write.address, write.value)?;
        }
        let chunk = config.buffer_size.min(total - samples.len());
        samples.extend(output::render(&mut apu, &mut events, &mixer, chunk));
    }
    Ok(samples)
}

#[cfg(feature = "streaming")]
fn play(config: ApuConfig, script: &[ScriptedWrite], seconds: f32) -> anyhow::Result<()> {
    use gbapu::{ApuSource, AudioDevice};

    let (writer, events) = register_channel(config.event_queue_capacity);
    let source = ApuSource::new(Apu::new(config)?, events, Mixer::new());
    let stats = source.stats();

    let device = match AudioDevice::new(source) {
        Ok(device) => device,
        Err(e) => {
            warn!("{e}. Audio disabled, rendering offline instead.");
            let samples = render_offline(config, script, seconds)?;
            info!("Rendered {} samples without output", samples.len());
            return Ok(());
        }
    };

    let script = script.to_vec();
    let emulation = std::thread::spawn(move || run_script(&writer, &script, seconds));
    emulation
        .join()
        .map_err(|_| anyhow::anyhow!("emulation thread panicked"))??;
    device.finish();

    let stats = stats.lock().clone();
    info!(
        "Playback complete: {} samples, {} register events, {} buffers",
        stats.samples_generated, stats.events_applied, stats.buffers_filled
    );
    Ok(())
}

#[cfg(not(feature = "streaming"))]
fn play(config: ApuConfig, script: &[ScriptedWrite], seconds: f32) -> anyhow::Result<()> {
    warn!(
        "Built without the \"streaming\" feature; rendering offline. Use --wav to keep the result."
    );
    let samples = render_offline(config, script, seconds)?;
    info!("Rendered {} samples without output", samples.len());
    Ok(())
}

/// Parsed command-line arguments.
#[derive(Debug, Default)]
struct CliArgs {
    seconds: Option<f32>,
    wav_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    show_help: bool,
}

impl CliArgs {
    fn parse() -> anyhow::Result<Self> {
        let mut args = Self::default();
        let mut iter = env::args().skip(1);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => args.show_help = true,
                "--seconds" => {
                    let value = iter.next().context("--seconds needs a value")?;
                    let seconds: f32 = value
                        .parse()
                        .with_context(|| format!("invalid duration: {value}"))?;
                    if !(seconds > 0.0) {
                        bail!("duration must be positive: {value}");
                    }
                    args.seconds = Some(seconds);
                }
                "--wav" => {
                    args.wav_path = Some(iter.next().context("--wav needs a path")?.into());
                }
                "--config" => {
                    args.config_path = Some(iter.next().context("--config needs a path")?.into());
                }
                other => bail!("Unknown flag: {other}"),
            }
        }
        Ok(args)
    }
}

fn print_usage() {
    println!("Usage: gbapu [--seconds N] [--wav PATH] [--config PATH]");
    println!();
    println!("  --seconds N     Length of the demo scene (default {DEFAULT_SECONDS})");
    println!("  --wav PATH      Render to a WAV file instead of the audio device");
    println!("  --config PATH   JSON engine configuration");
    println!("                  (sample_rate, buffer_size, event_queue_capacity)");
    println!();
    println!("Set RUST_LOG=debug to trace register dispatch.");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse()?;
    if args.show_help {
        print_usage();
        return Ok(());
    }

    let config = match &args.config_path {
        Some(path) => ApuConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ApuConfig::default(),
    };
    let seconds = args.seconds.unwrap_or(DEFAULT_SECONDS);
    let script = demo_script(seconds);

    match &args.wav_path {
        Some(path) => {
            let samples = render_offline(config, &script, seconds)?;
            export_to_wav(&samples, config.sample_rate, path)?;
            Ok(())
        }
        None => play(config, &script, seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbapu::ChannelId;

    #[test]
    fn test_demo_scene_pitches() {
        let mut apu = Apu::new(ApuConfig::default()).unwrap();
        for write in demo_script(1.0).iter().filter(|w| w.at.is_zero()) {
            apu.write_register(write.address, write.value);
        }
        let mut out = vec![0i16; 64];
        apu.generate_channel(ChannelId::Wave, &mut out);

        let square = apu.channel(ChannelId::Square1).frequency;
        let wave = apu.channel(ChannelId::Wave).frequency;
        assert!((square - 440.0).abs() < 1.0, "square at {square} Hz");
        assert!((wave - 440.0).abs() < 1.0, "wave at {wave} Hz");
    }
}
