//! Wavetable channel (3)
//!
//! The trigger only resets phase and starts the note. Length, frequency and
//! output level are re-read from the registers on every generation call, so
//! NR31-NR34 can be changed live without retriggering.

use tracing::debug;

use super::channel_state::{ChannelId, ChannelState, NoteDuration};
use super::decode::{
    frequency_hz, raw_frequency, scale_wave_nibble, wave_duration, wave_nibble, wave_shift,
    SILENCE,
};
use super::registers::{Register, RegisterStore, WAVE_RAM_LEN, WAVE_RAM_START};
use super::square::{reload_or_finish, trigger_armed};
use super::timing::Timing;

/// Wavetable entries per period
pub const WAVE_STEPS: usize = 32;

/// Trigger handler for channel 3
pub fn trigger<R: RegisterStore>(ch: &mut ChannelState, regs: &R) -> bool {
    if !trigger_armed(regs, ChannelId::Wave, Register::Nr34) {
        return false;
    }
    ch.freq_dist = 0;
    ch.frequency = 0.0;
    ch.duration = NoteDuration::Millis(0);
    ch.playing = true;
    debug!("{} triggered", ChannelId::Wave);
    true
}

/// Re-derive length, frequency and output level from the live registers
fn refresh<R: RegisterStore>(ch: &mut ChannelState, regs: &R, timing: &Timing) {
    let nr34 = regs.read(Register::Nr34.addr());

    let duration = wave_duration(nr34, regs.read(Register::Nr31.addr()));
    if duration != ch.duration {
        ch.duration = duration;
        ch.sample_length = timing.samples_for(duration);
    }

    ch.raw_frequency = raw_frequency(nr34, regs.read(Register::Nr33.addr()));
    // The wave channel's timer runs at half the square channels' rate.
    ch.frequency = frequency_hz(ch.raw_frequency) / 2.0;

    ch.wave_shift = wave_shift(regs.read(Register::Nr32.addr()));
    ch.wave_step = (timing.sample_rate() as f64 / ch.frequency) / WAVE_STEPS as f64;
}

fn read_wave_ram<R: RegisterStore>(regs: &R) -> [u8; WAVE_RAM_LEN] {
    std::array::from_fn(|i| regs.read(WAVE_RAM_START + i as u16))
}

/// Sample generator for channel 3
///
/// Writes exactly `out.len()` samples.
pub fn generate<R: RegisterStore>(
    ch: &mut ChannelState,
    regs: &R,
    timing: &Timing,
    out: &mut [i16],
) {
    if !ch.playing {
        out.fill(SILENCE);
        return;
    }

    refresh(ch, regs, timing);
    let wave_ram = read_wave_ram(regs);
    let freq_samples = timing.samples_per_period(ch.frequency);

    for i in 0..out.len() {
        if ch.sample_length == 0
            && !reload_or_finish(ch, ChannelId::Wave, timing, &mut out[i..])
        {
            return;
        }

        ch.freq_dist += 1;
        if ch.freq_dist >= freq_samples {
            ch.freq_dist = 0;
        }

        let index = (ch.freq_dist as f64 / ch.wave_step).floor() as usize % WAVE_STEPS;
        let nibble = wave_nibble(&wave_ram, index) >> ch.wave_shift;
        out[i] = scale_wave_nibble(nibble);

        ch.sample_length -= 1;
    }
}
