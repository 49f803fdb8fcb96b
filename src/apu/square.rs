//! Square wave channels (1 and 2)
//!
//! Both channels share one trigger handler and one sample generator; they
//! differ only in register layout and in channel 1 owning a frequency sweep.
//!
//! Per generated sample the generator:
//! 1. advances the phase counter,
//! 2. runs the sweep (channel 1, `sweep_time >= 1`),
//! 3. runs the envelope (`envelope_step >= 1`),
//! 4. wraps the phase at one period and emits either the scaled volume or
//!    the silence floor depending on the duty cycle.
//!
//! The low half of the wave is always [`SILENCE`] regardless of volume.

use tracing::debug;

use super::channel_state::{ChannelId, ChannelState, EnvelopeDirection, SweepDirection};
use super::decode::{
    equivalent_raw, frequency_hz, raw_frequency, square_amplitude, square_duration, DutyCycle,
    SILENCE,
};
use super::registers::{OutputSelect, Register, RegisterStore};
use super::timing::Timing;

/// Register addresses for one square channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareLayout {
    /// Channel this layout belongs to
    pub id: ChannelId,
    /// Sweep register (channel 1 only)
    pub sweep: Option<Register>,
    /// Duty / length register
    pub duty_length: Register,
    /// Volume / envelope register
    pub envelope: Register,
    /// Frequency low byte
    pub freq_lo: Register,
    /// Frequency high bits / trigger
    pub freq_hi: Register,
}

/// Channel 1 (NR10-NR14)
pub const SQUARE1: SquareLayout = SquareLayout {
    id: ChannelId::Square1,
    sweep: Some(Register::Nr10),
    duty_length: Register::Nr11,
    envelope: Register::Nr12,
    freq_lo: Register::Nr13,
    freq_hi: Register::Nr14,
};

/// Channel 2 (NR21-NR24)
pub const SQUARE2: SquareLayout = SquareLayout {
    id: ChannelId::Square2,
    sweep: None,
    duty_length: Register::Nr21,
    envelope: Register::Nr22,
    freq_lo: Register::Nr23,
    freq_hi: Register::Nr24,
};

/// Whether a trigger write on `trigger_reg` should start `id`: the channel
/// must be routed to an output and the written value must carry bit 7.
pub(crate) fn trigger_armed<R: RegisterStore>(
    regs: &R,
    id: ChannelId,
    trigger_reg: Register,
) -> bool {
    let outputs = OutputSelect::from_register(regs.read(Register::Nr51.addr()));
    let armed = outputs.is_enabled(id) && regs.read(trigger_reg.addr()) & 0x80 != 0;
    if !armed {
        debug!(
            "{id} trigger ignored (NR51={:#04X}, {trigger_reg})",
            outputs.bits()
        );
    }
    armed
}

fn latch_envelope(ch: &mut ChannelState, value: u8) {
    ch.volume = value >> 4;
    ch.envelope_direction = EnvelopeDirection::from_register(value);
    ch.envelope_step = value & 0x07;
}

/// Trigger handler for a square channel
///
/// Returns `true` when the note (re)started.
pub fn trigger<R: RegisterStore>(
    ch: &mut ChannelState,
    layout: &SquareLayout,
    regs: &R,
    timing: &Timing,
) -> bool {
    if !trigger_armed(regs, layout.id, layout.freq_hi) {
        return false;
    }

    ch.freq_dist = 0;
    ch.frequency = 0.0;
    ch.playing = true;
    ch.envelope_counter = 0;
    ch.sweep_counter = 0;

    let duty_length = regs.read(layout.duty_length.addr());
    let freq_hi = regs.read(layout.freq_hi.addr());

    ch.duty = DutyCycle::from_register(duty_length);

    ch.duration = square_duration(freq_hi, duty_length);
    ch.sample_length = timing.samples_for(ch.duration);

    ch.raw_frequency = raw_frequency(freq_hi, regs.read(layout.freq_lo.addr()));
    ch.frequency = frequency_hz(ch.raw_frequency);

    latch_envelope(ch, regs.read(layout.envelope.addr()));

    if let Some(sweep) = layout.sweep {
        let value = regs.read(sweep.addr());
        ch.sweep_direction = SweepDirection::from_register(value);
        ch.sweep_time = (value >> 4) & 0x07;
        ch.sweep_step = value & 0x07;
    }

    debug!(
        "{} triggered: {:.2} Hz (raw {}), {:?}, volume {}",
        layout.id, ch.frequency, ch.raw_frequency, ch.duration, ch.volume
    );
    true
}

/// Live update for a write to one of NR10-NR13 without a trigger
///
/// - NR12: the envelope only restarts when its step goes from 0 to non-zero;
///   an envelope already running keeps its timing.
/// - NR13: while a sweep is active the low frequency byte is replaced and the
///   frequency recomputed.
///
/// NR10 and NR11 take effect on the next trigger.
pub fn update_square1<R: RegisterStore>(ch: &mut ChannelState, addr: u16, regs: &R) {
    match Register::from_addr(addr) {
        Some(Register::Nr12) => {
            let value = regs.read(addr);
            if ch.envelope_step == 0 && value & 0x07 != 0 {
                latch_envelope(ch, value);
                ch.envelope_counter = 0;
            }
        }
        Some(Register::Nr13) => {
            if ch.sweep_time != 0 {
                ch.raw_frequency = (ch.raw_frequency & 0x700) | regs.read(addr) as u16;
                ch.frequency = frequency_hz(ch.raw_frequency);
            }
        }
        _ => {}
    }
}

/// Run one sweep tick. Returns `false` if the sweep overflowed and stopped
/// the channel.
fn clock_sweep(ch: &mut ChannelState, timing: &Timing) -> bool {
    ch.sweep_counter += 1;
    if ch.sweep_counter < timing.sweep_period(ch.sweep_time) {
        return true;
    }
    ch.sweep_counter = 0;

    let delta = if ch.sweep_step >= 1 {
        ch.frequency / (2u32 << (ch.sweep_step - 1)) as f64
    } else {
        ch.frequency
    };

    match ch.sweep_direction {
        SweepDirection::Increase => {
            if equivalent_raw(ch.frequency + delta) >= 2048 {
                ch.volume = 0;
                ch.sweep_step = 0;
                ch.envelope_step = 0;
                ch.sweep_time = 0;
                ch.stop();
                debug!("channel 1 stopped: sweep overflow at {:.2} Hz", ch.frequency);
                return false;
            }
            ch.frequency += delta;
        }
        SweepDirection::Decrease => {
            if ch.frequency - delta >= 0.0 {
                ch.frequency -= delta;
            }
        }
    }
    true
}

/// Run one envelope tick
pub(crate) fn clock_envelope(ch: &mut ChannelState, timing: &Timing) {
    ch.envelope_counter += 1;
    if ch.envelope_counter < timing.envelope_period(ch.envelope_step) {
        return;
    }
    match ch.envelope_direction {
        EnvelopeDirection::Decrease if ch.volume >= 1 => ch.volume -= 1,
        EnvelopeDirection::Increase if ch.volume < 0x0F => ch.volume += 1,
        _ => {}
    }
    ch.envelope_counter = 0;
}

/// Handle an exhausted `sample_length` at the start of a sample slot.
///
/// Indefinite notes reload and keep playing (`true`); finite notes write
/// one final silent sample, silence the rest of `out` and stop (`false`).
pub(crate) fn reload_or_finish(
    ch: &mut ChannelState,
    id: ChannelId,
    timing: &Timing,
    out: &mut [i16],
) -> bool {
    if ch.duration.is_indefinite() {
        ch.sample_length = timing.samples_for(ch.duration);
        return true;
    }
    out.fill(SILENCE);
    ch.stop();
    debug!("{id} stopped: duration elapsed");
    false
}

/// Sample generator for a square channel
///
/// Writes exactly `out.len()` samples.
pub fn generate(ch: &mut ChannelState, id: ChannelId, timing: &Timing, out: &mut [i16]) {
    if !ch.playing {
        out.fill(SILENCE);
        return;
    }

    // Period is fixed for the whole request; sweep changes apply next call.
    let freq_samples = timing.samples_per_period(ch.frequency);

    for i in 0..out.len() {
        if ch.sample_length == 0 && !reload_or_finish(ch, id, timing, &mut out[i..]) {
            return;
        }

        ch.freq_dist += 1;

        if ch.sweep_time >= 1 && !clock_sweep(ch, timing) {
            out[i..].fill(SILENCE);
            return;
        }

        if ch.envelope_step >= 1 {
            clock_envelope(ch, timing);
        }

        if ch.freq_dist >= freq_samples {
            ch.freq_dist = 0;
        }

        out[i] = if ch.volume >= 1 && ch.duty.is_high(ch.freq_dist, freq_samples) {
            square_amplitude(ch.volume)
        } else {
            SILENCE
        };

        ch.sample_length -= 1;
    }
}
