//! Per-channel latched parameters and runtime counters.
//!
//! Trigger handlers write into a [`ChannelState`]; sample generators age its
//! counters. The record itself has no behaviour beyond construction.

use std::fmt;

use super::decode::DutyCycle;

/// Number of channel records (three active, noise reserved)
pub const NUM_CHANNELS: usize = 4;

/// Identifies one of the four sound channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    /// Channel 1: square wave with sweep
    Square1,
    /// Channel 2: square wave
    Square2,
    /// Channel 3: wavetable
    Wave,
    /// Channel 4: noise (no trigger or generator logic)
    Noise,
}

impl ChannelId {
    /// Channels that produce output
    pub const ACTIVE: [ChannelId; 3] = [ChannelId::Square1, ChannelId::Square2, ChannelId::Wave];

    /// Zero-based index into the channel array
    pub fn index(self) -> usize {
        match self {
            ChannelId::Square1 => 0,
            ChannelId::Square2 => 1,
            ChannelId::Wave => 2,
            ChannelId::Noise => 3,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {}", self.index() + 1)
    }
}

/// How long a note plays once triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteDuration {
    /// Length counter disabled: the note reloads forever
    Indefinite,
    /// Finite length in milliseconds
    Millis(u32),
}

impl NoteDuration {
    /// Milliseconds worth of samples loaded into `sample_length` for an
    /// indefinite note before it reloads
    pub const INDEFINITE_RELOAD_MS: u32 = 5000;

    /// Length in milliseconds used to size `sample_length`
    pub fn as_millis(self) -> u32 {
        match self {
            NoteDuration::Indefinite => Self::INDEFINITE_RELOAD_MS,
            NoteDuration::Millis(ms) => ms,
        }
    }

    /// True for the continuous sentinel
    pub fn is_indefinite(self) -> bool {
        matches!(self, NoteDuration::Indefinite)
    }
}

/// Envelope direction (NR12 bit 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeDirection {
    /// Volume steps down toward 0
    #[default]
    Decrease,
    /// Volume steps up toward 15
    Increase,
}

impl EnvelopeDirection {
    /// Decode from the envelope register
    pub fn from_register(value: u8) -> Self {
        if value & 0x08 != 0 {
            EnvelopeDirection::Increase
        } else {
            EnvelopeDirection::Decrease
        }
    }
}

/// Sweep direction (NR10 bit 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepDirection {
    /// Frequency rises each sweep step
    #[default]
    Increase,
    /// Frequency falls each sweep step
    Decrease,
}

impl SweepDirection {
    /// Decode from the sweep register
    pub fn from_register(value: u8) -> Self {
        if value & 0x08 != 0 {
            SweepDirection::Decrease
        } else {
            SweepDirection::Increase
        }
    }
}

/// Latched register parameters and runtime counters for one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelState {
    /// Playback frequency in Hz
    pub frequency: f64,
    /// 11-bit hardware frequency code (0-2047)
    pub raw_frequency: u16,
    /// Note length
    pub duration: NoteDuration,
    /// Remaining output samples before the note ends or reloads
    pub sample_length: u32,
    /// Whether the channel emits signal
    pub playing: bool,
    /// Amplitude level (0-15)
    pub volume: u8,
    /// High interval of the square wave, in eighths of a period
    pub duty: DutyCycle,
    /// Envelope direction
    pub envelope_direction: EnvelopeDirection,
    /// Envelope step length (0 = envelope off)
    pub envelope_step: u8,
    /// Samples since the last envelope step
    pub envelope_counter: u32,
    /// Sweep direction (channel 1)
    pub sweep_direction: SweepDirection,
    /// Sweep shift (channel 1)
    pub sweep_step: u8,
    /// Sweep time (channel 1, 0 = sweep off)
    pub sweep_time: u8,
    /// Samples since the last sweep step (channel 1)
    pub sweep_counter: u32,
    /// Right shift applied to each wave nibble (channel 3)
    pub wave_shift: u8,
    /// Output samples per wavetable entry (channel 3)
    pub wave_step: f64,
    /// Phase within the current waveform period, in samples
    pub freq_dist: u32,
}

impl ChannelState {
    /// Create a silent, untriggered channel
    pub fn new() -> Self {
        ChannelState {
            frequency: 0.0,
            raw_frequency: 0,
            duration: NoteDuration::Millis(0),
            sample_length: 0,
            playing: false,
            volume: 0,
            duty: DutyCycle::default(),
            envelope_direction: EnvelopeDirection::default(),
            envelope_step: 0,
            envelope_counter: 0,
            sweep_direction: SweepDirection::default(),
            sweep_step: 0,
            sweep_time: 0,
            sweep_counter: 0,
            wave_shift: 0,
            wave_step: 0.0,
            freq_dist: 0,
        }
    }

    /// Return to the power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Silence the channel until its next trigger
    pub(crate) fn stop(&mut self) {
        self.playing = false;
        self.sample_length = 0;
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}
