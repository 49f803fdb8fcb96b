//! Sample-rate relative cadences.
//!
//! The engine has no CPU clock; envelope, sweep and note lengths are all
//! counted in output samples derived from the configured sample rate.

use super::channel_state::NoteDuration;

/// Envelope steps run at 64 Hz
const ENVELOPE_RATE_HZ: u32 = 64;
/// Sweep steps run at 128 Hz
const SWEEP_RATE_HZ: u32 = 128;

/// Cadence calculator for one output sample rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    sample_rate: u32,
}

impl Timing {
    /// Create timing for `sample_rate` Hz
    pub fn new(sample_rate: u32) -> Self {
        Timing { sample_rate }
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples covered by a note of `duration`
    pub fn samples_for(&self, duration: NoteDuration) -> u32 {
        (duration.as_millis() as u64 * self.sample_rate as u64 / 1000) as u32
    }

    /// Samples between envelope steps for envelope step length `step`
    pub fn envelope_period(&self, step: u8) -> u32 {
        (self.sample_rate / ENVELOPE_RATE_HZ) * step as u32
    }

    /// Samples between sweep steps for sweep time `time`
    pub fn sweep_period(&self, time: u8) -> u32 {
        (self.sample_rate / SWEEP_RATE_HZ) * time as u32
    }

    /// Samples in one waveform period, truncated
    ///
    /// A zero, negative or non-finite frequency has no period and yields 0,
    /// which leaves the duty cycle without a high interval.
    pub fn samples_per_period(&self, frequency: f64) -> u32 {
        if !(frequency > 0.0 && frequency.is_finite()) {
            return 0;
        }
        (self.sample_rate as f64 / frequency) as u32
    }
}
