//! Register field decoders shared by the channel handlers.
//!
//! Pure functions from raw register bytes to channel parameters.

use super::channel_state::NoteDuration;

/// CPU clock the frequency formula is expressed against
pub const GB_CLOCK_HZ: f64 = 4_194_304.0;

/// Largest 11-bit frequency code
pub const MAX_RAW_FREQUENCY: u16 = 0x7FF;

/// Output value for silence and for the low half of a square wave
pub const SILENCE: i16 = i16::MIN;

/// Square-wave amplitude per volume step: `(i16::MAX / 16) * volume`
pub const SQUARE_AMPLITUDE_STEP: i16 = i16::MAX / 16;

/// Linear 4-bit to 16-bit scale for wave nibbles (`65535 / 15`)
pub const WAVE_NIBBLE_SCALE: i32 = 4369;

/// Square-wave high interval in eighths of one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycle {
    /// First eighth of the high interval
    pub start: u8,
    /// Eighth where the high interval ends (exclusive)
    pub end: u8,
}

impl DutyCycle {
    /// Decode the 2-bit duty selector (bits 7-6 of NRx1)
    pub fn from_selector(selector: u8) -> Self {
        let (start, end) = match selector & 0x03 {
            0 => (1, 2),
            1 => (0, 2),
            2 => (0, 4),
            _ => (2, 8),
        };
        DutyCycle { start, end }
    }

    /// Decode straight from the duty/length register
    pub fn from_register(value: u8) -> Self {
        Self::from_selector(value >> 6)
    }

    /// Whether `phase` falls in the high interval of a `period`-sample wave
    #[inline]
    pub fn is_high(&self, phase: u32, period: u32) -> bool {
        let eighth = period / 8;
        phase >= eighth * self.start as u32 && phase < eighth * self.end as u32
    }
}

impl Default for DutyCycle {
    /// Power-on value (one to five eighths)
    fn default() -> Self {
        DutyCycle { start: 1, end: 5 }
    }
}

/// Combine NRx4 bits 2-0 and NRx3 into the 11-bit frequency code
#[inline]
pub fn raw_frequency(hi: u8, lo: u8) -> u16 {
    (((hi as u16) << 8) | lo as u16) & MAX_RAW_FREQUENCY
}

/// Square channel frequency in Hz: `4194304 / (32 * (2048 - raw))`
#[inline]
pub fn frequency_hz(raw: u16) -> f64 {
    let raw = raw & MAX_RAW_FREQUENCY;
    GB_CLOCK_HZ / (32.0 * (2048 - raw as u32) as f64)
}

/// Equivalent 11-bit code for a frequency, truncating toward the hardware
/// grid. Frequencies above 131072 Hz map to 2048, one past the range.
#[inline]
pub fn equivalent_raw(frequency: f64) -> u32 {
    let period = (GB_CLOCK_HZ / 32.0 / frequency).floor();
    if !(period > 0.0) {
        return 2048;
    }
    2048u32.saturating_sub(period.min(2048.0) as u32)
}

/// Square channel note length from NRx4 (length-enable bit 6) and NRx1
/// (length bits 5-0)
pub fn square_duration(trigger_reg: u8, length_reg: u8) -> NoteDuration {
    if trigger_reg & 0x40 == 0 {
        return NoteDuration::Indefinite;
    }
    let length = (length_reg & 0x3F) as u32;
    NoteDuration::Millis(1000 / (256 / (64 - length)))
}

/// Wave channel note length from NR34 (length-enable bit 6) and the 8-bit
/// NR31 length
pub fn wave_duration(trigger_reg: u8, length_reg: u8) -> NoteDuration {
    if trigger_reg & 0x40 == 0 {
        return NoteDuration::Indefinite;
    }
    NoteDuration::Millis((1000 / 256) * (256 - length_reg as u32))
}

/// Wave nibble right-shift from NR32 output level bits 6-5
pub fn wave_shift(level_reg: u8) -> u8 {
    match (level_reg >> 5) & 0x03 {
        0 => 4,
        1 => 0,
        2 => 1,
        _ => 2,
    }
}

/// Fetch wavetable entry `index` (0-31) from 16 packed bytes
///
/// Even entries live in the high nibble, odd entries in the low nibble.
#[inline]
pub fn wave_nibble(wave_ram: &[u8; 16], index: usize) -> u8 {
    let byte = wave_ram[(index % 32) / 2];
    if index % 2 == 0 {
        byte >> 4
    } else {
        byte & 0x0F
    }
}

/// Scale a (shifted) 4-bit wave value to a signed 16-bit sample
#[inline]
pub fn scale_wave_nibble(nibble: u8) -> i16 {
    (SILENCE as i32 + WAVE_NIBBLE_SCALE * (nibble & 0x0F) as i32) as i16
}

/// Square-wave high amplitude for a volume level
#[inline]
pub fn square_amplitude(volume: u8) -> i16 {
    SQUARE_AMPLITUDE_STEP * volume.min(15) as i16
}
