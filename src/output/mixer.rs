//! Channel Output Mixer
//!
//! Sums the three channel buffers into one mono stream. Each channel is
//! attenuated by a fixed `8/128` (one sixteenth) and the running sum
//! saturates after every channel is added.
//!
//! Silent channels sit at the floor value, so an idle engine mixes to a
//! constant negative offset rather than zero.

use crate::apu::{ChannelFrame, ChannelId};

/// Full-scale mix volume
pub const MIX_MAX_VOLUME: i32 = 128;

/// Per-channel mix volume (1/16 of full scale)
pub const CHANNEL_MIX_VOLUME: i32 = MIX_MAX_VOLUME / 16;

/// Fixed-gain mixer for the three active channels
#[derive(Debug, Clone, Default)]
pub struct Mixer {
    muted: [bool; 3],
}

impl Mixer {
    /// Create a mixer with every channel audible
    pub fn new() -> Self {
        Self::default()
    }

    /// Mute or unmute a channel. The noise channel is ignored.
    pub fn set_channel_mute(&mut self, channel: ChannelId, mute: bool) {
        if let Some(slot) = self.muted.get_mut(channel.index()) {
            *slot = mute;
        }
    }

    /// Whether a channel is muted
    pub fn is_channel_muted(&self, channel: ChannelId) -> bool {
        self.muted.get(channel.index()).copied().unwrap_or(false)
    }

    /// Attenuate one channel sample
    #[inline]
    fn attenuate(sample: i16) -> i32 {
        sample as i32 * CHANNEL_MIX_VOLUME / MIX_MAX_VOLUME
    }

    #[inline]
    fn accumulate(dst: &mut [i16], src: &[i16]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            let mixed = *d as i32 + Self::attenuate(s);
            *d = mixed.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        }
    }

    /// Mix `frame` into `out`, which is cleared first
    ///
    /// Mixes `min(out.len(), frame.len())` samples; any excess in `out` is
    /// left at zero.
    pub fn mix(&self, frame: &ChannelFrame, out: &mut [i16]) {
        out.fill(0);
        let sources = [&frame.square1, &frame.square2, &frame.wave];
        for (muted, src) in self.muted.iter().zip(sources) {
            if !muted {
                Self::accumulate(out, src);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apu::SILENCE;

    #[test]
    fn test_silent_frame_mixes_to_floor_offset() {
        let frame = ChannelFrame::new(8);
        let mut out = [1i16; 8];
        Mixer::new().mix(&frame, &mut out);
        assert!(out.iter().all(|&s| s == -2048 * 3));
    }

    #[test]
    fn test_attenuation_truncates_toward_zero() {
        let mut frame = ChannelFrame::new(1);
        frame.square1[0] = 2047 * 8;
        frame.square2[0] = 15;
        frame.wave[0] = -15;
        let mut out = [0i16; 1];
        Mixer::new().mix(&frame, &mut out);
        assert_eq!(out[0], 1023);
    }

    #[test]
    fn test_muted_channel_is_skipped() {
        let mut mixer = Mixer::new();
        mixer.set_channel_mute(ChannelId::Wave, true);
        assert!(mixer.is_channel_muted(ChannelId::Wave));
        assert!(!mixer.is_channel_muted(ChannelId::Square1));

        let mut frame = ChannelFrame::new(2);
        frame.wave.fill(i16::MAX);
        frame.square1.fill(0);
        frame.square2.fill(0);
        let mut out = [0i16; 2];
        mixer.mix(&frame, &mut out);
        assert_eq!(out, [0, 0]);
    }

    #[test]
    fn test_short_output_buffer() {
        let frame = ChannelFrame::new(4);
        let mut out = [0i16; 2];
        Mixer::new().mix(&frame, &mut out);
        assert_eq!(out, [SILENCE / 16 * 3; 2]);
    }
}
