//! Mixed Output & Export
//!
//! The consumer side of the engine: mixing the per-channel buffers and
//! rendering the result offline.

pub mod mixer;
pub mod wav;

pub use mixer::Mixer;
pub use wav::export_to_wav;

use crate::apu::{Apu, ChannelFrame, RegisterStore, UpdateSource};

/// Render `count` mixed samples offline
///
/// Works in the engine's configured buffer size, draining `events` before
/// each chunk the same way the streaming source does.
pub fn render<R, S>(apu: &mut Apu<R>, events: &mut S, mixer: &Mixer, count: usize) -> Vec<i16>
where
    R: RegisterStore,
    S: UpdateSource + ?Sized,
{
    let chunk = apu.config().buffer_size;
    let mut frame = ChannelFrame::new(chunk);
    let mut output = vec![0i16; count];

    for block in output.chunks_mut(chunk) {
        apu.drain(events);
        frame.resize(block.len());
        apu.generate(&mut frame);
        mixer.mix(&frame, block);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apu::{register_channel, Register};
    use crate::config::ApuConfig;

    #[test]
    fn test_render_exact_length_and_events() {
        let mut apu = Apu::new(ApuConfig::low_latency(44_100)).unwrap();
        let (writer, mut events) = register_channel(16);
        writer.write(Register::Nr51.addr(), 0xFF).unwrap();
        writer.write(Register::Nr22.addr(), 0xF0).unwrap();
        writer.write(Register::Nr24.addr(), 0x87).unwrap();

        let samples = render(&mut apu, &mut events, &Mixer::new(), 1300);
        assert_eq!(samples.len(), 1300);
        assert!(samples.iter().any(|&s| s > -2048 * 3));
    }
}
