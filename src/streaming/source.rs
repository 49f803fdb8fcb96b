//! Streaming sample source backed by the sound engine

use parking_lot::Mutex;
use rodio::Source;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::apu::{Apu, ChannelFrame, UpdateSource};
use crate::output::Mixer;

/// Counters for monitoring the audio timeline
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    /// Mixed samples produced
    pub samples_generated: usize,
    /// Register events applied
    pub events_applied: usize,
    /// Generation passes run
    pub buffers_filled: usize,
}

/// Mono i16 source that runs the engine one buffer at a time
pub struct ApuSource<S: UpdateSource> {
    apu: Apu,
    events: S,
    mixer: Mixer,
    frame: ChannelFrame,
    buffer: Vec<i16>,
    buffer_pos: usize,
    stats: Arc<Mutex<StreamStats>>,
    finished: Arc<AtomicBool>,
}

impl<S: UpdateSource> ApuSource<S> {
    /// Wrap an engine and the event source feeding it
    pub fn new(apu: Apu, events: S, mixer: Mixer) -> Self {
        let len = apu.config().buffer_size;
        ApuSource {
            apu,
            events,
            mixer,
            frame: ChannelFrame::new(len),
            buffer: vec![0; len],
            // Start by generating a fresh buffer
            buffer_pos: len,
            stats: Arc::new(Mutex::new(StreamStats::default())),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared statistics handle
    pub fn stats(&self) -> Arc<Mutex<StreamStats>> {
        Arc::clone(&self.stats)
    }

    /// Flag that ends the stream once set
    pub fn finish_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }

    /// Engine being driven
    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    /// Run one backend request: apply queued writes, then generate and mix
    /// a full buffer
    pub fn fill_buffer(&mut self) {
        let applied = self.apu.drain(&mut self.events);
        self.apu.generate(&mut self.frame);
        self.mixer.mix(&self.frame, &mut self.buffer);
        self.buffer_pos = 0;

        let mut stats = self.stats.lock();
        stats.events_applied += applied;
        stats.samples_generated += self.buffer.len();
        stats.buffers_filled += 1;
    }
}

impl<S: UpdateSource> Iterator for ApuSource<S> {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.finished.load(Ordering::Relaxed) {
            return None;
        }
        if self.buffer_pos >= self.buffer.len() {
            self.fill_buffer();
        }
        let sample = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        Some(sample)
    }
}

impl<S: UpdateSource> Source for ApuSource<S> {
    fn current_frame_len(&self) -> Option<usize> {
        let remaining = self.buffer.len().saturating_sub(self.buffer_pos);
        if remaining > 0 {
            Some(remaining)
        } else {
            // Next call generates a full buffer
            Some(self.buffer.len())
        }
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.apu.config().sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
