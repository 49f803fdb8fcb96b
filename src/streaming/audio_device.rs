//! Audio device integration using rodio
//!
//! Hands an [`ApuSource`] to the system's default output. From then on the
//! backend thread owns the engine and pulls samples at its own cadence.

use rodio::{OutputStream, Sink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::ApuSource;
use crate::apu::UpdateSource;
use crate::{ApuError, Result};

/// Audio playback device using rodio
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

impl AudioDevice {
    /// Open the default output device and start playing `source`
    ///
    /// # Errors
    ///
    /// Returns [`ApuError::AudioDeviceError`] if no device can be opened. The
    /// source is dropped in that case; callers wanting to keep running
    /// should render offline instead.
    pub fn new<S>(source: ApuSource<S>) -> Result<Self>
    where
        S: UpdateSource + Send + 'static,
    {
        let sample_rate = source.apu().config().sample_rate;
        let buffer_size = source.apu().config().buffer_size;
        let finished = source.finish_handle();

        let (stream, stream_handle) = OutputStream::try_default().map_err(|e| {
            ApuError::AudioDeviceError(format!("Failed to create audio stream: {e}"))
        })?;

        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| ApuError::AudioDeviceError(format!("Failed to create audio sink: {e}")))?;

        sink.append(source);

        tracing::info!(
            "Audio output started: {} Hz mono, {} sample buffers",
            sample_rate,
            buffer_size
        );

        Ok(AudioDevice {
            _stream: stream,
            sink,
            finished,
        })
    }

    /// Pause playback
    pub fn pause(&self) {
        self.sink.pause();
    }

    /// Resume playback
    pub fn play(&self) {
        self.sink.play();
    }

    /// Whether playback is paused
    pub fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    /// Stop pulling samples; the engine is dropped with the source
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.finish();
        self.sink.stop();
    }
}
