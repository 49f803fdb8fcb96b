//! Game Boy Sound Emulator
//!
//! An emulator of the Game Boy's programmable sound generator. Writes to the
//! memory-mapped audio registers become a stream of signed 16-bit samples,
//! reproducing the two square-wave channels and the wavetable channel
//! sample-for-sample.
//!
//! # Features
//! - Square channels with duty cycle, volume envelope and (channel 1) sweep
//! - Wavetable channel with live register updates
//! - Sample-rate relative timing for envelope, sweep and note length
//! - Ordered register event handoff between emulation and audio threads
//! - Fixed-gain mixer, offline rendering and WAV export
//!
//! # Crate feature flags
//! - `streaming` (opt-in): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ## Core engine only
//! ```no_run
//! use gbapu::{Apu, ApuConfig, ChannelFrame};
//! let mut apu = Apu::new(ApuConfig::default()).unwrap();
//! apu.write_register(0xFF25, 0xFF); // Route all channels to output
//! apu.write_register(0xFF11, 0x80); // 50% duty
//! apu.write_register(0xFF12, 0x80); // Volume 8, no envelope
//! apu.write_register(0xFF13, 0x00);
//! apu.write_register(0xFF14, 0x87); // Trigger
//! let mut frame = ChannelFrame::new(2048);
//! apu.generate(&mut frame);
//! ```
//!
//! ## Cross-thread register writes
//! ```no_run
//! use gbapu::{register_channel, output, Apu, ApuConfig};
//! let config = ApuConfig::default();
//! let (writer, mut events) = register_channel(config.event_queue_capacity);
//! std::thread::spawn(move || {
//!     writer.write(0xFF25, 0xFF).unwrap();
//!     writer.write(0xFF1E, 0x80).unwrap();
//! });
//! let mut apu = Apu::new(config).unwrap();
//! let samples = output::render(&mut apu, &mut events, &output::Mixer::new(), 44_100);
//! ```

#![warn(missing_docs)]

// Domain modules
pub mod apu; // Channel synthesis (core)
pub mod config; // Engine configuration
pub mod output; // Mixing & WAV export
#[cfg(feature = "streaming")]
pub mod streaming; // Audio Output & Streaming

/// Error types for sound engine operations
#[derive(thiserror::Error, Debug)]
pub enum ApuError {
    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// Register event queue is full
    #[error("Register event queue full (write to {address:#06X} dropped)")]
    EventQueueFull {
        /// Address of the dropped write
        address: u16,
    },

    /// The audio side hung up
    #[error("Register event consumer disconnected")]
    Disconnected,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for ApuError {
    /// Converts a String into `ApuError::Other`.
    ///
    /// Prefer a specific variant where one applies.
    fn from(msg: String) -> Self {
        ApuError::Other(msg)
    }
}

impl From<&str> for ApuError {
    /// Converts a string slice into `ApuError::Other`.
    fn from(msg: &str) -> Self {
        ApuError::Other(msg.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ApuError>;

// Public API exports
pub use apu::{
    register_channel, Apu, ChannelFrame, ChannelId, ChannelState, PendingSlot, Register,
    RegisterBank, RegisterEvent, RegisterStore, RegisterWriter, UpdateSource,
};
pub use config::ApuConfig;
pub use output::{export_to_wav, Mixer};
#[cfg(feature = "streaming")]
pub use streaming::{ApuSource, AudioDevice};
