//! Real-time audio output
//!
//! The audio backend pulls samples from an [`ApuSource`], which owns the
//! engine: it drains pending register events, generates one buffer per
//! channel and mixes them. The emulation thread only ever sends events.

pub mod audio_device;
pub mod source;

pub use audio_device::AudioDevice;
pub use source::{ApuSource, StreamStats};
