//! Game Boy Sound Emulation Domain
//!
//! Channel synthesis for the two square-wave channels and the wavetable
//! channel, plus the register surface and the write dispatcher feeding them.
//!
//! Implementation:
//! - `engine` - owns channel state and drives dispatch and generation
//! - `square` / `wave` - trigger handlers and sample generators
//! - `events` - register write handoff between threads

// Internal modules
pub mod channel_state;
pub mod decode;
pub mod dispatcher;
pub mod engine;
pub mod events;
pub mod registers;
pub mod square;
pub mod timing;
pub mod wave;

// Re-export public API
pub use channel_state::{ChannelId, ChannelState, NoteDuration};
pub use decode::{frequency_hz, DutyCycle, SILENCE};
pub use engine::{Apu, ChannelFrame};
pub use events::{
    register_channel, PendingSlot, RegisterEvent, RegisterEvents, RegisterWriter, UpdateSource,
};
pub use registers::{OutputSelect, Register, RegisterBank, RegisterStore};
pub use timing::Timing;
