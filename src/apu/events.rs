//! Register write handoff from the emulation timeline to the audio timeline.
//!
//! Two [`UpdateSource`] implementations are provided:
//! - [`RegisterEvents`]: bounded FIFO, every write delivered once and in order
//! - [`PendingSlot`]: single-slot mailbox; a second write before the slot is
//!   consumed replaces the first

use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use tracing::warn;

use crate::{ApuError, Result};

/// A single register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEvent {
    /// Register address
    pub address: u16,
    /// Value written
    pub value: u8,
}

impl RegisterEvent {
    /// Create an event for a write of `value` to `address`
    pub fn new(address: u16, value: u8) -> Self {
        RegisterEvent { address, value }
    }
}

/// Source of pending register writes polled by the engine
pub trait UpdateSource {
    /// Take the next pending write, if any
    fn take_pending(&mut self) -> Option<RegisterEvent>;
}

/// Create a bounded register event channel
///
/// The writer half belongs to the emulation thread, the reader half to
/// whatever owns the engine.
pub fn register_channel(capacity: usize) -> (RegisterWriter, RegisterEvents) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    (RegisterWriter { tx }, RegisterEvents { rx })
}

/// Producer half of the register event channel
#[derive(Debug, Clone)]
pub struct RegisterWriter {
    tx: SyncSender<RegisterEvent>,
}

impl RegisterWriter {
    /// Queue a register write without blocking
    ///
    /// # Errors
    ///
    /// - [`ApuError::EventQueueFull`] if the consumer has fallen behind
    /// - [`ApuError::Disconnected`] if the consumer was dropped
    pub fn write(&self, address: u16, value: u8) -> Result<()> {
        self.send(RegisterEvent::new(address, value))
    }

    /// Queue a prepared event without blocking
    pub fn send(&self, event: RegisterEvent) -> Result<()> {
        self.tx.try_send(event).map_err(|err| match err {
            TrySendError::Full(event) => {
                warn!("register event queue full, dropping write to {:#06X}", event.address);
                ApuError::EventQueueFull {
                    address: event.address,
                }
            }
            TrySendError::Disconnected(_) => ApuError::Disconnected,
        })
    }
}

/// Consumer half of the register event channel
#[derive(Debug)]
pub struct RegisterEvents {
    rx: Receiver<RegisterEvent>,
}

impl UpdateSource for RegisterEvents {
    fn take_pending(&mut self) -> Option<RegisterEvent> {
        self.rx.try_recv().ok()
    }
}

/// Single-slot pending update mailbox
///
/// Cloned handles share the slot, so one can be posted to from the emulation
/// thread while another is polled by the engine.
#[derive(Debug, Clone, Default)]
pub struct PendingSlot {
    slot: Arc<Mutex<Option<RegisterEvent>>>,
}

impl PendingSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a write, returning the unconsumed write it replaced
    pub fn post(&self, address: u16, value: u8) -> Option<RegisterEvent> {
        let lost = self.slot.lock().replace(RegisterEvent::new(address, value));
        if let Some(lost) = lost {
            warn!(
                "pending register update {:#06X} overwritten by {:#06X} before dispatch",
                lost.address, address
            );
        }
        lost
    }

    /// Whether a write is waiting
    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl UpdateSource for PendingSlot {
    fn take_pending(&mut self) -> Option<RegisterEvent> {
        self.slot.lock().take()
    }
}
