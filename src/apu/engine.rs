//! Sound engine: register mirror, dispatcher and the per-channel generators.

use tracing::debug;

use super::channel_state::{ChannelId, ChannelState, NUM_CHANNELS};
use super::decode::SILENCE;
use super::dispatcher::{route, Route};
use super::events::{RegisterEvent, UpdateSource};
use super::registers::{RegisterBank, RegisterStore};
use super::square::{self, SQUARE1, SQUARE2};
use super::timing::Timing;
use super::wave;
use crate::config::ApuConfig;
use crate::Result;

/// One generation pass worth of per-channel sample buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFrame {
    /// Channel 1 samples
    pub square1: Vec<i16>,
    /// Channel 2 samples
    pub square2: Vec<i16>,
    /// Channel 3 samples
    pub wave: Vec<i16>,
}

impl ChannelFrame {
    /// Allocate silent buffers of `len` samples
    pub fn new(len: usize) -> Self {
        ChannelFrame {
            square1: vec![SILENCE; len],
            square2: vec![SILENCE; len],
            wave: vec![SILENCE; len],
        }
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.square1.len()
    }

    /// True for a zero-length frame
    pub fn is_empty(&self) -> bool {
        self.square1.is_empty()
    }

    /// Resize every buffer to `len` samples
    pub fn resize(&mut self, len: usize) {
        self.square1.resize(len, SILENCE);
        self.square2.resize(len, SILENCE);
        self.wave.resize(len, SILENCE);
    }
}

/// Game Boy sound engine
///
/// Owns the channel state exclusively. Register writes arrive either directly
/// ([`Apu::write_register`]) or through an [`UpdateSource`] polled with
/// [`Apu::step`] / [`Apu::drain`].
#[derive(Debug, Clone)]
pub struct Apu<R: RegisterStore = RegisterBank> {
    config: ApuConfig,
    timing: Timing,
    regs: R,
    channels: [ChannelState; NUM_CHANNELS],
}

impl Apu<RegisterBank> {
    /// Create an engine with an empty register bank
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApuError::ConfigError`] if `config` fails validation.
    pub fn new(config: ApuConfig) -> Result<Self> {
        Self::with_store(config, RegisterBank::new())
    }
}

impl<R: RegisterStore> Apu<R> {
    /// Create an engine reading from an existing register store
    pub fn with_store(config: ApuConfig, regs: R) -> Result<Self> {
        config.validate()?;
        Ok(Apu {
            timing: Timing::new(config.sample_rate),
            config,
            regs,
            channels: std::array::from_fn(|_| ChannelState::new()),
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &ApuConfig {
        &self.config
    }

    /// Register store
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Read-only view of one channel
    pub fn channel(&self, id: ChannelId) -> &ChannelState {
        &self.channels[id.index()]
    }

    /// Silence every channel. Registers are left untouched.
    pub fn reset(&mut self) {
        self.channels.iter_mut().for_each(ChannelState::reset);
    }

    /// Store a register write and dispatch it immediately
    pub fn write_register(&mut self, addr: u16, value: u8) {
        self.apply(RegisterEvent::new(addr, value));
    }

    /// Store and dispatch one register event
    pub fn apply(&mut self, event: RegisterEvent) {
        self.regs.write(event.address, event.value);
        self.dispatch(event.address);
    }

    /// Consume at most one pending write. Returns whether one was handled.
    pub fn step<S: UpdateSource + ?Sized>(&mut self, source: &mut S) -> bool {
        match source.take_pending() {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Consume every pending write in order. Returns how many were handled.
    pub fn drain<S: UpdateSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut handled = 0;
        while self.step(source) {
            handled += 1;
        }
        handled
    }

    /// Route a write to `addr` (already in the store) to its handler
    fn dispatch(&mut self, addr: u16) {
        let Some(target) = route(addr) else {
            return;
        };
        debug!("dispatch {addr:#06X} -> {target:?}");

        let timing = self.timing;
        match target {
            Route::Square1Update => {
                square::update_square1(&mut self.channels[0], addr, &self.regs);
            }
            Route::Trigger(ChannelId::Square1) => {
                square::trigger(&mut self.channels[0], &SQUARE1, &self.regs, &timing);
            }
            Route::Trigger(ChannelId::Square2) => {
                square::trigger(&mut self.channels[1], &SQUARE2, &self.regs, &timing);
            }
            Route::Trigger(ChannelId::Wave) => {
                wave::trigger(&mut self.channels[2], &self.regs);
            }
            // No noise trigger exists; the channel stays off.
            Route::Trigger(ChannelId::Noise) => {}
        }
    }

    /// Run one channel's sample generator over `out`
    pub fn generate_channel(&mut self, id: ChannelId, out: &mut [i16]) {
        let timing = self.timing;
        let ch = &mut self.channels[id.index()];
        match id {
            ChannelId::Square1 | ChannelId::Square2 => square::generate(ch, id, &timing, out),
            ChannelId::Wave => wave::generate(ch, &self.regs, &timing, out),
            ChannelId::Noise => out.fill(SILENCE),
        }
    }

    /// Fill all three active channel buffers
    pub fn generate(&mut self, frame: &mut ChannelFrame) {
        self.generate_channel(ChannelId::Square1, &mut frame.square1);
        self.generate_channel(ChannelId::Square2, &mut frame.square2);
        self.generate_channel(ChannelId::Wave, &mut frame.wave);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apu::events::{register_channel, PendingSlot};
    use crate::apu::registers::Register;

    fn apu() -> Apu {
        Apu::new(ApuConfig::default()).unwrap()
    }

    #[test]
    fn test_starts_silent() {
        let mut apu = apu();
        let mut frame = ChannelFrame::new(256);
        apu.generate(&mut frame);
        assert!(frame.square1.iter().all(|&s| s == SILENCE));
        assert!(frame.square2.iter().all(|&s| s == SILENCE));
        assert!(frame.wave.iter().all(|&s| s == SILENCE));
        for id in ChannelId::ACTIVE {
            assert!(!apu.channel(id).playing);
        }
    }

    #[test]
    fn test_write_register_triggers() {
        let mut apu = apu();
        apu.write_register(Register::Nr51.addr(), 0xFF);
        apu.write_register(Register::Nr22.addr(), 0xF0);
        assert!(!apu.channel(ChannelId::Square2).playing);
        apu.write_register(Register::Nr24.addr(), 0x87);
        assert!(apu.channel(ChannelId::Square2).playing);
        assert_eq!(apu.channel(ChannelId::Square2).volume, 15);
        assert!(!apu.channel(ChannelId::Square1).playing);
    }

    #[test]
    fn test_step_consumes_one_event() {
        let mut apu = apu();
        let (writer, mut events) = register_channel(8);
        writer.write(Register::Nr51.addr(), 0xFF).unwrap();
        writer.write(Register::Nr14.addr(), 0x80).unwrap();

        assert!(apu.step(&mut events));
        assert!(!apu.channel(ChannelId::Square1).playing);
        assert!(apu.step(&mut events));
        assert!(apu.channel(ChannelId::Square1).playing);
        assert!(!apu.step(&mut events));
    }

    #[test]
    fn test_drain_applies_in_write_order() {
        let mut apu = apu();
        let (writer, mut events) = register_channel(8);
        writer.write(Register::Nr51.addr(), 0xFF).unwrap();
        writer.write(Register::Nr12.addr(), 0x30).unwrap();
        writer.write(Register::Nr14.addr(), 0x80).unwrap();
        writer.write(Register::Nr12.addr(), 0x90).unwrap();
        assert_eq!(apu.drain(&mut events), 4);
        assert_eq!(apu.channel(ChannelId::Square1).volume, 3);
        assert_eq!(apu.registers().read(Register::Nr12.addr()), 0x90);
    }

    #[test]
    fn test_pending_slot_loses_overwritten_trigger() {
        let mut apu = apu();
        apu.write_register(Register::Nr51.addr(), 0xFF);
        let poster = PendingSlot::new();
        let mut slot = poster.clone();
        poster.post(Register::Nr14.addr(), 0x80);
        poster.post(Register::Nr24.addr(), 0x80);
        assert!(apu.step(&mut slot));
        assert!(!apu.step(&mut slot));
        assert!(!apu.channel(ChannelId::Square1).playing);
        assert!(apu.channel(ChannelId::Square2).playing);
    }

    #[test]
    fn test_noise_channel_is_silent() {
        let mut apu = apu();
        apu.write_register(Register::Nr51.addr(), 0xFF);
        apu.write_register(Register::Nr42.addr(), 0xF0);
        apu.write_register(Register::Nr44.addr(), 0x80);
        let mut out = [0i16; 32];
        apu.generate_channel(ChannelId::Noise, &mut out);
        assert!(out.iter().all(|&s| s == SILENCE));
        assert!(!apu.channel(ChannelId::Noise).playing);
    }

    #[test]
    fn test_reset_stops_channels() {
        let mut apu = apu();
        apu.write_register(Register::Nr51.addr(), 0xFF);
        apu.write_register(Register::Nr34.addr(), 0x80);
        assert!(apu.channel(ChannelId::Wave).playing);
        apu.reset();
        assert!(!apu.channel(ChannelId::Wave).playing);
        assert_eq!(apu.registers().read(Register::Nr51.addr()), 0xFF);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ApuConfig {
            sample_rate: 100,
            ..ApuConfig::default()
        };
        assert!(Apu::new(config).is_err());
    }
}
