//! Game Boy Sound Register Definitions
//!
//! Names the memory-mapped audio registers (NR10-NR52 and wave RAM) and
//! provides the register store abstraction the engine reads from.

use bitflags::bitflags;
use std::fmt;

use super::channel_state::ChannelId;

/// First address of the sound register block (NR10)
pub const SOUND_REGS_START: u16 = 0xFF10;
/// Last address of the sound register block (end of wave RAM)
pub const SOUND_REGS_END: u16 = 0xFF3F;
/// First byte of the 16-byte wave RAM used by channel 3
pub const WAVE_RAM_START: u16 = 0xFF30;
/// Wave RAM length in bytes (32 packed 4-bit samples)
pub const WAVE_RAM_LEN: usize = 16;

/// Sound register address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Channel 1 Sweep - NR10
    Nr10 = 0xFF10,
    /// Channel 1 Duty / Length - NR11
    Nr11 = 0xFF11,
    /// Channel 1 Volume / Envelope - NR12
    Nr12 = 0xFF12,
    /// Channel 1 Frequency (low byte) - NR13
    Nr13 = 0xFF13,
    /// Channel 1 Frequency (high bits) / Trigger - NR14
    Nr14 = 0xFF14,
    /// Channel 2 Duty / Length - NR21
    Nr21 = 0xFF16,
    /// Channel 2 Volume / Envelope - NR22
    Nr22 = 0xFF17,
    /// Channel 2 Frequency (low byte) - NR23
    Nr23 = 0xFF18,
    /// Channel 2 Frequency (high bits) / Trigger - NR24
    Nr24 = 0xFF19,
    /// Channel 3 DAC Enable - NR30
    Nr30 = 0xFF1A,
    /// Channel 3 Length - NR31
    Nr31 = 0xFF1B,
    /// Channel 3 Output Level - NR32
    Nr32 = 0xFF1C,
    /// Channel 3 Frequency (low byte) - NR33
    Nr33 = 0xFF1D,
    /// Channel 3 Frequency (high bits) / Trigger - NR34
    Nr34 = 0xFF1E,
    /// Channel 4 Length - NR41
    Nr41 = 0xFF20,
    /// Channel 4 Volume / Envelope - NR42
    Nr42 = 0xFF21,
    /// Channel 4 Polynomial Counter - NR43
    Nr43 = 0xFF22,
    /// Channel 4 Trigger - NR44
    Nr44 = 0xFF23,
    /// Master Volume - NR50
    Nr50 = 0xFF24,
    /// Output Select - NR51
    Nr51 = 0xFF25,
    /// Sound On/Off - NR52
    Nr52 = 0xFF26,
}

impl Register {
    /// Convert a raw address to a named register
    ///
    /// Wave RAM and the unused gaps in the block return `None`.
    pub fn from_addr(addr: u16) -> Option<Self> {
        match addr {
            0xFF10 => Some(Register::Nr10),
            0xFF11 => Some(Register::Nr11),
            0xFF12 => Some(Register::Nr12),
            0xFF13 => Some(Register::Nr13),
            0xFF14 => Some(Register::Nr14),
            0xFF16 => Some(Register::Nr21),
            0xFF17 => Some(Register::Nr22),
            0xFF18 => Some(Register::Nr23),
            0xFF19 => Some(Register::Nr24),
            0xFF1A => Some(Register::Nr30),
            0xFF1B => Some(Register::Nr31),
            0xFF1C => Some(Register::Nr32),
            0xFF1D => Some(Register::Nr33),
            0xFF1E => Some(Register::Nr34),
            0xFF20 => Some(Register::Nr41),
            0xFF21 => Some(Register::Nr42),
            0xFF22 => Some(Register::Nr43),
            0xFF23 => Some(Register::Nr44),
            0xFF24 => Some(Register::Nr50),
            0xFF25 => Some(Register::Nr51),
            0xFF26 => Some(Register::Nr52),
            _ => None,
        }
    }

    /// Get the register address value
    pub fn addr(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Register::Nr10 => "NR10 (Channel 1 Sweep)",
            Register::Nr11 => "NR11 (Channel 1 Duty/Length)",
            Register::Nr12 => "NR12 (Channel 1 Envelope)",
            Register::Nr13 => "NR13 (Channel 1 Frequency Low)",
            Register::Nr14 => "NR14 (Channel 1 Frequency High/Trigger)",
            Register::Nr21 => "NR21 (Channel 2 Duty/Length)",
            Register::Nr22 => "NR22 (Channel 2 Envelope)",
            Register::Nr23 => "NR23 (Channel 2 Frequency Low)",
            Register::Nr24 => "NR24 (Channel 2 Frequency High/Trigger)",
            Register::Nr30 => "NR30 (Channel 3 DAC Enable)",
            Register::Nr31 => "NR31 (Channel 3 Length)",
            Register::Nr32 => "NR32 (Channel 3 Output Level)",
            Register::Nr33 => "NR33 (Channel 3 Frequency Low)",
            Register::Nr34 => "NR34 (Channel 3 Frequency High/Trigger)",
            Register::Nr41 => "NR41 (Channel 4 Length)",
            Register::Nr42 => "NR42 (Channel 4 Envelope)",
            Register::Nr43 => "NR43 (Channel 4 Polynomial Counter)",
            Register::Nr44 => "NR44 (Channel 4 Trigger)",
            Register::Nr50 => "NR50 (Master Volume)",
            Register::Nr51 => "NR51 (Output Select)",
            Register::Nr52 => "NR52 (Sound On/Off)",
        };
        write!(f, "{label} @ {:#06X}", self.addr())
    }
}

bitflags! {
    /// Output Select Register (NR51) bitflags
    ///
    /// Low nibble routes channels to the right terminal, high nibble to the left.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputSelect: u8 {
        /// Channel 1 to right output
        const CH1_RIGHT = 0x01;
        /// Channel 2 to right output
        const CH2_RIGHT = 0x02;
        /// Channel 3 to right output
        const CH3_RIGHT = 0x04;
        /// Channel 4 to right output
        const CH4_RIGHT = 0x08;
        /// Channel 1 to left output
        const CH1_LEFT = 0x10;
        /// Channel 2 to left output
        const CH2_LEFT = 0x20;
        /// Channel 3 to left output
        const CH3_LEFT = 0x40;
        /// Channel 4 to left output
        const CH4_LEFT = 0x80;
    }
}

impl OutputSelect {
    /// Create output flags from raw register value
    pub fn from_register(value: u8) -> Self {
        OutputSelect::from_bits_truncate(value)
    }

    /// A channel contributes to output when either side is selected
    pub fn is_enabled(&self, channel: ChannelId) -> bool {
        let right = 1u8 << channel.index();
        let left = right << 4;
        self.bits() & (right | left) != 0
    }
}

/// Register store the engine reads its parameters from.
///
/// Trigger handlers and the wave channel read through this interface rather
/// than any shared global, so the store can be a plain in-memory bank or an
/// adapter over an emulator's memory map.
pub trait RegisterStore {
    /// Read the current value at `addr`
    fn read(&self, addr: u16) -> u8;

    /// Store `value` at `addr`
    fn write(&mut self, addr: u16, value: u8);
}

/// In-memory register bank covering 0xFF10..=0xFF3F
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBank {
    regs: [u8; (SOUND_REGS_END - SOUND_REGS_START + 1) as usize],
}

impl RegisterBank {
    /// Create a bank with every register cleared
    pub fn new() -> Self {
        RegisterBank {
            regs: [0; (SOUND_REGS_END - SOUND_REGS_START + 1) as usize],
        }
    }

    /// Copy of the 16-byte wave RAM
    pub fn wave_ram(&self) -> [u8; WAVE_RAM_LEN] {
        let start = (WAVE_RAM_START - SOUND_REGS_START) as usize;
        let mut ram = [0u8; WAVE_RAM_LEN];
        ram.copy_from_slice(&self.regs[start..start + WAVE_RAM_LEN]);
        ram
    }

    /// Load the full wave RAM at once
    pub fn load_wave_ram(&mut self, samples: &[u8; WAVE_RAM_LEN]) {
        let start = (WAVE_RAM_START - SOUND_REGS_START) as usize;
        self.regs[start..start + WAVE_RAM_LEN].copy_from_slice(samples);
    }

    fn offset(addr: u16) -> Option<usize> {
        (SOUND_REGS_START..=SOUND_REGS_END)
            .contains(&addr)
            .then(|| (addr - SOUND_REGS_START) as usize)
    }
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterStore for RegisterBank {
    fn read(&self, addr: u16) -> u8 {
        Self::offset(addr).map_or(0xFF, |i| self.regs[i])
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let Some(i) = Self::offset(addr) {
            self.regs[i] = value;
        }
    }
}
