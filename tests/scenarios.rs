//! End-to-end register programming scenarios

use std::thread;

use gbapu::apu::decode::{SILENCE, SQUARE_AMPLITUDE_STEP};
use gbapu::apu::registers::WAVE_RAM_START;
use gbapu::{
    output, register_channel, Apu, ApuConfig, ChannelFrame, ChannelId, Mixer, PendingSlot,
    Register, RegisterStore,
};

const RATE: u32 = 44_100;

fn apu() -> Apu {
    Apu::new(ApuConfig::default()).unwrap()
}

fn write_all(apu: &mut Apu, writes: &[(Register, u8)]) {
    for (reg, value) in writes {
        apu.write_register(reg.addr(), *value);
    }
}

/// NR13/NR14 bytes for raw code 1750 (~440 Hz), no length
const A440_LO: u8 = 0xD6;
const A440_HI: u8 = 0x06;

fn square1_440(nr10: u8, nr11: u8, nr12: u8, nr14_flags: u8) -> Apu {
    let mut apu = apu();
    write_all(
        &mut apu,
        &[
            (Register::Nr51, 0xFF),
            (Register::Nr10, nr10),
            (Register::Nr11, nr11),
            (Register::Nr12, nr12),
            (Register::Nr13, A440_LO),
            (Register::Nr14, nr14_flags | A440_HI),
        ],
    );
    apu
}

#[test]
fn test_440hz_half_duty_tenth_of_second() {
    let mut apu = square1_440(0x00, 0x80, 0x80, 0x80);
    let mut out = vec![0i16; 4410];
    apu.generate_channel(ChannelId::Square1, &mut out);

    let high = SQUARE_AMPLITUDE_STEP * 8;
    assert_eq!(high, 16_376);

    // 44100 / 439.83 Hz truncates to 100 samples per period; the high interval
    // covers four eighths of twelve samples each.
    for (i, &sample) in out.iter().enumerate() {
        let phase = (i + 1) % 100;
        let expected = if phase < 48 { high } else { SILENCE };
        assert_eq!(sample, expected, "sample {i} (phase {phase})");
    }

    let rising_edges = out.windows(2).filter(|w| w[0] == SILENCE && w[1] == high).count();
    assert_eq!(rising_edges, 44);
}

#[test]
fn test_indefinite_note_survives_many_requests() {
    let mut apu = square1_440(0x00, 0x80, 0x80, 0x80);
    let mut frame = ChannelFrame::new(2048);

    // Past the 5000 ms reload window several times
    for _ in 0..(RATE as usize * 12 / 2048) {
        apu.generate(&mut frame);
    }
    assert!(apu.channel(ChannelId::Square1).playing);
    assert!(frame.square1.iter().any(|&s| s > 0));
}

#[test]
fn test_finite_note_falls_silent_mid_buffer() {
    // Length 63: 1000 / (256 / 1) = 3 ms = 132 samples
    let mut apu = square1_440(0x00, 0x80 | 0x3F, 0x80, 0xC0);
    let mut out = vec![0i16; 512];
    apu.generate_channel(ChannelId::Square1, &mut out);

    assert!(out[..132].iter().any(|&s| s > 0));
    assert!(out[132..].iter().all(|&s| s == SILENCE));
    assert!(!apu.channel(ChannelId::Square1).playing);

    apu.generate_channel(ChannelId::Square1, &mut out);
    assert!(out.iter().all(|&s| s == SILENCE));
}

#[test]
fn test_envelope_steps_every_689_samples() {
    // Volume 8, decreasing, step 1: one step per (44100 / 64) * 1 samples
    let mut apu = square1_440(0x00, 0x80, 0x81, 0x80);
    let mut out = vec![0i16; 2100];
    apu.generate_channel(ChannelId::Square1, &mut out);

    let highs = |range: std::ops::Range<usize>| -> Vec<i16> {
        let mut v: Vec<i16> = out[range].iter().copied().filter(|&s| s != SILENCE).collect();
        v.dedup();
        v
    };
    assert_eq!(highs(0..688), vec![SQUARE_AMPLITUDE_STEP * 8]);
    assert_eq!(highs(688..1377), vec![SQUARE_AMPLITUDE_STEP * 7]);
    assert_eq!(highs(1377..2066), vec![SQUARE_AMPLITUDE_STEP * 6]);
}

#[test]
fn test_sweep_disabled_holds_frequency() {
    let mut apu = square1_440(0x00, 0x80, 0x80, 0x80);
    let start = apu.channel(ChannelId::Square1).frequency;
    let mut frame = ChannelFrame::new(4096);
    for _ in 0..20 {
        apu.generate(&mut frame);
    }
    assert_eq!(apu.channel(ChannelId::Square1).frequency, start);
}

#[test]
fn test_sweep_up_overflows_and_stops() {
    // Sweep time 1, increase, step 1: frequency grows by half each 344 samples
    let mut apu = square1_440(0x11, 0x80, 0x80, 0x80);
    let mut out = vec![0i16; RATE as usize];
    apu.generate_channel(ChannelId::Square1, &mut out);

    let ch = apu.channel(ChannelId::Square1);
    assert!(!ch.playing);
    assert_eq!(ch.volume, 0);
    assert_eq!(ch.sweep_time, 0);
    assert!(out[RATE as usize / 2..].iter().all(|&s| s == SILENCE));
}

#[test]
fn test_nr51_gates_trigger() {
    let mut apu = apu();
    write_all(
        &mut apu,
        &[
            (Register::Nr51, 0xEE),
            (Register::Nr12, 0xF0),
            (Register::Nr14, 0x87),
        ],
    );
    assert!(!apu.channel(ChannelId::Square1).playing);

    // Left-terminal bit alone is enough
    write_all(&mut apu, &[(Register::Nr51, 0x10), (Register::Nr14, 0x87)]);
    assert!(apu.channel(ChannelId::Square1).playing);
}

fn wave_apu(fill: u8, nr32: u8) -> Apu {
    let mut apu = apu();
    apu.write_register(Register::Nr51.addr(), 0xFF);
    for i in 0..16 {
        apu.write_register(WAVE_RAM_START + i, fill);
    }
    write_all(
        &mut apu,
        &[
            (Register::Nr30, 0x80),
            (Register::Nr32, nr32),
            (Register::Nr33, 0x00),
            (Register::Nr34, 0x84),
        ],
    );
    apu
}

#[test]
fn test_wave_levels_scale_nibbles() {
    let cases = [(0x20, 32_767i16), (0x40, -2_185), (0x60, -19_661), (0x00, i16::MIN)];
    for (nr32, expected) in cases {
        let mut apu = wave_apu(0xFF, nr32);
        let mut out = vec![0i16; 1024];
        apu.generate_channel(ChannelId::Wave, &mut out);
        assert!(
            out.iter().all(|&s| s == expected),
            "NR32={nr32:#04X} expected {expected}"
        );
    }
}

#[test]
fn test_wave_level_change_applies_next_request() {
    let mut apu = wave_apu(0xFF, 0x20);
    let mut out = vec![0i16; 256];
    apu.generate_channel(ChannelId::Wave, &mut out);
    assert_eq!(out[255], 32_767);

    // Not a trigger: no dispatch, but the level is re-read on the next call
    apu.write_register(Register::Nr32.addr(), 0x60);
    apu.generate_channel(ChannelId::Wave, &mut out);
    assert!(out.iter().all(|&s| s == -19_661));
}

#[test]
fn test_idle_mix_is_constant_offset() {
    let mut apu = apu();
    let (_writer, mut events) = register_channel(8);
    let samples = output::render(&mut apu, &mut events, &Mixer::new(), 3000);
    assert!(samples.iter().all(|&s| s == -2048 * 3));
}

#[test]
fn test_cross_thread_writes_apply_in_order() {
    let config = ApuConfig::default();
    let (writer, mut events) = register_channel(config.event_queue_capacity);

    let emulation = thread::spawn(move || {
        writer.write(Register::Nr51.addr(), 0xFF).unwrap();
        writer.write(Register::Nr22.addr(), 0xF0).unwrap();
        writer.write(Register::Nr22.addr(), 0x40).unwrap();
        writer.write(Register::Nr21.addr(), 0x80).unwrap();
        writer.write(Register::Nr23.addr(), A440_LO).unwrap();
        writer.write(Register::Nr24.addr(), 0x80 | A440_HI).unwrap();
    });
    emulation.join().unwrap();

    let mut apu = Apu::new(config).unwrap();
    assert_eq!(apu.drain(&mut events), 6);

    let ch = apu.channel(ChannelId::Square2);
    assert!(ch.playing);
    // Last NR22 write wins
    assert_eq!(ch.volume, 4);
    assert_eq!(ch.raw_frequency, 1750);
    assert_eq!(apu.registers().read(Register::Nr22.addr()), 0x40);
}

#[test]
fn test_pending_slot_drops_overwritten_write() {
    let slot = PendingSlot::new();
    assert!(slot.post(Register::Nr51.addr(), 0xFF).is_none());
    let lost = slot.post(Register::Nr12.addr(), 0xF0).unwrap();
    assert_eq!(lost.address, Register::Nr51.addr());

    let mut apu = apu();
    let mut source = slot.clone();
    assert!(apu.step(&mut source));
    assert!(!apu.step(&mut source));
    assert_eq!(apu.registers().read(Register::Nr12.addr()), 0xF0);
    assert_eq!(apu.registers().read(Register::Nr51.addr()), 0x00);
}

#[test]
fn test_sample_rate_scales_cadence() {
    let mut apu = Apu::new(ApuConfig::low_latency(22_050)).unwrap();
    write_all(
        &mut apu,
        &[
            (Register::Nr51, 0xFF),
            (Register::Nr11, 0x80),
            (Register::Nr12, 0x80),
            (Register::Nr13, A440_LO),
            (Register::Nr14, 0x80 | A440_HI),
        ],
    );
    let mut out = vec![0i16; 2205];
    apu.generate_channel(ChannelId::Square1, &mut out);
    // 22050 / 439.83 truncates to 50 samples per period
    let rising_edges = out
        .windows(2)
        .filter(|w| w[0] == SILENCE && w[1] != SILENCE)
        .count();
    assert_eq!(rising_edges, 44);
}
