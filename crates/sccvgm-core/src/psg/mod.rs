//! AY-3-8910 / YM2149 PSG emulation.
//!
//! The chip runs its internal state machine at the master-clock tick rate
//! and converts to the host sample rate with a 24-bit fixed-point
//! accumulator: each `calc` call replays the ticks that fall inside one
//! output sample period and averages the mixed output, which doubles as a
//! crude first-order anti-alias filter.

mod generators;
mod tables;

use generators::{EnvelopeGenerator, NoiseGenerator, ToneGenerator};
use tables::{REG_MASK, VOLTBL_AY8910, VOLTBL_YM2149};

/// Number of tone channels.
const NUM_CHANNELS: usize = 3;

/// Fractional bits of the tick accumulator.
const GETA_BITS: u32 = 24;

/// DAC curve selection.
///
/// The YM2149 resolves 32 volume steps; the AY-3-8910 resolves 16, so its
/// table duplicates each step to keep the envelope indexing shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VolumeMode {
    /// Yamaha YM2149 (32-step DAC).
    #[default]
    Ym2149,
    /// General Instrument AY-3-8910 (16-step DAC).
    Ay8910,
}

/// AY-3-8910 / YM2149 programmable sound generator.
///
/// # Example
/// ```
/// use sccvgm_core::{Psg, VolumeMode};
///
/// let mut psg = Psg::new(3_579_545, 44_100);
/// psg.set_volume_mode(VolumeMode::Ay8910);
/// psg.set_clock_divider(true);
/// psg.write_register(0, 0xAC); // tone A period
/// psg.write_register(1, 0x01);
/// psg.write_register(8, 0x0F); // volume A
/// let _sample = psg.calc();
/// ```
#[derive(Clone, Debug)]
pub struct Psg {
    clock: u32,
    rate: u32,
    clock_divider: bool,
    volume_table: &'static [u32; 32],

    registers: [u8; 16],
    latched: u8,

    tones: [ToneGenerator; NUM_CHANNELS],
    noise: NoiseGenerator,
    envelope: EnvelopeGenerator,

    tone_mask: [bool; NUM_CHANNELS],
    noise_mask: [bool; NUM_CHANNELS],
    // Register value shifted left once; bit 5 selects envelope follow,
    // bits 1..=4 the fixed level.
    volume: [u8; NUM_CHANNELS],
    mask: u32,

    base_incr: u32,
    base_count: u32,
    real_step: u32,
    psg_step: u32,
    psg_time: u32,
    freq_limit: u32,

    ch_out: [i16; NUM_CHANNELS],
    out: i32,
}

impl Psg {
    /// Create a PSG with the given master clock and output rate (a zero
    /// rate falls back to 44.1 kHz).
    pub fn new(clock: u32, rate: u32) -> Self {
        let mut psg = Self {
            clock,
            rate: if rate == 0 { 44_100 } else { rate },
            clock_divider: false,
            volume_table: &VOLTBL_YM2149,
            registers: [0; 16],
            latched: 0,
            tones: Default::default(),
            noise: NoiseGenerator::new(),
            envelope: EnvelopeGenerator::default(),
            tone_mask: [false; NUM_CHANNELS],
            noise_mask: [false; NUM_CHANNELS],
            volume: [0; NUM_CHANNELS],
            mask: 0,
            base_incr: 0,
            base_count: 0,
            real_step: 0,
            psg_step: 0,
            psg_time: 0,
            freq_limit: 0,
            ch_out: [0; NUM_CHANNELS],
            out: 0,
        };
        psg.internal_refresh();
        psg.reset();
        psg
    }

    /// Reset registers, generators and the running output.
    pub fn reset(&mut self) {
        self.base_count = 0;
        for tone in &mut self.tones {
            tone.reset();
        }
        self.noise.reset();
        self.envelope.reset();
        self.registers = [0; 16];
        self.latched = 0;
        self.tone_mask = [false; NUM_CHANNELS];
        self.noise_mask = [false; NUM_CHANNELS];
        self.volume = [0; NUM_CHANNELS];
        self.mask = 0;
        self.ch_out = [0; NUM_CHANNELS];
        self.out = 0;
    }

    /// Change the master clock.
    pub fn set_clock(&mut self, clock: u32) {
        if self.clock != clock {
            self.clock = clock;
            self.internal_refresh();
        }
    }

    /// Halve the effective master clock when enabled.
    pub fn set_clock_divider(&mut self, enable: bool) {
        if self.clock_divider != enable {
            self.clock_divider = enable;
            self.internal_refresh();
        }
    }

    /// Change the output sample rate (a zero rate falls back to 44.1 kHz).
    pub fn set_rate(&mut self, rate: u32) {
        let rate = if rate == 0 { 44_100 } else { rate };
        if self.rate != rate {
            self.rate = rate;
            self.internal_refresh();
        }
    }

    /// Select the DAC volume curve.
    pub fn set_volume_mode(&mut self, mode: VolumeMode) {
        self.volume_table = match mode {
            VolumeMode::Ym2149 => &VOLTBL_YM2149,
            VolumeMode::Ay8910 => &VOLTBL_AY8910,
        };
    }

    /// Set the driver-side mute mask; bit `i` silences channel `i`.
    pub fn set_mask(&mut self, mask: u32) {
        self.mask = mask;
    }

    /// Flip bits of the driver-side mute mask.
    pub fn toggle_mask(&mut self, mask: u32) {
        self.mask ^= mask;
    }

    /// Current 12-bit tone period of a channel; 0 for out-of-range channels.
    pub fn frequency(&self, ch: usize) -> u32 {
        if ch < NUM_CHANNELS {
            self.tones[ch].period()
        } else {
            0
        }
    }

    /// Write a register (0..=15); the value is masked per register.
    pub fn write_register(&mut self, reg: u8, value: u8) {
        if reg > 15 {
            return;
        }
        let reg = reg as usize;
        let value = value & REG_MASK[reg];
        self.registers[reg] = value;

        match reg {
            0..=5 => {
                let ch = reg >> 1;
                let period = ((self.registers[ch * 2 + 1] as u32 & 0x0F) << 8)
                    | self.registers[ch * 2] as u32;
                self.tones[ch].set_period(period);
            }
            6 => self.noise.set_period(value as u32),
            7 => {
                for i in 0..NUM_CHANNELS {
                    self.tone_mask[i] = value & (1 << i) != 0;
                    self.noise_mask[i] = value & (8 << i) != 0;
                }
            }
            8..=10 => self.volume[reg - 8] = value << 1,
            11 | 12 => {
                let period =
                    ((self.registers[12] as u32) << 8) | self.registers[11] as u32;
                self.envelope.set_period(period);
            }
            13 => self.envelope.set_shape(value),
            _ => {}
        }
    }

    /// Read back a register; out-of-range indices return 0.
    pub fn read_register(&self, reg: u8) -> u8 {
        self.registers.get(reg as usize).copied().unwrap_or(0)
    }

    /// Bus-style write: an even address latches the register index (5
    /// bits), an odd address writes to the latched register.
    pub fn write_io(&mut self, addr: u32, value: u8) {
        if addr & 1 != 0 {
            self.write_register(self.latched, value);
        } else {
            self.latched = value & 0x1F;
        }
    }

    /// Bus-style read of the latched register.
    pub fn read_io(&self) -> u8 {
        self.read_register(self.latched)
    }

    /// Produce one output sample.
    pub fn calc(&mut self) -> i16 {
        while self.real_step > self.psg_time {
            self.psg_time += self.psg_step;
            self.update_output();
            self.out += self.mix_output() as i32;
            self.out >>= 1;
        }
        self.psg_time -= self.real_step;
        self.out as i16
    }

    fn internal_refresh(&mut self) {
        let f_master = if self.clock_divider {
            self.clock / 2
        } else {
            self.clock
        };
        self.base_incr = 1 << GETA_BITS;
        self.real_step = f_master;
        self.psg_step = self.rate * 8;
        self.psg_time = 0;
        self.freq_limit = f_master / 16 / (self.rate / 2).max(1);
    }

    fn update_output(&mut self) {
        self.base_count += self.base_incr;
        let incr = self.base_count >> GETA_BITS;
        self.base_count &= (1 << GETA_BITS) - 1;

        self.envelope.tick(incr);
        self.noise.tick(incr);
        let noise = self.noise.output();

        for i in 0..NUM_CHANNELS {
            self.tones[i].tick(incr);

            // Pitches above the output Nyquist only alias; the hardware's
            // analogue low-pass removes them, so silence the channel here.
            if self.freq_limit > 0
                && self.tones[i].period() <= self.freq_limit
                && self.noise_mask[i]
            {
                self.ch_out[i] = 0;
                continue;
            }

            if self.mask & (1 << i) != 0 {
                self.ch_out[i] = 0;
                continue;
            }

            if (self.tone_mask[i] || self.tones[i].edge())
                && (self.noise_mask[i] || noise)
            {
                let index = if self.volume[i] & 0x20 == 0 {
                    (self.volume[i] & 0x1F) as usize
                } else {
                    self.envelope.level() as usize
                };
                self.ch_out[i] = (self.volume_table[index] << 4) as i16;
            } else {
                self.ch_out[i] = 0;
            }
        }
    }

    #[inline]
    fn mix_output(&self) -> i16 {
        self.ch_out[0] + self.ch_out[1] + self.ch_out[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msx_psg() -> Psg {
        let mut psg = Psg::new(3_579_545, 44_100);
        psg.set_volume_mode(VolumeMode::Ay8910);
        psg.set_clock_divider(true);
        psg
    }

    #[test]
    fn register_writes_are_masked() {
        let mut psg = msx_psg();
        for reg in 0..16u8 {
            psg.write_register(reg, 0xFF);
            assert_eq!(psg.read_register(reg), 0xFF & REG_MASK[reg as usize]);
        }
        assert_eq!(psg.read_register(16), 0);
    }

    #[test]
    fn reset_clears_registers() {
        let mut psg = msx_psg();
        psg.write_register(0, 0x55);
        psg.write_register(8, 0x0F);
        psg.reset();
        assert_eq!(psg.read_register(0), 0);
        assert_eq!(psg.read_register(8), 0);
        assert_eq!(psg.frequency(0), 0);
    }

    #[test]
    fn io_latch_selects_register() {
        let mut psg = msx_psg();
        psg.write_io(0xA0, 5);
        psg.write_io(0xA1, 0x0A);
        assert_eq!(psg.read_register(5), 0x0A);
        assert_eq!(psg.read_io(), 0x0A);
    }

    #[test]
    fn tone_period_combines_register_pair() {
        let mut psg = msx_psg();
        psg.write_register(2, 0xCD);
        psg.write_register(3, 0xFA); // masked to 0x0A
        assert_eq!(psg.frequency(1), 0xACD);
        assert_eq!(psg.frequency(3), 0);
    }

    #[test]
    fn tone_channel_produces_signal() {
        let mut psg = msx_psg();
        psg.write_register(0, 0xFF);
        psg.write_register(1, 0x00);
        psg.write_register(7, 0x3E); // tone A on, noise A off
        psg.write_register(8, 0x0F);
        let samples: Vec<i16> = (0..735).map(|_| psg.calc()).collect();
        assert!(samples.iter().any(|&s| s != 0), "tone should be audible");
        assert!(
            samples.windows(2).any(|w| w[0] != w[1]),
            "tone should oscillate"
        );
    }

    #[test]
    fn nyquist_guard_silences_high_pitches() {
        let mut psg = msx_psg();
        // freq_limit is (3579545/2) / 16 / (44100/2) = 5 at these clocks;
        // a period right at the limit with the noise-mask bit set is muted.
        psg.write_register(0, 0x05);
        psg.write_register(1, 0x00);
        psg.write_register(7, 0x3F);
        psg.write_register(8, 0x0F);
        for _ in 0..100 {
            assert_eq!(psg.calc(), 0);
        }
    }

    #[test]
    fn driver_mask_mutes_channel() {
        let mut psg = msx_psg();
        psg.write_register(0, 0xFF);
        psg.write_register(7, 0x3E);
        psg.write_register(8, 0x0F);
        psg.set_mask(0x01);
        for _ in 0..200 {
            assert_eq!(psg.calc(), 0);
        }
        psg.toggle_mask(0x01);
        let samples: Vec<i16> = (0..735).map(|_| psg.calc()).collect();
        assert!(samples.iter().any(|&s| s != 0));
    }

    #[test]
    fn envelope_follow_uses_envelope_level() {
        let mut psg = msx_psg();
        psg.write_register(0, 0xFF);
        psg.write_register(7, 0x3E);
        psg.write_register(8, 0x10); // envelope-follow bit
        psg.write_register(11, 0x10);
        psg.write_register(13, 0x0E); // triangle
        let first: Vec<i16> = (0..2000).map(|_| psg.calc()).collect();
        assert!(first.iter().any(|&s| s != 0));
    }
}
