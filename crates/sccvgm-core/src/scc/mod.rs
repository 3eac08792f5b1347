//! Konami SCC / SCC-I wavetable chip emulation.
//!
//! The SCC exposes five 32-sample signed waveforms through a memory-mapped
//! window. The Standard cartridge (SCC) maps everything through a compact
//! 0x80-byte layout in which voices 3 and 4 share a waveform; the Enhanced
//! variant (SCC-I) adds a bank-select port, an extended register layout and
//! an independent fifth waveform.
//!
//! # Register file
//!
//! Canonical register indices used by [`Scc::write_register`]:
//!
//! - `0x00..=0x9F` — waveforms, 32 bytes per voice
//! - `0xC0..=0xC9` — 12-bit frequency dividers, low byte / high nibble
//! - `0xD0..=0xD4` — 4-bit volumes
//! - `0xE0` — mode select
//! - `0xE1` — key-on bits (applied at each voice's next phase wrap)
//! - `0xE2` — test flags: frequency truncation, refresh, waveform rotation

mod voice;

use voice::{GETA_BITS, Voice};

/// Number of wavetable voices.
const NUM_VOICES: usize = 5;

/// Cartridge variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SccKind {
    /// Konami SCC.
    Standard,
    /// Konami SCC-I (Sound Cartridge).
    #[default]
    Enhanced,
}

/// Konami SCC / SCC-I wavetable chip.
///
/// # Example
/// ```
/// use sccvgm_core::{Scc, SccKind};
///
/// let mut scc = Scc::new(3_579_545, 44_100);
/// scc.set_kind(SccKind::Standard);
/// scc.write(0x9000, 0x3F); // activate
/// scc.write(0x9800, 0x40); // voice 0 waveform, first sample
/// let _sample = scc.calc();
/// ```
#[derive(Clone, Debug)]
pub struct Scc {
    clock: u32,
    rate: u32,
    base_incr: u32,
    kind: SccKind,
    mode: bool,
    active: bool,
    base_adr: u32,
    mask: u32,

    real_step: u32,
    scc_time: u32,
    scc_step: u32,

    voices: [Voice; NUM_VOICES],
    // Shadow of registers 0xC0..=0xFF for readback.
    regs: [u8; 0x40],

    ch_enable: u32,
    ch_enable_next: u32,

    cycle_4bit: bool,
    cycle_8bit: bool,
    refresh: bool,
}

impl Scc {
    /// Create an SCC with the given master clock and output rate (a zero
    /// rate falls back to 44.1 kHz). The chip starts as [`SccKind::Enhanced`].
    pub fn new(clock: u32, rate: u32) -> Self {
        let mut scc = Self {
            clock,
            rate: if rate == 0 { 44_100 } else { rate },
            base_incr: 0,
            kind: SccKind::Enhanced,
            mode: false,
            active: false,
            base_adr: 0x9000,
            mask: 0,
            real_step: 0,
            scc_time: 0,
            scc_step: 0,
            voices: std::array::from_fn(|_| Voice::new()),
            regs: [0; 0x40],
            ch_enable: 0x1F,
            ch_enable_next: 0x1F,
            cycle_4bit: false,
            cycle_8bit: false,
            refresh: false,
        };
        scc.internal_refresh();
        scc.reset();
        scc
    }

    /// Reset voices, registers and the memory-map state.
    pub fn reset(&mut self) {
        self.mode = false;
        self.active = false;
        self.base_adr = 0x9000;
        for voice in &mut self.voices {
            voice.reset();
        }
        self.regs = [0; 0x40];
        self.mask = 0;
        self.ch_enable = 0x1F;
        self.ch_enable_next = 0x1F;
        self.cycle_4bit = false;
        self.cycle_8bit = false;
        self.refresh = false;
    }

    /// Change the output sample rate (a zero rate falls back to 44.1 kHz).
    pub fn set_rate(&mut self, rate: u32) {
        self.rate = if rate == 0 { 44_100 } else { rate };
        self.internal_refresh();
    }

    /// Select the cartridge variant.
    pub fn set_kind(&mut self, kind: SccKind) {
        self.kind = kind;
    }

    /// Set the driver-side mute mask; bit `i` silences voice `i`.
    pub fn set_mask(&mut self, mask: u32) {
        self.mask = mask;
    }

    /// Flip bits of the driver-side mute mask.
    pub fn toggle_mask(&mut self, mask: u32) {
        self.mask ^= mask;
    }

    /// Current 12-bit frequency divider of a voice; 0 for out-of-range
    /// voices.
    pub fn frequency(&self, ch: usize) -> u32 {
        if ch < NUM_VOICES {
            self.voices[ch].freq
        } else {
            0
        }
    }

    /// Memory-mapped write.
    ///
    /// On the Enhanced variant, 0xBFFE/0xBFFF select one of two base
    /// banks. Address 0 of the selected bank activates or deactivates the
    /// engine; offsets 0x800..=0x8FF carry register writes in the layout of
    /// the active mode. Everything else is ignored.
    pub fn write(&mut self, addr: u32, value: u8) {
        if self.kind == SccKind::Enhanced && (addr & 0xFFFE) == 0xBFFE {
            self.base_adr = 0x9000 | ((value as u32 & 0x20) << 8);
            return;
        }
        if addr < self.base_adr {
            return;
        }
        let addr = addr - self.base_adr;

        if addr == 0 {
            if value == 0x3F {
                self.mode = false;
                self.active = true;
            } else if value & 0x80 != 0 && self.kind == SccKind::Enhanced {
                self.mode = true;
                self.active = true;
            } else {
                self.mode = false;
                self.active = false;
            }
            return;
        }

        if !self.active || !(0x800..=0x8FF).contains(&addr) {
            return;
        }

        if self.kind == SccKind::Standard || !self.mode {
            self.write_standard(addr, value);
        } else {
            self.write_enhanced(addr, value);
        }
    }

    /// Memory-mapped read, mirroring the [`Scc::write`] decode.
    pub fn read(&self, addr: u32) -> u8 {
        if self.kind == SccKind::Enhanced && (addr & 0xFFFE) == 0xBFFE {
            return ((self.base_adr >> 8) & 0x20) as u8;
        }
        if addr < self.base_adr {
            return 0;
        }
        let addr = addr - self.base_adr;

        if addr == 0 {
            return if self.mode { 0x80 } else { 0x3F };
        }
        if !self.active || !(0x800..=0x8FF).contains(&addr) {
            return 0;
        }
        if self.kind == SccKind::Standard || !self.mode {
            self.read_standard(addr)
        } else {
            self.read_enhanced(addr)
        }
    }

    /// Write a canonical register (see the module docs for the layout).
    pub fn write_register(&mut self, reg: u32, value: u8) {
        let reg = reg & 0xFF;
        match reg {
            0x00..=0x9F => {
                let ch = ((reg & 0xF0) >> 5) as usize;
                let slot = (reg & 0x1F) as usize;
                self.write_wave(ch, slot, value);
            }
            0xC0..=0xC9 => {
                self.regs[(reg - 0xC0) as usize] = value;
                let ch = ((reg & 0x0F) >> 1) as usize;
                let voice = &mut self.voices[ch];
                if reg & 1 != 0 {
                    voice.freq = ((value as u32 & 0x0F) << 8) | (voice.freq & 0xFF);
                } else {
                    voice.freq = (voice.freq & 0xF00) | value as u32;
                }
                if self.refresh {
                    voice.count = 0;
                }
                let mut freq = voice.freq;
                if self.cycle_8bit {
                    freq &= 0xFF;
                }
                if self.cycle_4bit {
                    freq >>= 8;
                }
                voice.incr = if freq <= 8 {
                    0
                } else {
                    self.base_incr / (freq + 1)
                };
            }
            0xD0..=0xD4 => {
                self.regs[(reg - 0xC0) as usize] = value;
                self.voices[(reg & 0x0F) as usize].volume = (value & 0x0F) as u32;
            }
            0xE0 => {
                self.regs[(reg - 0xC0) as usize] = value;
                self.mode = value & 1 != 0;
            }
            0xE1 => {
                self.regs[(reg - 0xC0) as usize] = value;
                self.ch_enable_next = (value & 0x1F) as u32;
            }
            0xE2 => {
                self.regs[(reg - 0xC0) as usize] = value;
                self.cycle_4bit = value & 0x01 != 0;
                self.cycle_8bit = value & 0x02 != 0;
                self.refresh = value & 0x20 != 0;
                let all = if value & 0x40 != 0 { 0x1F } else { 0 };
                for voice in &mut self.voices {
                    voice.rotate = all;
                }
                if value & 0x80 != 0 {
                    self.voices[3].rotate = 0x1F;
                    self.voices[4].rotate = 0x1F;
                }
            }
            _ => {}
        }
    }

    /// Read back a canonical register; unmapped indices return 0.
    pub fn read_register(&self, reg: u32) -> u8 {
        let reg = reg & 0xFF;
        if reg < 0xA0 {
            self.voices[(reg >> 5) as usize].wave[(reg & 0x1F) as usize] as u8
        } else if (0xC0..0xF0).contains(&reg) {
            self.regs[(reg - 0xC0) as usize]
        } else {
            0
        }
    }

    /// Produce one output sample.
    pub fn calc(&mut self) -> i16 {
        while self.real_step > self.scc_time {
            self.scc_time += self.scc_step;
            self.update_output();
        }
        self.scc_time -= self.real_step;
        self.mix_output()
    }

    // VGM SCC1 sub-address mappers.

    /// VGM port 0: waveform bank 1 (voices 0..=3).
    pub fn write_waveform1(&mut self, addr: u32, value: u8) {
        self.write_register(addr & 0x7F, value);
    }

    /// VGM port 4: waveform bank 2 (voice 3's table, mirrored to voice 4
    /// outside the independent SCC-I mode).
    pub fn write_waveform2(&mut self, addr: u32, value: u8) {
        self.write_register((addr & 0x1F) | 0x60, value);
    }

    /// VGM port 1: frequency dividers.
    pub fn write_frequency(&mut self, addr: u32, value: u8) {
        self.write_register((addr & 0x0F) | 0xC0, value);
    }

    /// VGM port 2: volumes.
    pub fn write_volume(&mut self, addr: u32, value: u8) {
        self.write_register((addr & 0x0F) | 0xD0, value);
    }

    /// VGM port 3: key-on bits.
    pub fn write_keyoff(&mut self, value: u8) {
        self.write_register(0xE1, value);
    }

    /// VGM port 5: test flags.
    pub fn write_test(&mut self, value: u8) {
        self.write_register(0xE2, value);
    }

    fn internal_refresh(&mut self) {
        self.base_incr = 2 << GETA_BITS;
        self.real_step = (1u32 << 31) / self.rate;
        self.scc_step = (1u32 << 31) / (self.clock / 2).max(1);
        self.scc_time = 0;
    }

    /// Single choke point for waveform writes: applies the rotation drop
    /// and the voice-3-to-4 mirror rule.
    fn write_wave(&mut self, ch: usize, slot: usize, value: u8) {
        if self.voices[ch].rotate != 0 {
            return;
        }
        self.voices[ch].wave[slot] = value as i8;
        if !self.mode && ch == 3 {
            self.voices[4].wave[slot] = value as i8;
        }
    }

    fn write_standard(&mut self, addr: u32, value: u8) {
        let addr = addr & 0xFF;
        if addr < 0x80 {
            self.write_register(addr, value);
        } else if addr < 0x8A {
            self.write_register(addr + 0xC0 - 0x80, value);
        } else if addr < 0x8F {
            self.write_register(addr + 0xD0 - 0x8A, value);
        } else if addr == 0x8F {
            self.write_register(0xE1, value);
        } else if addr >= 0xE0 {
            self.write_register(0xE2, value);
        }
    }

    fn write_enhanced(&mut self, addr: u32, value: u8) {
        let addr = addr & 0xFF;
        if addr < 0xA0 {
            self.write_register(addr, value);
        } else if addr < 0xAA {
            self.write_register(addr + 0xC0 - 0xA0, value);
        } else if addr < 0xAF {
            self.write_register(addr + 0xD0 - 0xAA, value);
        } else if addr == 0xAF {
            self.write_register(0xE1, value);
        } else if (0xC0..=0xDF).contains(&addr) {
            self.write_register(0xE2, value);
        }
    }

    fn read_standard(&self, addr: u32) -> u8 {
        let addr = addr & 0xFF;
        if addr < 0x80 {
            self.read_register(addr)
        } else if (0xA0..=0xBF).contains(&addr) {
            self.read_register(0x80 + (addr & 0x1F))
        } else if addr < 0x8A {
            self.read_register(addr + 0xC0 - 0x80)
        } else if addr < 0x8F {
            self.read_register(addr + 0xD0 - 0x8A)
        } else if addr == 0x8F {
            self.read_register(0xE1)
        } else if addr >= 0xE0 {
            self.read_register(0xE2)
        } else {
            0
        }
    }

    fn read_enhanced(&self, addr: u32) -> u8 {
        let addr = addr & 0xFF;
        if addr < 0xA0 {
            self.read_register(addr)
        } else if addr < 0xAA {
            self.read_register(addr + 0xC0 - 0xA0)
        } else if addr < 0xAF {
            self.read_register(addr + 0xD0 - 0xAA)
        } else if addr == 0xAF {
            self.read_register(0xE1)
        } else if (0xC0..=0xDF).contains(&addr) {
            self.read_register(0xE2)
        } else {
            0
        }
    }

    fn update_output(&mut self) {
        for i in 0..NUM_VOICES {
            let wrapped = self.voices[i].advance();
            if wrapped {
                // Pending key state takes effect once the waveform wraps.
                self.ch_enable &= !(1 << i);
                self.ch_enable |= self.ch_enable_next & (1 << i);
            }
            let keyed = self.ch_enable & (1 << i) != 0;
            let muted = self.mask & (1 << i) != 0;
            let voice = &mut self.voices[i];
            if keyed && !muted {
                let sample = voice.sample();
                voice.out = voice.out.wrapping_add(sample);
            }
            // The output register leaks toward zero each tick, acting as
            // both the DAC latch and a crude anti-aliasing tail.
            voice.out >>= 1;
        }
    }

    #[inline]
    fn mix_output(&self) -> i16 {
        self.voices.iter().map(|v| v.out as i32).sum::<i32>() as i16
    }
}
