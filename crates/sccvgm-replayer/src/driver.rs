//! VGM playback driver.
//!
//! The driver owns one PSG and one SCC instance, walks the VGM command
//! stream, and pulls one sample from each enabled chip per output sample.
//! Wait commands accumulate into a sample counter that is decremented once
//! per rendered sample, which is what keeps register writes aligned to the
//! output clock.

use crate::header::VgmHeader;
use sccvgm_core::{Psg, Scc, SccKind, VolumeMode};

/// Nominal MSX master clock shared by both chips.
const MASTER_CLOCK: u32 = 3_579_545;

/// Samples in one NTSC frame at 44.1 kHz (command 0x62).
const WAIT_NTSC_FRAME: i32 = 735;

/// Samples in one PAL frame at 44.1 kHz (command 0x63).
const WAIT_PAL_FRAME: i32 = 882;

/// VGM playback driver for PSG/SCC streams.
///
/// # Example
/// ```no_run
/// use sccvgm_replayer::VgmDriver;
///
/// let data = std::fs::read("song.vgm").unwrap();
/// let mut driver = VgmDriver::new(44_100);
/// assert!(driver.load(&data));
///
/// let mut buf = [0i16; 4410];
/// while driver.loop_count() < 1 && driver.is_playing() {
///     driver.render(&mut buf);
///     // ... hand buf to an output sink
/// }
/// ```
pub struct VgmDriver {
    rate: u32,
    psg: Psg,
    scc: Scc,

    master_volume: i32,
    wave_max: i32,
    wave_min: i32,

    data: Vec<u8>,
    version: u32,
    psg_clock: u32,
    scc_clock: u32,
    cursor: usize,
    loop_offset: usize,
    wait: i32,
    end: bool,
    loop_count: u32,
}

impl VgmDriver {
    /// Create a driver rendering at the given sample rate.
    pub fn new(rate: u32) -> Self {
        let mut driver = Self {
            rate,
            psg: Psg::new(MASTER_CLOCK, rate),
            scc: Scc::new(MASTER_CLOCK, rate),
            master_volume: 600,
            wave_max: 0,
            wave_min: 0,
            data: Vec::new(),
            version: 0,
            psg_clock: 0,
            scc_clock: 0,
            cursor: 0,
            loop_offset: 0,
            wait: 0,
            end: false,
            loop_count: 0,
        };
        driver.set_wave_size(95);
        driver
    }

    /// Output sample rate in Hz.
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Master volume percentage applied before clipping. Values above 100
    /// are deliberate gain; the default is 600.
    pub fn set_master_volume(&mut self, percent: i32) {
        self.master_volume = percent;
    }

    /// Clipping window as a percentage of full scale, saturated to
    /// `[0, 100]`.
    pub fn set_wave_size(&mut self, percent: i32) {
        let percent = percent.clamp(0, 100);
        self.wave_max = 32_767 * percent / 100;
        self.wave_min = -32_768 * percent / 100;
    }

    /// Load a VGM stream, establishing a playback session.
    ///
    /// Returns `false` (after a full reset, leaving no partial state) when
    /// the stream is shorter than a header, lacks the magic, is older than
    /// version 1.61, or uses neither supported chip.
    pub fn load(&mut self, data: &[u8]) -> bool {
        self.reset();
        let Ok(header) = VgmHeader::parse(data) else {
            return false;
        };

        self.data = data.to_vec();
        self.version = header.version;
        self.psg_clock = header.psg_clock;
        self.scc_clock = header.scc_clock;
        self.cursor = header.data_cursor;
        self.loop_offset = header.loop_offset;

        if self.psg_clock != 0 {
            self.psg.set_volume_mode(VolumeMode::Ay8910);
            self.psg.set_clock_divider(true);
        }
        if self.scc_clock != 0 {
            self.scc.set_kind(SccKind::Standard);
        }
        true
    }

    /// Clear the playback session and reset both chips.
    pub fn reset(&mut self) {
        self.data = Vec::new();
        self.version = 0;
        self.psg_clock = 0;
        self.scc_clock = 0;
        self.cursor = 0;
        self.loop_offset = 0;
        self.wait = 0;
        self.end = false;
        self.loop_count = 0;
        self.psg.reset();
        self.scc.reset();
    }

    /// Render samples into the whole buffer. With no stream loaded the
    /// buffer is zero-filled; past the end of a non-looping stream the
    /// chips keep being polled and decay to silence.
    pub fn render(&mut self, buf: &mut [i16]) {
        if self.data.is_empty() {
            buf.fill(0);
            return;
        }
        for slot in buf.iter_mut() {
            if self.wait < 1 {
                self.execute();
            }
            self.wait -= 1;

            let mut w: i32 = 0;
            if self.psg_clock != 0 {
                w += self.psg.calc() as i32;
            }
            if self.scc_clock != 0 {
                w += self.scc.calc() as i32;
            }
            w = w * self.master_volume / 100;
            *slot = w.clamp(self.wave_min, self.wave_max) as i16;
        }
    }

    /// Whether a stream is currently loaded.
    pub fn is_loaded(&self) -> bool {
        !self.data.is_empty()
    }

    /// Whether the stream has not yet terminated.
    pub fn is_playing(&self) -> bool {
        !self.end
    }

    /// Number of times playback has returned to the loop offset.
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// BCD-coded version of the loaded stream, 0 when nothing is loaded.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Tone period of a PSG channel; 0 for out-of-range channels.
    pub fn frequency_psg(&self, ch: usize) -> u32 {
        self.psg.frequency(ch)
    }

    /// Frequency divider of an SCC voice; 0 for out-of-range voices.
    pub fn frequency_scc(&self, ch: usize) -> u32 {
        self.scc.frequency(ch)
    }

    /// The PSG instance.
    pub fn psg(&self) -> &Psg {
        &self.psg
    }

    /// Mutable PSG access, e.g. for channel muting.
    pub fn psg_mut(&mut self) -> &mut Psg {
        &mut self.psg
    }

    /// The SCC instance.
    pub fn scc(&self) -> &Scc {
        &self.scc
    }

    /// Mutable SCC access, e.g. for voice muting.
    pub fn scc_mut(&mut self) -> &mut Scc {
        &mut self.scc
    }

    /// Advance the command interpreter until a wait is pending or the
    /// stream terminates. Unknown commands terminate playback: command
    /// lengths vary, so skipping heuristically would desynchronise the
    /// stream.
    fn execute(&mut self) {
        if self.data.is_empty() || self.end {
            return;
        }
        while self.wait < 1 {
            let Some(cmd) = self.fetch() else {
                self.end = true;
                return;
            };
            match cmd {
                // AY-3-8910 stereo mask: consume and ignore.
                0x31 => {
                    if self.fetch().is_none() {
                        self.end = true;
                        return;
                    }
                }
                // AY-3-8910 register write.
                0xA0 => {
                    let (Some(addr), Some(value)) = (self.fetch(), self.fetch()) else {
                        self.end = true;
                        return;
                    };
                    self.psg.write_register(addr, value);
                }
                // SCC1 write through the compact port layout.
                0xD2 => {
                    let (Some(port), Some(offset), Some(value)) =
                        (self.fetch(), self.fetch(), self.fetch())
                    else {
                        self.end = true;
                        return;
                    };
                    match port & 0x7F {
                        0x00 => self.scc.write_waveform1(offset as u32, value),
                        0x01 => self.scc.write_frequency(offset as u32, value),
                        0x02 => self.scc.write_volume(offset as u32, value),
                        0x03 => self.scc.write_keyoff(value),
                        0x04 => self.scc.write_waveform2(offset as u32, value),
                        0x05 => self.scc.write_test(value),
                        _ => {}
                    }
                }
                // Wait a 16-bit number of samples.
                0x61 => {
                    let (Some(lo), Some(hi)) = (self.fetch(), self.fetch()) else {
                        self.end = true;
                        return;
                    };
                    self.wait += u16::from_le_bytes([lo, hi]) as i32;
                }
                0x62 => self.wait += WAIT_NTSC_FRAME,
                0x63 => self.wait += WAIT_PAL_FRAME,
                // End of sound data: loop or stop.
                0x66 => {
                    if self.loop_offset != 0 {
                        self.cursor = self.loop_offset;
                        self.loop_count += 1;
                    } else {
                        self.end = true;
                        return;
                    }
                }
                // Label markers some trackers emit; no operands.
                0xDD | 0xDE | 0xDF | 0xFD | 0xFE | 0xFF => {}
                _ => {
                    self.end = true;
                    return;
                }
            }
        }
    }

    #[inline]
    fn fetch(&mut self) -> Option<u8> {
        let byte = self.data.get(self.cursor).copied();
        if byte.is_some() {
            self.cursor += 1;
        }
        byte
    }
}

impl Default for VgmDriver {
    /// A driver at the standard 44.1 kHz output rate.
    fn default() -> Self {
        Self::new(44_100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_size_saturates() {
        let mut driver = VgmDriver::new(44_100);
        driver.set_wave_size(150);
        assert_eq!(driver.wave_max, 32_767);
        assert_eq!(driver.wave_min, -32_768);

        driver.set_wave_size(-10);
        assert_eq!(driver.wave_max, 0);
        assert_eq!(driver.wave_min, 0);

        driver.set_wave_size(50);
        // 50% of full scale on both sides.
        assert_eq!(driver.wave_max, 16_383);
        assert_eq!(driver.wave_min, -16_384);
    }

    #[test]
    fn render_without_load_is_silent() {
        let mut driver = VgmDriver::new(44_100);
        let mut buf = [1i16; 4410];
        driver.render(&mut buf);
        assert!(buf.iter().all(|&s| s == 0));
    }

    #[test]
    fn load_rejects_garbage_and_leaves_clean_state() {
        let mut driver = VgmDriver::new(44_100);
        assert!(!driver.load(b"not a vgm"));
        assert_eq!(driver.loop_count(), 0);
        assert_eq!(driver.version(), 0);
        let mut buf = [5i16; 64];
        driver.render(&mut buf);
        assert!(buf.iter().all(|&s| s == 0));
    }

    #[test]
    fn frequency_queries_route_to_their_own_chip() {
        let mut driver = VgmDriver::new(44_100);
        driver.psg_mut().write_register(0, 0x42);
        driver.scc_mut().write_register(0xC0, 0x17);
        assert_eq!(driver.frequency_psg(0), 0x42);
        assert_eq!(driver.frequency_scc(0), 0x17);
        assert_eq!(driver.frequency_psg(3), 0);
        assert_eq!(driver.frequency_scc(5), 0);
    }
}
