//! VGM header parsing.
//!
//! Only the fields this engine interprets are read: magic, version, the
//! AY-3-8910 and SCC clock slots, the relative data offset and the loop
//! offset. All multi-byte fields are little-endian.

use crate::error::{ReplayerError, Result};

/// Minimum stream length: the fixed 0x100-byte header.
pub const HEADER_LEN: usize = 0x100;

/// Lowest supported VGM version (1.61, BCD-coded).
pub const MIN_VERSION: u32 = 0x161;

const MAGIC: &[u8; 4] = b"Vgm ";
const VERSION_OFFSET: usize = 0x08;
const LOOP_OFFSET: usize = 0x1C;
const DATA_OFFSET: usize = 0x34;
const AY8910_CLOCK_OFFSET: usize = 0x74;
const SCC_CLOCK_OFFSET: usize = 0x9C;

/// The interpreted slice of a VGM 1.61+ header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VgmHeader {
    /// BCD-coded file version (e.g. 0x171 for 1.71).
    pub version: u32,
    /// AY-3-8910 clock in Hz; 0 when the chip is unused.
    pub psg_clock: u32,
    /// SCC (K051649) clock in Hz; 0 when the chip is unused.
    pub scc_clock: u32,
    /// Absolute position of the first command byte.
    pub data_cursor: usize,
    /// Absolute loop position, or 0 when the stream does not loop.
    pub loop_offset: usize,
}

impl VgmHeader {
    /// Parse and validate a header for this engine: requires the magic,
    /// version 1.61+, and at least one of the two supported chips.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(ReplayerError::Parse(format!(
                "stream of {} bytes is shorter than the VGM header",
                data.len()
            )));
        }
        if &data[0..4] != MAGIC {
            return Err(ReplayerError::Parse("missing \"Vgm \" magic".into()));
        }

        let version = read_u32_le(data, VERSION_OFFSET);
        if version < MIN_VERSION {
            return Err(ReplayerError::Parse(format!(
                "VGM version {version:03x} is older than the required 161"
            )));
        }

        let psg_clock = read_u32_le(data, AY8910_CLOCK_OFFSET);
        let scc_clock = read_u32_le(data, SCC_CLOCK_OFFSET);
        if psg_clock == 0 && scc_clock == 0 {
            return Err(ReplayerError::Parse(
                "stream uses neither the PSG nor the SCC".into(),
            ));
        }

        // The data offset is stored relative to its own field position.
        let data_cursor = read_u32_le(data, DATA_OFFSET) as usize + 0x40 - 0x0C;
        let raw_loop = read_u32_le(data, LOOP_OFFSET) as usize;
        let loop_offset = if raw_loop != 0 { raw_loop + LOOP_OFFSET } else { 0 };

        Ok(Self {
            version,
            psg_clock,
            scc_clock,
            data_cursor,
            loop_offset,
        })
    }
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
