//! VGM playback for MSX PSG/SCC streams.
//!
//! This crate turns a VGM 1.61+ byte stream targeting the AY-3-8910 PSG
//! and/or the Konami SCC into signed 16-bit mono PCM. It drives the chip
//! models from `sccvgm-core`, honouring loop markers and sample-accurate
//! wait commands, and can stream the result into a WAV file.
//!
//! # Example
//! ```no_run
//! use sccvgm_replayer::{ExportConfig, VgmDriver, export_to_wav};
//!
//! # fn main() -> sccvgm_replayer::Result<()> {
//! let data = std::fs::read("song.vgm")?;
//! let mut driver = VgmDriver::new(44_100);
//! if !driver.load(&data) {
//!     return Err("not a playable VGM".into());
//! }
//! export_to_wav(&mut driver, "song.wav", ExportConfig::default())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod driver;
mod error;
mod export;
mod header;

pub use driver::VgmDriver;
pub use error::{ReplayerError, Result};
pub use export::{ExportConfig, export_to_wav};
pub use header::VgmHeader;

// Chip types reachable through the driver accessors.
pub use sccvgm_core::{Psg, Scc, SccKind, VolumeMode};
