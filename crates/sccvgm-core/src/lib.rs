//! PSG and SCC chip emulation for MSX-family sound hardware.
//!
//! This crate models the two sound chips driven by MSX VGM streams:
//!
//! - [`Psg`] — the General Instrument AY-3-8910 / Yamaha YM2149 programmable
//!   sound generator: three square-wave tone channels, a shared 17-bit noise
//!   LFSR and a shared hardware envelope.
//! - [`Scc`] — the Konami SCC / SCC-I wavetable cartridge: five voices with
//!   32-sample signed waveforms, in Standard or Enhanced ([`SccKind`]) mode.
//!
//! Both chips produce one signed 16-bit mono sample per [`Psg::calc`] /
//! [`Scc::calc`] call at the configured output rate, converting from the
//! chip's native clock with a fixed-point accumulator. Register writes and
//! sample generation are total operations; nothing here can fail.
//!
//! # Quick start
//! ```
//! use sccvgm_core::Psg;
//!
//! let mut psg = Psg::new(3_579_545, 44_100);
//! psg.write_register(0, 0xFF); // tone A period low
//! psg.write_register(7, 0x3E); // mixer: tone A on
//! psg.write_register(8, 0x0F); // volume A
//! let sample: i16 = psg.calc();
//! # let _ = sample;
//! ```
//!
//! For VGM playback, use the `sccvgm-replayer` crate, which drives both
//! chips from a parsed command stream.

#![warn(missing_docs)]

mod psg;
mod scc;

pub use psg::{Psg, VolumeMode};
pub use scc::{Scc, SccKind};
