//! WAV export.
//!
//! Renders a loaded [`VgmDriver`] to a 16-bit mono RIFF/WAVE file: whole
//! loops first, then a linear fade-out rendered in fixed-size chunks.

use crate::driver::VgmDriver;
use crate::error::Result;
use std::path::Path;

/// Samples per rendered chunk (100 ms at 44.1 kHz).
const CHUNK_SAMPLES: usize = 4410;

/// Export configuration.
#[derive(Debug, Clone, Copy)]
pub struct ExportConfig {
    /// Stop the main render once this many loops have played (or the
    /// stream ends, whichever comes first).
    pub loop_limit: u32,
    /// Number of chunks over which the fade-out ramps down; 32 chunks is
    /// 3.2 seconds at 44.1 kHz.
    pub fade_chunks: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            loop_limit: 1,
            fade_chunks: 32,
        }
    }
}

/// Render the driver's stream to a WAV file.
///
/// Rendering continues until the configured loop count is reached or the
/// stream terminates, then the fade-out is appended. Fails when the driver
/// has no stream loaded (there would be nothing to bound the render).
pub fn export_to_wav<P: AsRef<Path>>(
    driver: &mut VgmDriver,
    path: P,
    config: ExportConfig,
) -> Result<()> {
    if !driver.is_loaded() {
        return Err("no VGM stream loaded".into());
    }
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: driver.rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| format!("Failed to create WAV file: {e}"))?;

    println!("Rendering VGM to {}...", path.display());

    let mut buf = [0i16; CHUNK_SAMPLES];
    while driver.loop_count() < config.loop_limit && driver.is_playing() {
        driver.render(&mut buf);
        write_chunk(&mut writer, &buf)?;
    }

    let fade = config.fade_chunks;
    for i in 0..fade {
        driver.render(&mut buf);
        for sample in &mut buf {
            *sample = fade_sample(*sample, fade - i, fade);
        }
        write_chunk(&mut writer, &buf)?;
    }

    writer
        .finalize()
        .map_err(|e| format!("Failed to finalize WAV file: {e}"))?;
    Ok(())
}

fn write_chunk<W>(writer: &mut hound::WavWriter<W>, buf: &[i16]) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    for &sample in buf {
        writer
            .write_sample(sample)
            .map_err(|e| format!("Failed to write sample: {e}"))?;
    }
    Ok(())
}

#[inline]
fn fade_sample(sample: i16, remaining: u32, total: u32) -> i16 {
    (sample as i32 * remaining as i32 / total as i32) as i16
}
