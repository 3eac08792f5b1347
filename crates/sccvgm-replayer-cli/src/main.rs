//! vgm2wav — render an MSX PSG/SCC VGM stream to a WAV file.

use clap::Parser;
use sccvgm_replayer::{ExportConfig, Result, VgmDriver, export_to_wav};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vgm2wav",
    about = "Render a VGM 1.61+ stream (AY-3-8910 PSG and/or Konami SCC) to 16-bit mono WAV"
)]
struct Args {
    /// Input VGM file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = 44_100)]
    rate: u32,

    /// Number of loops to render before the fade-out
    #[arg(long, default_value_t = 1)]
    loops: u32,

    /// Master volume percentage applied before clipping
    #[arg(long, default_value_t = 600)]
    master_volume: i32,

    /// Clipping window as a percentage of full scale (0-100)
    #[arg(long, default_value_t = 95)]
    wave_size: i32,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("vgm2wav: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let data = std::fs::read(&args.input)?;

    let mut driver = VgmDriver::new(args.rate);
    driver.set_master_volume(args.master_volume);
    driver.set_wave_size(args.wave_size);
    if !driver.load(&data) {
        return Err(format!(
            "{}: not a playable VGM (requires version 1.61+ with PSG or SCC)",
            args.input.display()
        )
        .into());
    }

    export_to_wav(
        &mut driver,
        &args.output,
        ExportConfig {
            loop_limit: args.loops,
            fade_chunks: 32,
        },
    )?;

    println!("Wrote {}", args.output.display());
    Ok(())
}
