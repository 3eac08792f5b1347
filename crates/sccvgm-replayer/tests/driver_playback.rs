//! End-to-end playback scenarios: synthetic VGM streams rendered through
//! the full driver.

use sccvgm_replayer::{ExportConfig, VgmDriver, export_to_wav};

const MSX_CLOCK: u32 = 3_579_545;

/// Build a minimal VGM 1.61 image: 0x100-byte header followed by `body`.
/// `loop_to_body` points the loop offset at the first body byte.
fn build_vgm(psg_clock: u32, scc_clock: u32, loop_to_body: bool, body: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; 0x100];
    data[0..4].copy_from_slice(b"Vgm ");
    data[0x08..0x0C].copy_from_slice(&0x161u32.to_le_bytes());
    // Data offset is relative to its field at 0x34; body starts at 0x100.
    data[0x34..0x38].copy_from_slice(&0xCCu32.to_le_bytes());
    data[0x74..0x78].copy_from_slice(&psg_clock.to_le_bytes());
    data[0x9C..0xA0].copy_from_slice(&scc_clock.to_le_bytes());
    if loop_to_body {
        // Loop offset is relative to its field at 0x1C.
        data[0x1C..0x20].copy_from_slice(&0xE4u32.to_le_bytes());
    }
    data.extend_from_slice(body);
    data
}

#[test]
fn empty_driver_renders_silence() {
    let mut driver = VgmDriver::new(44_100);
    let mut buf = [123i16; 4410];
    driver.render(&mut buf);
    assert!(buf.iter().all(|&s| s == 0));
}

#[test]
fn silent_stream_renders_zeros_until_it_ends() {
    let data = build_vgm(MSX_CLOCK, 0, false, &[0x62, 0x62, 0x66]);
    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));

    let mut buf = [0i16; 735 * 2];
    driver.render(&mut buf);
    assert!(buf.iter().all(|&s| s == 0), "no writes, no signal");
    assert!(driver.is_playing(), "end is reached on the next command");

    driver.render(&mut buf[..1]);
    assert!(!driver.is_playing());
}

#[test]
fn rendering_in_pieces_matches_one_pass() {
    let body = [0x61, 0x10, 0x27, 0x66]; // wait 10000 samples, end
    let data = build_vgm(MSX_CLOCK, 0, false, &body);

    let mut one_pass = VgmDriver::new(44_100);
    assert!(one_pass.load(&data));
    let mut full = vec![0i16; 12_000];
    one_pass.render(&mut full);

    let mut pieces = VgmDriver::new(44_100);
    assert!(pieces.load(&data));
    let mut split = vec![0i16; 12_000];
    let (a, b) = split.split_at_mut(5_000);
    pieces.render(a);
    pieces.render(b);

    assert_eq!(full, split);
}

#[test]
fn loop_marker_counts_each_pass() {
    let body = [0xA0, 0x08, 0x0F, 0x62, 0x66];
    let data = build_vgm(MSX_CLOCK, 0, true, &body);
    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));

    let mut buf = vec![0i16; 735 * 3 + 1];
    driver.render(&mut buf);
    assert_eq!(driver.loop_count(), 3);
    assert!(driver.is_playing());
}

#[test]
fn psg_tone_is_audible() {
    let body = [
        0xA0, 0x00, 0xFF, // tone A period low
        0xA0, 0x01, 0x00, //
        0xA0, 0x07, 0xFE, // mixer: tone A enabled
        0xA0, 0x08, 0x0F, // volume A
        0x62, 0x66,
    ];
    let data = build_vgm(MSX_CLOCK, 0, true, &body);
    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));

    let mut buf = vec![0i16; 735];
    driver.render(&mut buf);
    assert!(buf.iter().any(|&s| s != 0), "tone must be present");
    assert!(
        buf.windows(2).any(|w| w[0] != w[1]),
        "tone must oscillate rather than sit on a DC level"
    );
}

#[test]
fn scc_wave_write_mirrors_voice3_into_voice4() {
    let body = [0xD2, 0x00, 0x60, 0x5A, 0x62, 0x66];
    let data = build_vgm(0, MSX_CLOCK, true, &body);
    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));

    let mut buf = vec![0i16; 16];
    driver.render(&mut buf);
    assert_eq!(driver.scc().read_register(0x60), 0x5A);
    assert_eq!(driver.scc().read_register(0x80), 0x5A);
}

#[test]
fn unknown_command_terminates_playback() {
    let body = [0x11, 0x00, 0x66];
    let data = build_vgm(MSX_CLOCK, 0, false, &body);
    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));

    let mut buf = [0i16; 64];
    driver.render(&mut buf);
    assert!(!driver.is_playing());
}

#[test]
fn skip_listed_label_markers_are_ignored() {
    let body = [0xDD, 0xDE, 0xDF, 0xFD, 0xFE, 0xFF, 0x62, 0x66];
    let data = build_vgm(MSX_CLOCK, 0, false, &body);
    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));

    let mut buf = [0i16; 736];
    driver.render(&mut buf);
    assert!(!driver.is_playing(), "wait then clean end of data");
}

#[test]
fn truncated_stream_terminates_like_an_unknown_command() {
    // 0xA0 needs two operand bytes; the stream ends after one.
    let body = [0xA0, 0x00];
    let data = build_vgm(MSX_CLOCK, 0, false, &body);
    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));

    let mut buf = [0i16; 16];
    driver.render(&mut buf);
    assert!(!driver.is_playing());
}

#[test]
fn output_respects_the_clipping_window() {
    // Full-volume tone on all three channels with 600% master gain pushes
    // the mix well past the window.
    let body = [
        0xA0, 0x00, 0xFF, 0xA0, 0x01, 0x00, //
        0xA0, 0x02, 0xFF, 0xA0, 0x03, 0x00, //
        0xA0, 0x04, 0xFF, 0xA0, 0x05, 0x00, //
        0xA0, 0x07, 0xF8, // all tones enabled
        0xA0, 0x08, 0x0F, 0xA0, 0x09, 0x0F, 0xA0, 0x0A, 0x0F, //
        0x62, 0x66,
    ];
    let data = build_vgm(MSX_CLOCK, 0, true, &body);
    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));
    driver.set_wave_size(50);
    let (max, min) = (32_767 * 50 / 100, -32_768 * 50 / 100);

    let mut buf = vec![0i16; 4410];
    driver.render(&mut buf);
    assert!(buf.iter().all(|&s| (s as i32) <= max && (s as i32) >= min));
    assert!(
        buf.iter().any(|&s| s as i32 == max),
        "gain should drive the mix into the ceiling"
    );
}

#[test]
fn both_chips_mix_into_one_stream() {
    // Give SCC voice 0 a square-ish wave, then key it and start a PSG tone.
    let mut body: Vec<u8> = (0u8..32)
        .flat_map(|slot| {
            let level = if slot < 16 { 0x60u8 } else { 0xA0u8 };
            [0xD2, 0x00, slot, level]
        })
        .collect();
    body.extend_from_slice(&[
        0xA0, 0x00, 0xFF, 0xA0, 0x07, 0xFE, 0xA0, 0x08, 0x0F, // PSG tone
        0xD2, 0x03, 0x00, 0x1F, // SCC key on
        0xD2, 0x01, 0x00, 0x40, // SCC freq voice 0
        0xD2, 0x02, 0x00, 0x0F, // SCC volume voice 0
        0x62, 0x66,
    ]);
    let data = build_vgm(MSX_CLOCK, MSX_CLOCK, true, &body);

    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));
    let mut buf = vec![0i16; 2205];
    driver.render(&mut buf);
    assert!(buf.iter().any(|&s| s != 0));
    assert_eq!(driver.frequency_psg(0), 0xFF);
    assert_eq!(driver.frequency_scc(0), 0x40);
}

#[test]
fn export_produces_a_bounded_wav() {
    let data = build_vgm(MSX_CLOCK, 0, false, &[0x62, 0x66]);
    let mut driver = VgmDriver::new(44_100);
    assert!(driver.load(&data));

    let path = std::env::temp_dir().join("sccvgm_export_test.wav");
    export_to_wav(&mut driver, &path, ExportConfig::default()).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(spec.bits_per_sample, 16);
    // One 4410-sample chunk covers the 735-sample body; 32 fade chunks
    // follow.
    assert_eq!(reader.len(), 33 * 4410);
    std::fs::remove_file(&path).ok();
}

#[test]
fn export_requires_a_loaded_stream() {
    let mut driver = VgmDriver::new(44_100);
    let path = std::env::temp_dir().join("sccvgm_export_unloaded.wav");
    assert!(export_to_wav(&mut driver, &path, ExportConfig::default()).is_err());
    assert!(!path.exists());
}
