//! Example: replay an audio file into a live session
//!
//! Decodes the file (or reads raw signed 16-bit little-endian mono PCM for `.raw`/`.pcm`
//! files at 22050 Hz), pushes it into a [`Session`] in 100 ms chunks at real-time pace
//! divided by `speed`, prints live events and finally the session summary as JSON.
//!
//! ```text
//! RUST_LOG=info cargo run --example live_file -- song.wav [speed]
//! ```

use std::path::Path;
use std::thread;
use std::time::Duration;

use harmoniq::io::decoder::decode_audio;
use harmoniq::io::pcm::pcm16_le_to_f32;
use harmoniq::{Session, SessionConfig, SessionEvent, StftChromaExtractor};

fn load(path: &Path) -> Result<(Vec<f32>, u32), Box<dyn std::error::Error>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("raw") | Some("pcm") => {
            let bytes = std::fs::read(path)?;
            Ok((pcm16_le_to_f32(&bytes)?, harmoniq::config::DEFAULT_SAMPLE_RATE))
        }
        _ => {
            let decoded = decode_audio(path)?;
            println!(
                "Decoded {} ({:.1}s, {} Hz, {} channel(s))",
                path.display(),
                decoded.duration_seconds(),
                decoded.sample_rate,
                decoded.source_channels
            );
            Ok((decoded.samples, decoded.sample_rate))
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: live_file <audio file> [speed]")?;
    let speed: f32 = match args.next() {
        Some(s) => s.parse()?,
        None => 1.0,
    };

    let (samples, sample_rate) = load(Path::new(&path))?;
    let config = SessionConfig::for_sample_rate(sample_rate);
    let (session, events) = Session::start(config, StftChromaExtractor::default())?;

    let printer = thread::spawn(move || {
        for event in events {
            match event {
                SessionEvent::ChordDetected { .. } => {}
                SessionEvent::ChordChanged {
                    entry,
                    roman,
                    pattern,
                } => {
                    print!(
                        "[{:6.2}s] {:<6} {:<6} ({:.2})",
                        entry.start_time, entry.chord, roman, entry.confidence
                    );
                    match pattern {
                        Some(pattern) => println!("  {}", pattern),
                        None => println!(),
                    }
                }
                SessionEvent::KeyChanged(state) => {
                    println!(
                        "Key: {} (score {:.2}) diatonic: {}",
                        state.label.as_deref().unwrap_or("?"),
                        state.confidence,
                        state.diatonic_chords.join(" ")
                    );
                }
            }
        }
    });

    let sink = session.sample_sink();
    let chunk = (sample_rate as usize / 10).max(1);
    let pause = Duration::from_secs_f32(0.1 / speed.max(0.01));
    for block in samples.chunks(chunk) {
        sink.push(block);
        thread::sleep(pause);
    }

    let summary = session.stop()?;
    let _ = printer.join();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
