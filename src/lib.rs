//! # Harmoniq
//!
//! Real-time chord recognition, key tracking and progression analysis for live audio.
//!
//! ## Features
//!
//! - **Streaming windows**: bounded frame buffer turning arbitrary sample chunks into
//!   fixed-size, overlapping analysis windows
//! - **Chord recognition**: chroma template matching over 12 roots × 6 qualities
//! - **Key tracking**: weighted diatonic scoring of recent chords with commit hysteresis
//! - **Progression analysis**: Roman numerals, named progressions and usage statistics
//!
//! ## Quick Start
//!
//! ```no_run
//! use harmoniq::{analyze_samples, SessionConfig, StftChromaExtractor};
//!
//! // Mono samples at the configured rate (22050 Hz by default)
//! let samples: Vec<f32> = vec![];
//!
//! let summary = analyze_samples(&samples, SessionConfig::default(), StftChromaExtractor::default())?;
//! println!("Key: {:?}", summary.key.label);
//! println!("Progression: {}", summary.roman_sequence.join(" - "));
//! # Ok::<(), harmoniq::AnalysisError>(())
//! ```
//!
//! For live input, start a [`Session`], push samples through its [`SampleSink`] and read
//! [`SessionEvent`]s from the returned channel.
//!
//! ## Architecture
//!
//! ```text
//! Samples → Frame Buffer → Silence Gate → Chroma → Chord Match → Key Tracker → Progressions
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::engine::ChordEngine;
pub use analysis::result::{
    ChordEvent, ChordLabel, ChordUsage, Key, KeyState, SessionEvent, SessionSummary, WindowStats,
};
pub use analysis::session::{SampleSink, Session};
pub use config::SessionConfig;
pub use error::AnalysisError;
pub use features::chroma::{ChromaExtractor, StftChromaExtractor};

/// Analyse a complete recording offline
///
/// Feeds `samples` through a [`ChordEngine`] one hop at a time, timestamping each window by
/// its position in the stream rather than by wall clock, so results are reproducible.
///
/// # Arguments
///
/// * `samples` - Mono audio samples at `config.sample_rate`, normalized to [-1.0, 1.0]
/// * `config` - Session configuration
/// * `extractor` - Chroma extractor to use
///
/// # Returns
///
/// The session summary after the last complete window
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty input and `AnalysisError::InvalidConfig`
/// for an invalid configuration. Individual window failures are logged and skipped.
pub fn analyze_samples<E: ChromaExtractor>(
    samples: &[f32],
    config: SessionConfig,
    extractor: E,
) -> Result<SessionSummary, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }

    let sample_rate = config.sample_rate as f64;
    let chunk = config.hop_size;
    let mut engine = ChordEngine::new(config, extractor)?;

    log::debug!(
        "Offline analysis: {} samples ({:.1}s)",
        samples.len(),
        samples.len() as f64 / sample_rate
    );

    let mut pushed = 0usize;
    for block in samples.chunks(chunk) {
        engine.push_samples(block);
        pushed += block.len();
        engine.process_available(pushed as f64 / sample_rate);
    }

    let duration = samples.len() as f64 / sample_rate;
    engine.finish(duration);
    let summary = engine.summary(duration);

    log::debug!(
        "Offline analysis done: {} chords, {} windows processed, {} silent, {} failed",
        summary.total_chords,
        summary.windows.processed,
        summary.windows.silent,
        summary.windows.failed
    );
    Ok(summary)
}
