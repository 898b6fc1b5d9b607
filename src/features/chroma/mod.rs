//! Chroma extraction modules
//!
//! Pitch-class distribution (12 semitones) for each analysis window:
//! - The `ChromaExtractor` collaborator seam and a default STFT implementation
//! - L2 normalization
//! - Temporal aggregation of per-frame chroma into one vector per window

pub mod extractor;
pub mod normalization;
pub mod smoothing;

pub use extractor::{ChromaExtractor, StftChromaExtractor};

/// Number of pitch classes in a chroma vector
pub const N_PITCH_CLASSES: usize = 12;

/// Pitch class names, index 0 = C
pub const PITCH_CLASS_NAMES: [&str; N_PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
