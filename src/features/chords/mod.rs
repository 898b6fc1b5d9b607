//! Chord recognition
//!
//! Match an averaged chroma vector against a fixed bank of binary chord templates:
//! - 12 roots × 6 qualities (major, minor, maj7, m7, 7, dim)
//! - Cosine similarity against L2-normalized templates
//! - Detection threshold below which the window is reported as `Unknown`

pub mod classifier;
pub mod templates;

pub use classifier::{ChordClassifier, ChordMatch};
pub use templates::{parse_chord, pitch_class_of, ChordQuality, ChordTemplate, ChordTemplateBank};
