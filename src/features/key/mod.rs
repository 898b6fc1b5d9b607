//! Key detection modules
//!
//! Infer the key of a live session from its committed chords:
//! - Diatonic triad tables for the 24 keys (major + natural minor)
//! - Weighted diatonic-membership scoring (tonic and dominant count double)
//! - Roman numeral rendering relative to a key
//! - Key tracking with a commit gate for hysteresis

pub mod detector;
pub mod roman;
pub mod templates;
pub mod tracker;

pub use detector::{detect_key, score_keys};
pub use roman::{chord_to_roman, roman_or_label};
pub use tracker::{KeyTracker, TrackerUpdate};

use crate::analysis::result::Key;

/// Key detection result
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDetectionResult {
    /// Best key, `None` if too few chords or the best score is not above the minimum
    pub key: Option<Key>,

    /// Score of the best key (may exceed 1.0 because of weighted degrees)
    pub score: f32,

    /// All 24 key scores in enumeration order (empty when detection was skipped)
    pub all_scores: Vec<(Key, f32)>,
}
