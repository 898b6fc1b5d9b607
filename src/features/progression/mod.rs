//! Progression analysis
//!
//! Turns committed chord history into Roman numeral sequences, names common progressions
//! and aggregates usage statistics for session summaries.

pub mod patterns;
pub mod statistics;

pub use patterns::{detect_pattern, COMMON_PROGRESSIONS};
pub use statistics::{detected_patterns, roman_sequence, session_summary, usage_statistics};

use crate::analysis::history::ChordHistory;
use crate::analysis::result::{KeyState, SessionSummary};

/// Progression analyzer configured with the minimum sequence length for pattern reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionAnalyzer {
    min_pattern_chords: usize,
}

impl Default for ProgressionAnalyzer {
    fn default() -> Self {
        Self::new(4)
    }
}

impl ProgressionAnalyzer {
    /// Report patterns only once at least `min_pattern_chords` chords are in the sequence
    pub fn new(min_pattern_chords: usize) -> Self {
        Self { min_pattern_chords }
    }

    /// Pattern formed by the tail of the current history under `key_state`
    pub fn current_pattern(&self, history: &ChordHistory, key_state: &KeyState) -> Option<String> {
        let roman = roman_sequence(history.entries(), key_state);
        if roman.len() < self.min_pattern_chords {
            return None;
        }
        detect_pattern(&roman)
    }

    /// Summary of the retained history
    pub fn summarize(
        &self,
        history: &ChordHistory,
        key_state: &KeyState,
        duration: f64,
    ) -> SessionSummary {
        session_summary(&history.to_vec(), key_state, duration, self.min_pattern_chords)
    }
}
