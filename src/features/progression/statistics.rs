//! Chord usage statistics and session summaries

use std::collections::{BTreeMap, BTreeSet};

use super::patterns::detect_pattern;
use crate::analysis::history::ChordHistoryEntry;
use crate::analysis::result::{ChordUsage, KeyState, SessionSummary, WindowStats};
use crate::features::key::roman_or_label;

fn is_chord(entry: &ChordHistoryEntry) -> bool {
    entry.chord != "Unknown"
}

/// Count and share of each chord over finalized entries
///
/// The open entry is excluded until its duration is known. Percentages are relative to the
/// number of counted entries and sum to 100 (up to rounding).
pub fn usage_statistics<'a, I>(history: I) -> BTreeMap<String, ChordUsage>
where
    I: IntoIterator<Item = &'a ChordHistoryEntry>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entry in history
        .into_iter()
        .filter(|e| e.finalized && is_chord(e))
    {
        *counts.entry(entry.chord.clone()).or_insert(0) += 1;
    }

    let total: usize = counts.values().sum();
    counts
        .into_iter()
        .map(|(chord, count)| {
            let percentage = count as f32 * 100.0 / total as f32;
            (chord, ChordUsage { count, percentage })
        })
        .collect()
}

/// Render history as Roman numerals under `key_state` (bare labels when no key is committed)
pub fn roman_sequence<'a, I>(history: I, key_state: &KeyState) -> Vec<String>
where
    I: IntoIterator<Item = &'a ChordHistoryEntry>,
{
    history
        .into_iter()
        .filter(|e| is_chord(e))
        .map(|e| roman_or_label(&e.chord, key_state.key.as_ref()))
        .collect()
}

/// Patterns recognised as the sequence grew, in order of first appearance
///
/// Each prefix of at least `min_chords` numerals is matched as if it were the live tail.
pub fn detected_patterns<S: AsRef<str>>(roman: &[S], min_chords: usize) -> Vec<String> {
    let mut patterns: Vec<String> = Vec::new();
    for end in min_chords.max(1)..=roman.len() {
        if let Some(pattern) = detect_pattern(&roman[..end]) {
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }
    }
    patterns
}

/// Aggregate a session's history into a summary
///
/// Pure function of its inputs; the window counters are left at zero for the caller to fill.
pub fn session_summary(
    history: &[ChordHistoryEntry],
    key_state: &KeyState,
    duration: f64,
    min_pattern_chords: usize,
) -> SessionSummary {
    let roman = roman_sequence(history, key_state);
    let unique: BTreeSet<&str> = history
        .iter()
        .filter(|e| is_chord(e))
        .map(|e| e.chord.as_str())
        .collect();

    SessionSummary {
        duration,
        total_chords: history.iter().filter(|e| is_chord(e)).count(),
        unique_chords: unique.len(),
        key: key_state.clone(),
        detected_patterns: detected_patterns(&roman, min_pattern_chords),
        roman_sequence: roman,
        usage_statistics: usage_statistics(history),
        windows: WindowStats::default(),
    }
}
