//! Key detection from a chord sequence
//!
//! Scores all 24 keys against the most recent committed chords. Every chord whose triad is
//! diatonic to a key adds 1 to that key's score, 2 if it sits on the tonic or dominant; the
//! sum is divided by the number of chords. Scores can therefore exceed 1.0.
//!
//! Chord labels are parsed into (root, quality), so "A#" and "Bb" count the same.

use super::templates::{scale_degree, STRONG_DEGREES};
use super::KeyDetectionResult;
use crate::analysis::result::Key;
use crate::features::chords::templates::parse_chord;

/// Minimum number of chords before a key is scored
pub const MIN_CHORDS_FOR_KEY: usize = 3;

/// Score every key against `recent_chords`
///
/// # Arguments
///
/// * `recent_chords` - Chord labels, oldest first ("Unknown" and unparseable labels count
///   towards the denominator but never score)
///
/// # Returns
///
/// All 24 keys with their scores, majors C..B then minors C..B
pub fn score_keys<S: AsRef<str>>(recent_chords: &[S]) -> Vec<(Key, f32)> {
    let parsed: Vec<_> = recent_chords
        .iter()
        .filter_map(|c| parse_chord(c.as_ref()))
        .map(|(root, quality)| (root, quality.base_triad()))
        .collect();
    let total = recent_chords.len().max(1) as f32;

    Key::all()
        .map(|key| {
            let weight: u32 = parsed
                .iter()
                .filter_map(|&(root, triad)| scale_degree(key, root, triad))
                .map(|degree| if STRONG_DEGREES.contains(&degree) { 2 } else { 1 })
                .sum();
            (key, weight as f32 / total)
        })
        .collect()
}

/// Detect the key implied by a short chord sequence
///
/// Returns the best-scoring key (first in major-then-minor order on ties), or `None` when
/// fewer than [`MIN_CHORDS_FOR_KEY`] chords are given or the best score is not above
/// `min_score`.
///
/// # Example
///
/// ```
/// use harmoniq::analysis::result::Key;
/// use harmoniq::features::key::detect_key;
///
/// let result = detect_key(&["C", "F", "G", "C"], 0.4);
/// assert_eq!(result.key, Some(Key::Major(0)));
/// assert!((result.score - 1.75).abs() < 1e-6);
/// ```
pub fn detect_key<S: AsRef<str>>(recent_chords: &[S], min_score: f32) -> KeyDetectionResult {
    if recent_chords.len() < MIN_CHORDS_FOR_KEY {
        log::debug!(
            "Key detection skipped: {} chords (need {})",
            recent_chords.len(),
            MIN_CHORDS_FOR_KEY
        );
        return KeyDetectionResult {
            key: None,
            score: 0.0,
            all_scores: Vec::new(),
        };
    }

    let all_scores = score_keys(recent_chords);

    let mut best: Option<(Key, f32)> = None;
    for &(key, score) in &all_scores {
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((key, score));
        }
    }

    let (key, score) = match best {
        Some((key, score)) if score > min_score => (Some(key), score),
        Some((_, score)) => (None, score),
        None => (None, 0.0),
    };

    log::debug!(
        "Key detection over {} chords: {:?} (score {:.3})",
        recent_chords.len(),
        key.map(|k| k.label()),
        score
    );

    KeyDetectionResult {
        key,
        score,
        all_scores,
    }
}
