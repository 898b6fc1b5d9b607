//! Key tracking over a live chord stream
//!
//! # Algorithm
//!
//! 1. A chord event is committed to history when its label is known, differs from the last
//!    committed chord, and its confidence exceeds the commit threshold
//! 2. Every `key_eval_interval` commits, the last `key_window` history entries are scored
//! 3. A candidate replaces the committed key only if its score exceeds `key_commit_score`
//!    and strictly beats the committed key's own score on the same window
//!
//! The last gate gives the committed key hysteresis: weak or merely tied evidence never
//! overrides it.

use crate::analysis::history::{ChordHistory, ChordHistoryEntry};
use crate::analysis::result::{ChordEvent, ChordLabel, KeyState};
use crate::config::{clamp_unit, SessionConfig};
use crate::error::AnalysisError;

use super::detector::detect_key;

/// What a single observation changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerUpdate {
    /// The newly committed (open) history entry, if the event was a chord change
    pub committed: Option<ChordHistoryEntry>,
    /// The new key state, if the committed key changed
    pub key_changed: Option<KeyState>,
}

/// Commits chord changes to history and maintains the session key
#[derive(Debug, Clone)]
pub struct KeyTracker {
    history: ChordHistory,
    key_state: KeyState,
    commit_threshold: f32,
    key_window: usize,
    key_eval_interval: u64,
    key_min_score: f32,
    key_commit_score: f32,
}

impl KeyTracker {
    /// Create a tracker with the history and key settings of `config`
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            history: ChordHistory::new(config.history_capacity),
            key_state: KeyState::undetected(),
            commit_threshold: config.commit_threshold,
            key_window: config.key_window,
            key_eval_interval: config.key_eval_interval.max(1) as u64,
            key_min_score: config.key_min_score,
            key_commit_score: config.key_commit_score,
        }
    }

    /// Feed one classified window
    pub fn observe(&mut self, event: &ChordEvent) -> TrackerUpdate {
        let label = match &event.label {
            ChordLabel::Known(label) => label,
            ChordLabel::Unknown => return TrackerUpdate::default(),
        };
        if event.confidence <= self.commit_threshold {
            return TrackerUpdate::default();
        }
        if self.history.last().map_or(false, |last| &last.chord == label) {
            return TrackerUpdate::default();
        }

        let entry = self
            .history
            .commit(label, event.timestamp, event.confidence)
            .clone();
        log::debug!(
            "Committed chord {} @ {:.2}s (confidence {:.3})",
            entry.chord,
            entry.start_time,
            entry.confidence
        );

        let key_changed = if self.history.total_committed() % self.key_eval_interval == 0 {
            self.evaluate_key()
        } else {
            None
        };

        TrackerUpdate {
            committed: Some(entry),
            key_changed,
        }
    }

    /// Score the recent history and commit a new key if the evidence is strong enough
    ///
    /// Returns the new state only when the committed key changes. Re-detecting the current key
    /// refreshes its confidence without reporting a change.
    pub fn evaluate_key(&mut self) -> Option<KeyState> {
        let recent = self.history.recent_labels(self.key_window);
        let detection = detect_key(&recent, self.key_min_score);

        let key = detection.key?;
        if detection.score <= self.key_commit_score {
            log::debug!(
                "Key candidate {} ({:.3}) below commit score {:.3}",
                key.label(),
                detection.score,
                self.key_commit_score
            );
            return None;
        }

        if let Some(current) = self.key_state.key {
            let current_score = detection
                .all_scores
                .iter()
                .find(|(k, _)| *k == current)
                .map_or(0.0, |&(_, score)| score);
            if current == key || detection.score <= current_score {
                if current != key {
                    log::debug!(
                        "Key candidate {} ({:.3}) does not beat {} ({:.3})",
                        key.label(),
                        detection.score,
                        current.label(),
                        current_score
                    );
                }
                self.key_state.confidence = current_score;
                return None;
            }
        }

        log::info!(
            "Key changed: {} -> {} (score {:.3})",
            self.key_state.label.as_deref().unwrap_or("none"),
            key.label(),
            detection.score
        );
        self.key_state = KeyState::detected(key, detection.score);
        Some(self.key_state.clone())
    }

    /// Close the open history entry at `end_time`
    pub fn finish(&mut self, end_time: f64) {
        self.history.finalize_open(end_time);
    }

    /// Committed key
    pub fn key_state(&self) -> &KeyState {
        &self.key_state
    }

    /// Committed chord history
    pub fn history(&self) -> &ChordHistory {
        &self.history
    }

    /// Current commit threshold
    pub fn commit_threshold(&self) -> f32 {
        self.commit_threshold
    }

    /// Replace the commit threshold, clamped into [0, 1]
    pub fn set_commit_threshold(&mut self, threshold: f32) -> Result<f32, AnalysisError> {
        self.commit_threshold = clamp_unit("commit_threshold", threshold)?;
        Ok(self.commit_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::Key;

    fn event(label: &str, confidence: f32, timestamp: f64) -> ChordEvent {
        ChordEvent {
            label: ChordLabel::Known(label.to_string()),
            confidence,
            volume: 0.2,
            timestamp,
        }
    }

    #[test]
    fn test_repeated_chord_not_committed() {
        let mut tracker = KeyTracker::new(&SessionConfig::default());
        assert!(tracker.observe(&event("C", 0.9, 0.0)).committed.is_some());
        assert!(tracker.observe(&event("C", 0.95, 0.75)).committed.is_none());
        assert_eq!(tracker.history().len(), 1);
    }

    #[test]
    fn test_low_confidence_and_unknown_ignored() {
        let mut tracker = KeyTracker::new(&SessionConfig::default());
        assert!(tracker.observe(&event("C", 0.7, 0.0)).committed.is_none());
        let unknown = ChordEvent {
            label: ChordLabel::Unknown,
            confidence: 0.99,
            volume: 0.2,
            timestamp: 0.0,
        };
        assert!(tracker.observe(&unknown).committed.is_none());
        assert!(tracker.history().is_empty());
    }

    #[test]
    fn test_key_committed_on_third_chord() {
        let mut tracker = KeyTracker::new(&SessionConfig::default());
        assert!(tracker.observe(&event("C", 0.9, 0.0)).key_changed.is_none());
        assert!(tracker.observe(&event("F", 0.9, 2.0)).key_changed.is_none());

        let update = tracker.observe(&event("G", 0.9, 4.0));
        let state = update.key_changed.expect("key should be committed");
        assert_eq!(state.key, Some(Key::Major(0)));
        assert_eq!(state.label.as_deref(), Some("C major"));
        assert!((state.confidence - 5.0 / 3.0).abs() < 1e-6);

        // Fourth chord: no evaluation, key unchanged
        let update = tracker.observe(&event("C", 0.9, 6.0));
        assert!(update.key_changed.is_none());
        assert_eq!(tracker.key_state().key, Some(Key::Major(0)));
    }

    #[test]
    fn test_weak_evidence_does_not_override_key() {
        let mut config = SessionConfig::default();
        config.key_window = 3;
        config.key_min_score = 0.0;
        let mut tracker = KeyTracker::new(&config);
        for (i, chord) in ["C", "F", "G"].iter().enumerate() {
            tracker.observe(&event(chord, 0.9, i as f64));
        }
        assert_eq!(tracker.key_state().key, Some(Key::Major(0)));

        // Diminished chords never sit on a strong degree: best candidate (C# major) scores 1/3
        for (i, chord) in ["C#dim", "Cdim", "D#dim"].iter().enumerate() {
            let update = tracker.observe(&event(chord, 0.9, 3.0 + i as f64));
            assert!(update.committed.is_some());
            assert!(update.key_changed.is_none());
        }
        assert_eq!(tracker.key_state().key, Some(Key::Major(0)));
        assert!((tracker.key_state().confidence - 5.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_tied_relative_key_does_not_replace_committed_key() {
        let mut tracker = KeyTracker::new(&SessionConfig::default());
        let mut changes = Vec::new();
        for (i, chord) in ["Am", "Dm", "Em", "C", "Dm", "C"].iter().enumerate() {
            if let Some(state) = tracker.observe(&event(chord, 0.9, i as f64)).key_changed {
                changes.push(state.key);
            }
        }
        // A minor and C major both score 8/6 on the second evaluation
        assert_eq!(changes, vec![Some(Key::Minor(9))]);
        assert_eq!(tracker.key_state().key, Some(Key::Minor(9)));
        assert!((tracker.key_state().confidence - 8.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_key_modulates_on_strong_evidence() {
        let mut tracker = KeyTracker::new(&SessionConfig::default());
        let chords = ["C", "F", "G", "D", "A", "E", "A", "D", "E"];
        let mut changes = Vec::new();
        for (i, chord) in chords.iter().enumerate() {
            if let Some(state) = tracker.observe(&event(chord, 0.9, i as f64)).key_changed {
                changes.push(state.key);
            }
        }
        assert_eq!(changes.first(), Some(&Some(Key::Major(0))));
        assert_eq!(tracker.key_state().key, Some(Key::Major(9)));
    }

    #[test]
    fn test_finish_closes_open_entry() {
        let mut tracker = KeyTracker::new(&SessionConfig::default());
        tracker.observe(&event("C", 0.9, 1.0));
        tracker.finish(3.5);
        let last = tracker.history().last().unwrap();
        assert!(last.finalized);
        assert!((last.duration - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_set_commit_threshold() {
        let mut tracker = KeyTracker::new(&SessionConfig::default());
        tracker.set_commit_threshold(0.95).unwrap();
        assert!(tracker.observe(&event("C", 0.9, 0.0)).committed.is_none());
        assert_eq!(tracker.set_commit_threshold(3.0).unwrap(), 1.0);
    }
}
