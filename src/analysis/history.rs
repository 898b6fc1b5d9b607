//! Committed chord history
//!
//! A bounded log of immutable entries. Only the newest entry can be open (duration not yet
//! known); committing the next chord replaces it with a finalized copy.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One committed chord change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordHistoryEntry {
    /// Chord label
    pub chord: String,
    /// Seconds since session start when the chord was committed
    pub start_time: f64,
    /// Classifier confidence at commit time
    pub confidence: f32,
    /// How long the chord lasted; 0.0 while the entry is open
    pub duration: f64,
    /// False for the open (most recent) entry
    pub finalized: bool,
}

impl ChordHistoryEntry {
    fn open(chord: String, start_time: f64, confidence: f32) -> Self {
        Self {
            chord,
            start_time,
            confidence,
            duration: 0.0,
            finalized: false,
        }
    }

    fn finalized_at(&self, end_time: f64) -> Self {
        Self {
            duration: (end_time - self.start_time).max(0.0),
            finalized: true,
            ..self.clone()
        }
    }
}

/// Bounded chord history with at most one open entry
#[derive(Debug, Clone)]
pub struct ChordHistory {
    entries: VecDeque<ChordHistoryEntry>,
    capacity: usize,
    total_committed: u64,
}

impl ChordHistory {
    /// Empty history retaining at most `capacity` entries (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total_committed: 0,
        }
    }

    /// Finalize the open entry at `start_time` and append a new open entry
    ///
    /// The oldest entry is evicted once the capacity is exceeded.
    pub fn commit(&mut self, chord: &str, start_time: f64, confidence: f32) -> &ChordHistoryEntry {
        self.finalize_open(start_time);
        self.entries
            .push_back(ChordHistoryEntry::open(chord.to_string(), start_time, confidence));
        if self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::debug!("History full, evicted {} @ {:.2}s", evicted.chord, evicted.start_time);
            }
        }
        self.total_committed += 1;
        &self.entries[self.entries.len() - 1]
    }

    /// Close the open entry, if any, with its duration measured up to `end_time`
    pub fn finalize_open(&mut self, end_time: f64) -> Option<&ChordHistoryEntry> {
        let last = self.entries.back_mut()?;
        if last.finalized {
            return None;
        }
        *last = last.finalized_at(end_time);
        Some(&*last)
    }

    /// The open entry, if any
    pub fn open_entry(&self) -> Option<&ChordHistoryEntry> {
        self.entries.back().filter(|e| !e.finalized)
    }

    /// Most recently committed entry
    pub fn last(&self) -> Option<&ChordHistoryEntry> {
        self.entries.back()
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ChordHistoryEntry> {
        self.entries.iter()
    }

    /// Snapshot of the retained entries
    pub fn to_vec(&self) -> Vec<ChordHistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Labels of the last `n` entries, oldest first
    pub fn recent_labels(&self, n: usize) -> Vec<&str> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).map(|e| e.chord.as_str()).collect()
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been committed (or everything was evicted)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Commits since creation, including evicted entries
    pub fn total_committed(&self) -> u64 {
        self.total_committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_finalizes_previous() {
        let mut history = ChordHistory::new(30);
        history.commit("C", 0.0, 0.9);
        assert!(history.open_entry().is_some());

        history.commit("F", 2.0, 0.8);
        let entries = history.to_vec();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].finalized);
        assert!((entries[0].duration - 2.0).abs() < 1e-9);
        assert!(!entries[1].finalized);
        assert_eq!(entries[1].duration, 0.0);
    }

    #[test]
    fn test_at_most_one_open_entry() {
        let mut history = ChordHistory::new(5);
        for (i, chord) in ["C", "F", "G", "C", "Am", "Dm", "G7"].iter().enumerate() {
            history.commit(chord, i as f64, 0.9);
            let open = history.entries().filter(|e| !e.finalized).count();
            assert_eq!(open, 1);
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.total_committed(), 7);
        assert_eq!(history.recent_labels(3), vec!["Am", "Dm", "G7"]);
        assert_eq!(history.recent_labels(10).len(), 5);
    }

    #[test]
    fn test_finalize_open_is_idempotent() {
        let mut history = ChordHistory::new(3);
        assert!(history.finalize_open(1.0).is_none());
        history.commit("C", 1.0, 0.9);
        assert!(history.finalize_open(4.0).is_some());
        assert!(history.finalize_open(9.0).is_none());
        assert!((history.last().unwrap().duration - 3.0).abs() < 1e-9);
        assert!(history.open_entry().is_none());
    }

    #[test]
    fn test_negative_duration_clamped() {
        let mut history = ChordHistory::new(3);
        history.commit("C", 5.0, 0.9);
        history.finalize_open(4.0);
        assert_eq!(history.last().unwrap().duration, 0.0);
    }
}
