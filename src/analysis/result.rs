//! Analysis result types
//!
//! Values published by a session: per-window chord events, key state, live session events and
//! the session summary. All of them are plain data with serde support so a transport layer can
//! forward them as-is.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::history::ChordHistoryEntry;
use crate::features::chords::templates::FLAT_SPELLINGS;
use crate::features::chroma::PITCH_CLASS_NAMES;
use crate::features::key::templates::diatonic_triads;

/// Label reported for a window, or `Unknown` when no template clears the detection threshold
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordLabel {
    /// Matched chord label, e.g. "G7"
    Known(String),
    /// No template matched well enough
    Unknown,
}

impl ChordLabel {
    /// Label text ("Unknown" for the unknown label)
    pub fn as_str(&self) -> &str {
        match self {
            ChordLabel::Known(label) => label,
            ChordLabel::Unknown => "Unknown",
        }
    }

    /// True for `ChordLabel::Unknown`
    pub fn is_unknown(&self) -> bool {
        matches!(self, ChordLabel::Unknown)
    }
}

impl fmt::Display for ChordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified analysis window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEvent {
    /// Matched chord or `Unknown`
    pub label: ChordLabel,
    /// Best template similarity (0.0-1.0), reported even for `Unknown`
    pub confidence: f32,
    /// RMS volume of the window
    pub volume: f32,
    /// Seconds since session start at emission
    pub timestamp: f64,
}

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key (0 = C, 1 = C#/Db, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

impl Key {
    /// All 24 keys: the 12 major keys from C, then the 12 minor keys from C
    pub fn all() -> impl Iterator<Item = Key> {
        (0..12)
            .map(Key::Major)
            .chain((0..12).map(Key::Minor))
    }

    /// Tonic pitch class (0-11)
    pub fn tonic(&self) -> usize {
        match self {
            Key::Major(i) | Key::Minor(i) => *i as usize % 12,
        }
    }

    /// True for major keys
    pub fn is_major(&self) -> bool {
        matches!(self, Key::Major(_))
    }

    /// Whether note names in this key are conventionally spelled with flats
    pub fn prefers_flats(&self) -> bool {
        match self {
            // F, Bb, Eb, Ab, Db
            Key::Major(_) => matches!(self.tonic(), 5 | 10 | 3 | 8 | 1),
            // D, G, C, F, Bb, Eb
            Key::Minor(_) => matches!(self.tonic(), 2 | 7 | 0 | 5 | 10 | 3),
        }
    }

    /// Spell a pitch class the way this key would
    pub fn spell(&self, pitch_class: usize) -> &'static str {
        spell_pitch_class(pitch_class, self.prefers_flats())
    }

    /// Short key name (e.g., "C", "Am", "Bb", "F#m")
    ///
    /// # Example
    ///
    /// ```
    /// use harmoniq::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).name(), "C");
    /// assert_eq!(Key::Major(10).name(), "Bb");
    /// assert_eq!(Key::Minor(9).name(), "Am");
    /// assert_eq!(Key::Minor(6).name(), "F#m");
    /// ```
    pub fn name(&self) -> String {
        let tonic = self.spell(self.tonic());
        match self {
            Key::Major(_) => tonic.to_string(),
            Key::Minor(_) => format!("{}m", tonic),
        }
    }

    /// Full key label (e.g., "G major", "E minor")
    pub fn label(&self) -> String {
        let mode = if self.is_major() { "major" } else { "minor" };
        format!("{} {}", self.spell(self.tonic()), mode)
    }

    /// Parse a label produced by [`Key::label`]; either spelling of the tonic is accepted
    ///
    /// ```
    /// use harmoniq::analysis::result::Key;
    ///
    /// assert_eq!(Key::from_label("C major"), Some(Key::Major(0)));
    /// assert_eq!(Key::from_label("D# minor"), Some(Key::Minor(3)));
    /// assert_eq!(Key::from_label("H major"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        let (tonic, mode) = label.trim().split_once(' ')?;
        let pc = crate::features::chords::templates::pitch_class_of(tonic)? as u32;
        match mode.trim() {
            "major" => Some(Key::Major(pc)),
            "minor" => Some(Key::Minor(pc)),
            _ => None,
        }
    }

    /// The seven diatonic triads of the key, spelled for the key (e.g. C Dm Em F G Am Bdim)
    pub fn diatonic_chords(&self) -> Vec<String> {
        diatonic_triads(*self)
            .iter()
            .map(|(pc, quality)| format!("{}{}", self.spell(*pc), quality.suffix()))
            .collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Name of a pitch class with sharp or flat spelling
pub fn spell_pitch_class(pitch_class: usize, flats: bool) -> &'static str {
    let pc = pitch_class % 12;
    if flats {
        if let Some((_, name)) = FLAT_SPELLINGS.iter().find(|(p, _)| *p == pc) {
            return name;
        }
    }
    PITCH_CLASS_NAMES[pc]
}

/// Committed key of a session
///
/// `confidence` is always the score of `key` at the moment it was last accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyState {
    /// Committed key, `None` until one has been detected
    pub key: Option<Key>,
    /// Key label (e.g. "G major"), `None` until detected
    pub label: Option<String>,
    /// Score of the committed key
    pub confidence: f32,
    /// Diatonic triads of the committed key
    pub diatonic_chords: Vec<String>,
}

impl Default for KeyState {
    fn default() -> Self {
        Self::undetected()
    }
}

impl KeyState {
    /// No key detected yet
    pub fn undetected() -> Self {
        Self {
            key: None,
            label: None,
            confidence: 0.0,
            diatonic_chords: Vec::new(),
        }
    }

    /// A committed key with its score
    pub fn detected(key: Key, confidence: f32) -> Self {
        Self {
            key: Some(key),
            label: Some(key.label()),
            confidence,
            diatonic_chords: key.diatonic_chords(),
        }
    }

    /// True once a key has been committed
    pub fn is_detected(&self) -> bool {
        self.key.is_some()
    }
}

/// Frequency of one chord in the session history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordUsage {
    /// Number of history entries with this chord
    pub count: usize,
    /// Share of all counted entries, in percent (0-100)
    pub percentage: f32,
}

/// Window counters maintained by the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Windows that produced a chord event
    pub processed: u64,
    /// Windows skipped by the silence gate
    pub silent: u64,
    /// Windows dropped after an extraction or classification failure
    pub failed: u64,
}

/// Aggregate view of a session, available at any time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session length in seconds
    pub duration: f64,
    /// Committed chords in the retained history
    pub total_chords: usize,
    /// Distinct chord labels in the retained history
    pub unique_chords: usize,
    /// Committed key
    pub key: KeyState,
    /// History rendered as Roman numerals under the committed key (chord labels without a key)
    pub roman_sequence: Vec<String>,
    /// Named progressions recognised while the sequence grew, in order of first appearance
    pub detected_patterns: Vec<String>,
    /// Chord usage over finalized entries, keyed by chord label
    pub usage_statistics: BTreeMap<String, ChordUsage>,
    /// Pipeline window counters
    pub windows: WindowStats,
}

/// Live events published to a session listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A non-silent window was classified
    ChordDetected {
        /// The classified window
        event: ChordEvent,
        /// Roman numeral under the committed key, if any
        roman: Option<String>,
    },
    /// A chord change was committed to history
    ChordChanged {
        /// The newly opened history entry
        entry: ChordHistoryEntry,
        /// Roman numeral under the committed key, or the bare label without one
        roman: String,
        /// Progression pattern matching the tail of the history, if any
        pattern: Option<String>,
    },
    /// The key tracker committed a new key
    KeyChanged(KeyState),
}
