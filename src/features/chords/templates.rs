//! Chord templates
//!
//! Binary pitch-class patterns for 12 roots × 6 qualities, built from interval sets and
//! transposed to every root. The bank is an immutable value: build it once and share it.

use serde::{Deserialize, Serialize};

use crate::features::chroma::normalization::l2_normalize;
use crate::features::chroma::{N_PITCH_CLASSES, PITCH_CLASS_NAMES};

/// Flat spellings for the five black keys (pitch class, name)
pub const FLAT_SPELLINGS: [(usize, &str); 5] =
    [(1, "Db"), (3, "Eb"), (6, "Gb"), (8, "Ab"), (10, "Bb")];

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    /// Major triad (0, 4, 7)
    Major,
    /// Minor triad (0, 3, 7)
    Minor,
    /// Major seventh (0, 4, 7, 11)
    MajorSeventh,
    /// Minor seventh (0, 3, 7, 10)
    MinorSeventh,
    /// Dominant seventh (0, 4, 7, 10)
    DominantSeventh,
    /// Diminished triad (0, 3, 6)
    Diminished,
}

impl ChordQuality {
    /// All qualities in catalog order
    pub const ALL: [ChordQuality; 6] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::MajorSeventh,
        ChordQuality::MinorSeventh,
        ChordQuality::DominantSeventh,
        ChordQuality::Diminished,
    ];

    /// Semitone intervals above the root
    pub fn intervals(self) -> &'static [usize] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::MajorSeventh => &[0, 4, 7, 11],
            ChordQuality::MinorSeventh => &[0, 3, 7, 10],
            ChordQuality::DominantSeventh => &[0, 4, 7, 10],
            ChordQuality::Diminished => &[0, 3, 6],
        }
    }

    /// Label suffix appended to the root name ("", "m", "maj7", "m7", "7", "dim")
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::MajorSeventh => "maj7",
            ChordQuality::MinorSeventh => "m7",
            ChordQuality::DominantSeventh => "7",
            ChordQuality::Diminished => "dim",
        }
    }

    /// The triad this chord reduces to once the seventh is stripped
    pub fn base_triad(self) -> ChordQuality {
        match self {
            ChordQuality::Major | ChordQuality::MajorSeventh | ChordQuality::DominantSeventh => {
                ChordQuality::Major
            }
            ChordQuality::Minor | ChordQuality::MinorSeventh => ChordQuality::Minor,
            ChordQuality::Diminished => ChordQuality::Diminished,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|q| q.suffix() == suffix)
    }
}

/// A single chord template
#[derive(Debug, Clone, PartialEq)]
pub struct ChordTemplate {
    /// Chord label, e.g. "C#m7"
    pub label: String,
    /// Root pitch class (0 = C)
    pub root: usize,
    /// Chord quality
    pub quality: ChordQuality,
    /// Binary pitch-class membership (1.0 for chord tones)
    pub pitch_class_weights: [f32; N_PITCH_CLASSES],
    /// `pitch_class_weights` scaled to unit L2 norm
    pub normalized: [f32; N_PITCH_CLASSES],
}

impl ChordTemplate {
    /// Build the template for `root` and `quality`, spelled as `root_name`
    pub fn new(root_name: &str, root: usize, quality: ChordQuality) -> Self {
        let root = root % N_PITCH_CLASSES;
        let mut weights = [0.0f32; N_PITCH_CLASSES];
        for &interval in quality.intervals() {
            weights[(root + interval) % N_PITCH_CLASSES] = 1.0;
        }

        let mut normalized = [0.0f32; N_PITCH_CLASSES];
        normalized.copy_from_slice(&l2_normalize(&weights, 0.0));

        Self {
            label: format!("{}{}", root_name, quality.suffix()),
            root,
            quality,
            pitch_class_weights: weights,
            normalized,
        }
    }
}

/// Ordered, immutable catalog of chord templates
///
/// Enumeration order is fixed (quality-major, then root C..B, canonical sharp spellings
/// before any flat aliases), so matching is reproducible and ties favour sharp spellings.
#[derive(Debug, Clone)]
pub struct ChordTemplateBank {
    templates: Vec<ChordTemplate>,
}

impl Default for ChordTemplateBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ChordTemplateBank {
    /// The 72 canonical templates (12 roots × 6 qualities, sharp spellings)
    pub fn new() -> Self {
        let mut templates = Vec::with_capacity(N_PITCH_CLASSES * ChordQuality::ALL.len());
        for quality in ChordQuality::ALL {
            for (root, name) in PITCH_CLASS_NAMES.iter().enumerate() {
                templates.push(ChordTemplate::new(name, root, quality));
            }
        }
        Self { templates }
    }

    /// The canonical catalog followed by flat-spelled duplicates (Db, Eb, Gb, Ab, Bb)
    pub fn with_enharmonics() -> Self {
        let mut bank = Self::new();
        for quality in ChordQuality::ALL {
            for (root, name) in FLAT_SPELLINGS {
                bank.templates.push(ChordTemplate::new(name, root, quality));
            }
        }
        bank
    }

    /// Build the catalog selected by a session's configuration
    pub fn from_config(include_enharmonic_spellings: bool) -> Self {
        if include_enharmonic_spellings {
            Self::with_enharmonics()
        } else {
            Self::new()
        }
    }

    /// All templates in enumeration order
    pub fn templates(&self) -> &[ChordTemplate] {
        &self.templates
    }

    /// All labels in enumeration order
    pub fn labels(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.label.as_str()).collect()
    }

    /// Look up a template by label
    pub fn get(&self, label: &str) -> Option<&ChordTemplate> {
        self.templates.iter().find(|t| t.label == label)
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Pitch class of a note name ("C", "F#", "Bb", ...)
pub fn pitch_class_of(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    let base = match chars.next()? {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let pc = match chars.as_str() {
        "" => base,
        "#" => base + 1,
        "b" => base + 11,
        _ => return None,
    };
    Some(pc % N_PITCH_CLASSES)
}

/// Split a chord label into root pitch class and quality
///
/// Accepts both spellings of black-key roots ("C#m7", "Dbm7"). Returns `None` for labels
/// outside the template vocabulary, including "Unknown".
pub fn parse_chord(label: &str) -> Option<(usize, ChordQuality)> {
    let root_len = match label.as_bytes().get(1) {
        Some(b'#') | Some(b'b') => 2,
        _ => 1,
    };
    if label.len() < root_len || !label.is_char_boundary(root_len) {
        return None;
    }
    let (root, suffix) = label.split_at(root_len);
    Some((pitch_class_of(root)?, ChordQuality::from_suffix(suffix)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_order() {
        let bank = ChordTemplateBank::new();
        assert_eq!(bank.len(), 72);
        assert_eq!(bank.templates()[0].label, "C");
        assert_eq!(bank.templates()[1].label, "C#");
        assert_eq!(bank.templates()[12].label, "Cm");
        assert_eq!(bank.templates()[71].label, "Bdim");

        let bank = ChordTemplateBank::with_enharmonics();
        assert_eq!(bank.len(), 72 + 30);
        assert!(bank.get("Ebm7").is_some());
        assert!(bank.get("Cb").is_none());
    }

    #[test]
    fn test_interval_count_per_template() {
        let bank = ChordTemplateBank::with_enharmonics();
        for template in bank.templates() {
            let nonzero = template
                .pitch_class_weights
                .iter()
                .filter(|&&w| w != 0.0)
                .count();
            assert_eq!(
                nonzero,
                template.quality.intervals().len(),
                "template {} has {} chord tones",
                template.label,
                nonzero
            );
        }
    }

    #[test]
    fn test_templates_have_unit_norm() {
        let bank = ChordTemplateBank::new();
        for template in bank.templates() {
            let norm: f32 = template.normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-6, "{} norm {}", template.label, norm);
        }
    }

    #[test]
    fn test_enharmonic_templates_identical() {
        let bank = ChordTemplateBank::with_enharmonics();
        let sharp = bank.get("C#7").unwrap();
        let flat = bank.get("Db7").unwrap();
        assert_eq!(sharp.pitch_class_weights, flat.pitch_class_weights);
    }

    #[test]
    fn test_known_patterns() {
        let bank = ChordTemplateBank::new();
        let g7 = bank.get("G7").unwrap();
        // G B D F
        for pc in [7, 11, 2, 5] {
            assert_eq!(g7.pitch_class_weights[pc], 1.0);
        }
        let bdim = bank.get("Bdim").unwrap();
        for pc in [11, 2, 5] {
            assert_eq!(bdim.pitch_class_weights[pc], 1.0);
        }
    }

    #[test]
    fn test_parse_chord() {
        assert_eq!(parse_chord("C"), Some((0, ChordQuality::Major)));
        assert_eq!(parse_chord("F#dim"), Some((6, ChordQuality::Diminished)));
        assert_eq!(parse_chord("Bbmaj7"), Some((10, ChordQuality::MajorSeventh)));
        assert_eq!(parse_chord("Ebm7"), Some((3, ChordQuality::MinorSeventh)));
        assert_eq!(parse_chord("G7"), Some((7, ChordQuality::DominantSeventh)));
        assert_eq!(parse_chord("Am"), Some((9, ChordQuality::Minor)));
        assert_eq!(parse_chord("Unknown"), None);
        assert_eq!(parse_chord("H"), None);
        assert_eq!(parse_chord(""), None);
        assert_eq!(parse_chord("Csus4"), None);
    }
}
