//! Diatonic key templates
//!
//! Triads built on each scale degree for the 24 keys. Major keys use the major scale;
//! minor keys use the natural minor scale (no raised leading tone).

use crate::analysis::result::Key;
use crate::features::chords::templates::ChordQuality;

/// Scale-degree triads of a major key: (semitones above tonic, quality)
pub const MAJOR_SCALE_TRIADS: [(usize, ChordQuality); 7] = [
    (0, ChordQuality::Major),
    (2, ChordQuality::Minor),
    (4, ChordQuality::Minor),
    (5, ChordQuality::Major),
    (7, ChordQuality::Major),
    (9, ChordQuality::Minor),
    (11, ChordQuality::Diminished),
];

/// Scale-degree triads of a natural minor key
pub const MINOR_SCALE_TRIADS: [(usize, ChordQuality); 7] = [
    (0, ChordQuality::Minor),
    (2, ChordQuality::Diminished),
    (3, ChordQuality::Major),
    (5, ChordQuality::Minor),
    (7, ChordQuality::Minor),
    (8, ChordQuality::Major),
    (10, ChordQuality::Major),
];

/// Roman numerals for the major-scale degrees
pub const MAJOR_NUMERALS: [&str; 7] = ["I", "ii", "iii", "IV", "V", "vi", "vii°"];

/// Roman numerals for the natural-minor degrees
pub const MINOR_NUMERALS: [&str; 7] = ["i", "ii°", "III", "iv", "v", "VI", "VII"];

/// Scale degrees that count double when scoring a key (tonic and dominant)
pub const STRONG_DEGREES: [usize; 2] = [0, 4];

/// Diatonic triads of `key` as (root pitch class, quality), in scale-degree order
pub fn diatonic_triads(key: Key) -> [(usize, ChordQuality); 7] {
    let table = if key.is_major() {
        &MAJOR_SCALE_TRIADS
    } else {
        &MINOR_SCALE_TRIADS
    };
    let tonic = key.tonic();
    let mut triads = *table;
    for (triad, (interval, _)) in triads.iter_mut().zip(table.iter()) {
        triad.0 = (tonic + interval) % 12;
    }
    triads
}

/// Scale degree (0-6) of a triad within `key`, if it is diatonic
pub fn scale_degree(key: Key, root: usize, triad: ChordQuality) -> Option<usize> {
    diatonic_triads(key)
        .iter()
        .position(|&(pc, quality)| pc == root % 12 && quality == triad)
}

/// Roman numerals for the degrees of `key`
pub fn numerals(key: Key) -> &'static [&'static str; 7] {
    if key.is_major() {
        &MAJOR_NUMERALS
    } else {
        &MINOR_NUMERALS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_major_triads() {
        let triads = diatonic_triads(Key::Major(0));
        assert_eq!(triads[0], (0, ChordQuality::Major));
        assert_eq!(triads[4], (7, ChordQuality::Major));
        assert_eq!(triads[6], (11, ChordQuality::Diminished));
    }

    #[test]
    fn test_relative_keys_share_triads() {
        let mut major: Vec<_> = diatonic_triads(Key::Major(0)).to_vec();
        let mut minor: Vec<_> = diatonic_triads(Key::Minor(9)).to_vec();
        major.sort_by_key(|(pc, _)| *pc);
        minor.sort_by_key(|(pc, _)| *pc);
        assert_eq!(major, minor);
    }

    #[test]
    fn test_scale_degree() {
        assert_eq!(scale_degree(Key::Major(0), 7, ChordQuality::Major), Some(4));
        assert_eq!(scale_degree(Key::Major(0), 7, ChordQuality::Minor), None);
        assert_eq!(scale_degree(Key::Minor(9), 4, ChordQuality::Minor), Some(4));
    }
}
