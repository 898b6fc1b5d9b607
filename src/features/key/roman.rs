//! Roman numeral rendering of chords relative to a key

use super::templates::{numerals, scale_degree};
use crate::analysis::result::Key;
use crate::features::chords::templates::{parse_chord, ChordQuality};

/// Render `chord` as a Roman numeral in `key`
///
/// The seventh is stripped to find the scale degree, then re-attached: "7" for dominant and
/// minor sevenths, "M7" for major sevenths. Chords that are not diatonic to the key (and
/// labels that do not parse) are returned in parentheses.
///
/// # Example
///
/// ```
/// use harmoniq::analysis::result::Key;
/// use harmoniq::features::key::chord_to_roman;
///
/// let c_major = Key::Major(0);
/// assert_eq!(chord_to_roman("G7", &c_major), "V7");
/// assert_eq!(chord_to_roman("Bdim", &c_major), "vii°");
/// assert_eq!(chord_to_roman("Eb", &c_major), "(Eb)");
/// ```
pub fn chord_to_roman(chord: &str, key: &Key) -> String {
    let Some((root, quality)) = parse_chord(chord) else {
        return format!("({})", chord);
    };
    let Some(degree) = scale_degree(*key, root, quality.base_triad()) else {
        return format!("({})", chord);
    };

    let numeral = numerals(*key)[degree];
    let suffix = match quality {
        ChordQuality::MajorSeventh => "M7",
        ChordQuality::DominantSeventh | ChordQuality::MinorSeventh => "7",
        _ => "",
    };
    format!("{}{}", numeral, suffix)
}

/// Render a chord under an optional key; without a key the bare label is kept
pub fn roman_or_label(chord: &str, key: Option<&Key>) -> String {
    match key {
        Some(key) => chord_to_roman(chord, key),
        None => chord.to_string(),
    }
}
