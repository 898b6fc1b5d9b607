//! Named progression catalog and pattern matching
//!
//! Patterns are dash-joined Roman numerals. Matching works on whole numerals, so "I-V" is
//! never found inside "vii°-I" or "IV-V-I" by accident of spelling.

/// Canonical progressions in lookup order (pattern, name)
pub const COMMON_PROGRESSIONS: [(&str, &str); 10] = [
    ("I-V-vi-IV", "Pop progression (Axis)"),
    ("ii-V-I", "Jazz turnaround"),
    ("I-vi-IV-V", "50s progression"),
    ("vi-IV-I-V", "Pop/Rock variant"),
    ("I-IV-V", "Basic Blues"),
    ("vi-ii-V-I", "Circle progression"),
    ("I-iii-vi-IV", "Axis progression"),
    ("V-vi", "Deceptive cadence"),
    ("IV-V-I", "Plagal cadence"),
    ("vii°-I", "Leading tone resolution"),
];

/// Longest trailing slice examined
pub const MAX_PATTERN_LENGTH: usize = 4;

/// Shortest trailing slice examined
pub const MIN_PATTERN_LENGTH: usize = 2;

/// Name the progression formed by the tail of `roman_sequence`
///
/// Trailing slices of length 4, 3 and 2 are tried in turn. For each length an exact catalog
/// match wins; otherwise a slice contained in a catalog pattern (or containing one) reports
/// "Part of <name>". Longer slices take priority.
///
/// # Example
///
/// ```
/// use harmoniq::features::progression::detect_pattern;
///
/// assert_eq!(
///     detect_pattern(&["I", "V", "vi", "IV"]).as_deref(),
///     Some("Pop progression (Axis)")
/// );
/// assert_eq!(
///     detect_pattern(&["iii", "ii", "V"]).as_deref(),
///     Some("Part of Jazz turnaround")
/// );
/// ```
pub fn detect_pattern<S: AsRef<str>>(roman_sequence: &[S]) -> Option<String> {
    let tokens: Vec<&str> = roman_sequence.iter().map(|s| s.as_ref()).collect();

    for length in (MIN_PATTERN_LENGTH..=MAX_PATTERN_LENGTH).rev() {
        if tokens.len() < length {
            continue;
        }
        let tail = &tokens[tokens.len() - length..];

        if let Some((_, name)) = COMMON_PROGRESSIONS
            .iter()
            .find(|(pattern, _)| pattern_tokens(pattern).eq(tail.iter().copied()))
        {
            return Some(name.to_string());
        }

        for (pattern, name) in COMMON_PROGRESSIONS.iter() {
            let pattern: Vec<&str> = pattern_tokens(pattern).collect();
            if contains_run(&pattern, tail) || contains_run(tail, &pattern) {
                return Some(format!("Part of {}", name));
            }
        }
    }
    None
}

fn pattern_tokens(pattern: &str) -> impl Iterator<Item = &str> {
    pattern.split('-')
}

/// True if `needle` occurs as a contiguous run inside `haystack`
fn contains_run(haystack: &[&str], needle: &[&str]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_four_chord_match() {
        assert_eq!(
            detect_pattern(&["I", "V", "vi", "IV"]).as_deref(),
            Some("Pop progression (Axis)")
        );
        assert_eq!(
            detect_pattern(&["IV", "vi", "IV", "I", "V"]).as_deref(),
            Some("Pop/Rock variant")
        );
    }

    #[test]
    fn test_exact_three_chord_match() {
        assert_eq!(
            detect_pattern(&["ii", "V", "I"]).as_deref(),
            Some("Jazz turnaround")
        );
    }

    #[test]
    fn test_partial_match() {
        // Tail I-IV-V-I contains "I-IV-V"
        assert_eq!(
            detect_pattern(&["I", "IV", "V", "I"]).as_deref(),
            Some("Part of Basic Blues")
        );
        // "V-I" is a run inside "ii-V-I"
        assert_eq!(
            detect_pattern(&["V", "I"]).as_deref(),
            Some("Part of Jazz turnaround")
        );
    }

    #[test]
    fn test_token_level_matching() {
        // "V" must not match the tail of "IV" or the head of "vi"
        assert_eq!(detect_pattern(&["iii", "IV"]), None);
        assert_eq!(detect_pattern(&["(Eb)", "(F#dim)", "iii"]), None);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(detect_pattern(&["I"]), None);
        assert_eq!(detect_pattern::<&str>(&[]), None);
    }

    #[test]
    fn test_longer_length_takes_priority() {
        // The 2-chord tail "V-vi" is exact, but the 4-chord tail already contains "I-IV-V"
        assert_eq!(
            detect_pattern(&["I", "IV", "V", "vi"]).as_deref(),
            Some("Part of Basic Blues")
        );
        assert_eq!(
            detect_pattern(&["vi", "ii", "V", "I"]).as_deref(),
            Some("Circle progression")
        );
    }
}
