//! Template-matching chord classifier
//!
//! # Algorithm
//!
//! 1. L2-normalize the input chroma vector (epsilon 1e-8, so silence stays all-zero)
//! 2. Dot product with every normalized template, in bank order
//! 3. Keep the first template with the strictly highest score
//! 4. Report the label if the score clears the detection threshold, `Unknown` otherwise

use std::sync::Arc;

use super::templates::ChordTemplateBank;
use crate::analysis::result::ChordLabel;
use crate::config::clamp_unit;
use crate::error::AnalysisError;
use crate::features::chroma::normalization::{l2_normalize, NORM_EPSILON};
use crate::features::chroma::N_PITCH_CLASSES;

/// Outcome of classifying one chroma vector
#[derive(Debug, Clone, PartialEq)]
pub struct ChordMatch {
    /// Best template label, or `Unknown` below the threshold
    pub label: ChordLabel,
    /// Best cosine similarity, clamped to [0, 1]
    pub confidence: f32,
}

/// Chord classifier over a shared template bank
#[derive(Debug, Clone)]
pub struct ChordClassifier {
    bank: Arc<ChordTemplateBank>,
    threshold: f32,
}

impl ChordClassifier {
    /// Create a classifier; `threshold` is clamped into [0, 1]
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` for a NaN threshold.
    pub fn new(bank: Arc<ChordTemplateBank>, threshold: f32) -> Result<Self, AnalysisError> {
        Ok(Self {
            bank,
            threshold: clamp_unit("detection_threshold", threshold)?,
        })
    }

    /// Current detection threshold
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Replace the detection threshold; returns the value actually applied
    pub fn set_threshold(&mut self, threshold: f32) -> Result<f32, AnalysisError> {
        self.threshold = clamp_unit("detection_threshold", threshold)?;
        Ok(self.threshold)
    }

    /// Template bank used for matching
    pub fn bank(&self) -> &ChordTemplateBank {
        &self.bank
    }

    /// Classify a chroma vector with the configured threshold
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use harmoniq::analysis::result::ChordLabel;
    /// use harmoniq::features::chords::{ChordClassifier, ChordTemplateBank};
    ///
    /// let classifier = ChordClassifier::new(Arc::new(ChordTemplateBank::new()), 0.6)?;
    /// let mut chroma = [0.0f32; 12];
    /// chroma[0] = 1.0; // C
    /// chroma[4] = 1.0; // E
    /// chroma[7] = 1.0; // G
    /// let result = classifier.classify(&chroma)?;
    /// assert_eq!(result.label, ChordLabel::Known("C".to_string()));
    /// # Ok::<(), harmoniq::AnalysisError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` unless the vector has 12 finite entries.
    pub fn classify(&self, chroma: &[f32]) -> Result<ChordMatch, AnalysisError> {
        self.classify_with_threshold(chroma, self.threshold)
    }

    /// Classify a chroma vector against an explicit threshold
    pub fn classify_with_threshold(
        &self,
        chroma: &[f32],
        threshold: f32,
    ) -> Result<ChordMatch, AnalysisError> {
        if chroma.len() != N_PITCH_CLASSES {
            return Err(AnalysisError::InvalidInput(format!(
                "Chroma vector must have {} elements, got {}",
                N_PITCH_CLASSES,
                chroma.len()
            )));
        }
        if chroma.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::InvalidInput(
                "Chroma vector contains non-finite values".to_string(),
            ));
        }

        let normalized = l2_normalize(chroma, NORM_EPSILON);

        let mut best: Option<(&str, f32)> = None;
        for template in self.bank.templates() {
            let score: f32 = normalized
                .iter()
                .zip(template.normalized.iter())
                .map(|(a, b)| a * b)
                .sum();
            // Strict comparison: first template in bank order wins ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((template.label.as_str(), score));
            }
        }

        let (label, score) = match best {
            Some(best) => best,
            None => {
                return Err(AnalysisError::ProcessingError(
                    "Chord template bank is empty".to_string(),
                ))
            }
        };
        let confidence = score.clamp(0.0, 1.0);

        let label = if score > threshold {
            ChordLabel::Known(label.to_string())
        } else {
            log::debug!(
                "Best template {} ({:.3}) below threshold {:.3}",
                label,
                score,
                threshold
            );
            ChordLabel::Unknown
        };

        Ok(ChordMatch { label, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(threshold: f32) -> ChordClassifier {
        ChordClassifier::new(Arc::new(ChordTemplateBank::new()), threshold).unwrap()
    }

    #[test]
    fn test_exact_templates_match_themselves() {
        let classifier = classifier(0.6);
        for template in classifier.bank().templates() {
            let result = classifier.classify(&template.pitch_class_weights).unwrap();
            assert_eq!(
                result.label,
                ChordLabel::Known(template.label.clone()),
                "template {} misclassified",
                template.label
            );
            assert!((result.confidence - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_g7_chroma() {
        let classifier = classifier(0.6);
        let mut chroma = [0.0f32; 12];
        for pc in [7, 11, 2, 5] {
            chroma[pc] = 1.0;
        }
        let result = classifier.classify(&chroma).unwrap();
        assert_eq!(result.label, ChordLabel::Known("G7".to_string()));
    }

    #[test]
    fn test_zero_chroma_is_unknown() {
        let classifier = classifier(0.6);
        let result = classifier.classify(&[0.0; 12]).unwrap();
        assert_eq!(result.label, ChordLabel::Unknown);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_uniform_chroma_below_threshold() {
        // Best case is a seventh chord: 4 / sqrt(12 * 4) ~= 0.577
        let classifier = classifier(0.6);
        let result = classifier.classify(&[1.0; 12]).unwrap();
        assert_eq!(result.label, ChordLabel::Unknown);
        assert!(result.confidence > 0.0);

        let result = classifier.classify_with_threshold(&[1.0; 12], 0.4).unwrap();
        assert!(!result.label.is_unknown());
    }

    #[test]
    fn test_deterministic() {
        let classifier = classifier(0.6);
        let chroma = [0.9, 0.1, 0.2, 0.05, 0.8, 0.1, 0.0, 0.7, 0.1, 0.3, 0.0, 0.2];
        let first = classifier.classify(&chroma).unwrap();
        for _ in 0..10 {
            assert_eq!(classifier.classify(&chroma).unwrap(), first);
        }
    }

    #[test]
    fn test_enharmonic_bank_prefers_sharp_spelling() {
        let classifier =
            ChordClassifier::new(Arc::new(ChordTemplateBank::with_enharmonics()), 0.6).unwrap();
        let mut chroma = [0.0f32; 12];
        // Eb G Bb
        for pc in [3, 7, 10] {
            chroma[pc] = 1.0;
        }
        let result = classifier.classify(&chroma).unwrap();
        assert_eq!(result.label, ChordLabel::Known("D#".to_string()));
    }

    #[test]
    fn test_invalid_input() {
        let classifier = classifier(0.6);
        assert!(matches!(
            classifier.classify(&[1.0; 11]),
            Err(AnalysisError::InvalidInput(_))
        ));
        let mut chroma = [0.0f32; 12];
        chroma[3] = f32::NAN;
        assert!(classifier.classify(&chroma).is_err());
    }

    #[test]
    fn test_threshold_clamped() {
        let mut classifier = classifier(2.0);
        assert_eq!(classifier.threshold(), 1.0);
        assert_eq!(classifier.set_threshold(-1.0).unwrap(), 0.0);
        assert!(classifier.set_threshold(f32::NAN).is_err());
    }
}
