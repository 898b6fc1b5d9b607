//! Temporal chroma aggregation
//!
//! An extractor yields one chroma vector per STFT frame; the classifier needs one vector per
//! analysis window, so frames are averaged over time.

use super::N_PITCH_CLASSES;
use crate::error::AnalysisError;

/// Average per-frame chroma vectors into a single 12-element vector
///
/// # Errors
///
/// - `AnalysisError::ExtractionFailure` if there are no frames
/// - `AnalysisError::InvalidInput` if any frame does not have 12 elements
/// - `AnalysisError::NumericalError` if any value is negative or not finite
pub fn average_chroma(frames: &[Vec<f32>]) -> Result<Vec<f32>, AnalysisError> {
    if frames.is_empty() {
        return Err(AnalysisError::ExtractionFailure(
            "extractor returned zero frames".to_string(),
        ));
    }

    let mut sum = vec![0.0f32; N_PITCH_CLASSES];
    for (i, frame) in frames.iter().enumerate() {
        if frame.len() != N_PITCH_CLASSES {
            return Err(AnalysisError::InvalidInput(format!(
                "Chroma frame at index {} has {} elements, expected {}",
                i,
                frame.len(),
                N_PITCH_CLASSES
            )));
        }
        for (acc, &x) in sum.iter_mut().zip(frame.iter()) {
            if !x.is_finite() || x < 0.0 {
                return Err(AnalysisError::NumericalError(format!(
                    "Chroma frame at index {} contains invalid value {}",
                    i, x
                )));
            }
            *acc += x;
        }
    }

    let n = frames.len() as f32;
    Ok(sum.into_iter().map(|x| x / n).collect())
}
