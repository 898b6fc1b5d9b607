//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::AnalysisError;

/// Downmix interleaved multi-channel samples to mono by averaging each frame
///
/// # Arguments
///
/// * `interleaved` - Interleaved samples (`L R L R ...` for stereo)
/// * `channels` - Number of interleaved channels
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `channels` is 0 or the sample count is not a
/// multiple of `channels`.
pub fn mix_to_mono(interleaved: &[f32], channels: usize) -> Result<Vec<f32>, AnalysisError> {
    if channels == 0 {
        return Err(AnalysisError::InvalidInput(
            "Channel count must be > 0".to_string(),
        ));
    }
    if interleaved.len() % channels != 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "{} samples is not a whole number of {}-channel frames",
            interleaved.len(),
            channels
        )));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_average() {
        let mono = mix_to_mono(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2).unwrap();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_mono_passthrough() {
        let mono = mix_to_mono(&[0.1, 0.2, 0.3], 1).unwrap();
        assert_eq!(mono, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_invalid_layout() {
        assert!(mix_to_mono(&[0.1, 0.2, 0.3], 2).is_err());
        assert!(mix_to_mono(&[0.1], 0).is_err());
    }
}
