//! PCM sample-format conversion
//!
//! Capture clients commonly deliver signed 16-bit little-endian PCM; the pipeline works on
//! `f32` samples in [-1.0, 1.0).

use crate::error::AnalysisError;

/// Convert signed 16-bit little-endian PCM bytes to `f32` samples
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `bytes` has an odd length.
pub fn pcm16_le_to_f32(bytes: &[u8]) -> Result<Vec<f32>, AnalysisError> {
    if bytes.len() % 2 != 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "PCM16 payload must have an even byte length, got {}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm16_conversion() {
        let bytes = [0x00, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x00, 0x40];
        let samples = pcm16_le_to_f32(&bytes).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.0);
        assert!((samples[1] - 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(samples[2], -1.0);
        assert_eq!(samples[3], 0.5);
    }

    #[test]
    fn test_pcm16_odd_length() {
        assert!(pcm16_le_to_f32(&[0x00, 0x01, 0x02]).is_err());
        assert!(pcm16_le_to_f32(&[]).unwrap().is_empty());
    }
}
