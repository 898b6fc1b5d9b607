//! Volume measurement and silence gating

/// Root-mean-square amplitude of a window (0.0 for an empty window)
pub fn rms_volume(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f32 = samples.iter().map(|&x| x * x).sum();
    (energy / samples.len() as f32).sqrt()
}

/// Silence gate applied to each analysis window before chroma extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceGate {
    /// RMS volume below which a window is considered silent (default: 0.01)
    pub volume_threshold: f32,
}

impl Default for SilenceGate {
    fn default() -> Self {
        Self {
            volume_threshold: 0.01,
        }
    }
}

impl SilenceGate {
    /// Create a gate with the given RMS threshold
    pub fn new(volume_threshold: f32) -> Self {
        Self { volume_threshold }
    }

    /// Measure the window; `None` if it is too quiet to analyse
    pub fn measure(&self, samples: &[f32]) -> Option<f32> {
        let volume = rms_volume(samples);
        if volume < self.volume_threshold {
            log::debug!(
                "Silent window: rms {:.4} < threshold {:.4}",
                volume,
                self.volume_threshold
            );
            None
        } else {
            Some(volume)
        }
    }
}

/// True if the window's RMS volume is below `threshold`
pub fn is_silent(samples: &[f32], threshold: f32) -> bool {
    rms_volume(samples) < threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_of_constant() {
        assert!((rms_volume(&[0.5; 100]) - 0.5).abs() < 1e-6);
        assert!((rms_volume(&[-0.5, 0.5, -0.5, 0.5]) - 0.5).abs() < 1e-6);
        assert_eq!(rms_volume(&[]), 0.0);
    }

    #[test]
    fn test_rms_of_sine() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
            .collect();
        let rms = rms_volume(&samples);
        assert!(
            (rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3,
            "unit sine RMS should be ~0.707, got {}",
            rms
        );
    }

    #[test]
    fn test_gate() {
        let gate = SilenceGate::new(0.01);
        assert!(gate.measure(&[0.001; 512]).is_none());
        assert!(gate.measure(&[0.2; 512]).is_some());
        assert!(is_silent(&[0.0; 512], 0.01));
        assert!(!is_silent(&[0.0; 512], 0.0));
    }
}
