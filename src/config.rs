//! Configuration parameters for a live analysis session

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Default capture sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Analysis window length in seconds
pub const DEFAULT_WINDOW_SECONDS: f32 = 1.5;

/// Session configuration parameters
///
/// Every threshold used by the pipeline, the key tracker and the progression analyzer lives
/// here; nothing downstream hardcodes its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    // Capture / windowing
    /// Sample rate of the incoming stream in Hz (default: 22050)
    pub sample_rate: u32,

    /// Analysis window length in samples (default: 1.5 s worth of samples)
    pub window_size: usize,

    /// Read-position advance between windows (default: window_size / 2)
    ///
    /// Values smaller than `window_size` yield overlapping windows.
    pub hop_size: usize,

    /// Ceiling on samples retained by the frame buffer (default: 3 × window_size)
    ///
    /// Oldest samples are dropped once a push exceeds this bound.
    pub max_buffered_samples: usize,

    // Chord detection
    /// Minimum cosine similarity for a template match to be reported (default: 0.6)
    pub detection_threshold: f32,

    /// Stricter confidence required to commit a chord change to history (default: 0.7)
    pub commit_threshold: f32,

    /// RMS volume below which a window is treated as silence (default: 0.01)
    pub volume_threshold: f32,

    /// Append flat spellings (Db, Eb, ...) to the template catalog (default: false)
    pub include_enharmonic_spellings: bool,

    // Key tracking
    /// Number of committed chords kept in the history ring (default: 30)
    pub history_capacity: usize,

    /// Number of most recent history entries scored for key detection (default: 8)
    pub key_window: usize,

    /// Re-score the key every N committed chord changes (default: 3)
    pub key_eval_interval: usize,

    /// Minimum winning score for a key candidate to be reported at all (default: 0.4)
    pub key_min_score: f32,

    /// Score a candidate must exceed before it replaces the committed key (default: 0.5)
    pub key_commit_score: f32,

    // Progression analysis
    /// Minimum number of chords in the Roman sequence before patterns are reported (default: 4)
    pub min_pattern_chords: usize,

    // Session plumbing
    /// Cadence of the analysis worker (default: 100 ms)
    pub poll_interval: Duration,

    /// Capacity of the bounded event queue towards the listener (default: 64)
    pub event_queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_sample_rate(DEFAULT_SAMPLE_RATE)
    }
}

impl SessionConfig {
    /// Default configuration with window, hop and buffer ceiling derived from `sample_rate`
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        let window_size = ((sample_rate as f32 * DEFAULT_WINDOW_SECONDS) as usize).max(1);
        Self {
            sample_rate,
            window_size,
            hop_size: (window_size / 2).max(1),
            max_buffered_samples: window_size * 3,
            detection_threshold: 0.6,
            commit_threshold: 0.7,
            volume_threshold: 0.01,
            include_enharmonic_spellings: false,
            history_capacity: 30,
            key_window: 8,
            key_eval_interval: 3,
            key_min_score: 0.4,
            key_commit_score: 0.5,
            min_pattern_chords: 4,
            poll_interval: Duration::from_millis(100),
            event_queue_capacity: 64,
        }
    }

    /// Check every field against its allowed range
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.sample_rate == 0 {
            return Err(invalid("sample_rate must be > 0"));
        }
        if self.window_size == 0 {
            return Err(invalid("window_size must be > 0"));
        }
        if self.hop_size == 0 || self.hop_size > self.window_size {
            return Err(AnalysisError::InvalidConfig(format!(
                "hop_size must be in 1..={}, got {}",
                self.window_size, self.hop_size
            )));
        }
        if self.max_buffered_samples < self.window_size {
            return Err(AnalysisError::InvalidConfig(format!(
                "max_buffered_samples ({}) must be >= window_size ({})",
                self.max_buffered_samples, self.window_size
            )));
        }
        check_unit("detection_threshold", self.detection_threshold)?;
        check_unit("commit_threshold", self.commit_threshold)?;
        if !self.volume_threshold.is_finite() || self.volume_threshold < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "volume_threshold must be finite and >= 0, got {}",
                self.volume_threshold
            )));
        }
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity must be >= 1"));
        }
        if self.key_window < 3 {
            return Err(invalid("key_window must be >= 3"));
        }
        if self.key_eval_interval == 0 {
            return Err(invalid("key_eval_interval must be >= 1"));
        }
        for (name, value) in [
            ("key_min_score", self.key_min_score),
            ("key_commit_score", self.key_commit_score),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{} must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }
        if self.min_pattern_chords < 2 {
            return Err(invalid("min_pattern_chords must be >= 2"));
        }
        if self.poll_interval.is_zero() {
            return Err(invalid("poll_interval must be > 0"));
        }
        if self.event_queue_capacity == 0 {
            return Err(invalid("event_queue_capacity must be >= 1"));
        }
        Ok(())
    }

    /// Set the detection threshold, clamping into [0, 1]
    pub fn set_detection_threshold(&mut self, threshold: f32) -> Result<f32, AnalysisError> {
        self.detection_threshold = clamp_unit("detection_threshold", threshold)?;
        Ok(self.detection_threshold)
    }

    /// Set the commit threshold, clamping into [0, 1]
    pub fn set_commit_threshold(&mut self, threshold: f32) -> Result<f32, AnalysisError> {
        self.commit_threshold = clamp_unit("commit_threshold", threshold)?;
        Ok(self.commit_threshold)
    }

    /// Set the silence gate, clamping negatives to 0
    pub fn set_volume_threshold(&mut self, threshold: f32) -> Result<f32, AnalysisError> {
        if threshold.is_nan() || threshold == f32::INFINITY {
            return Err(AnalysisError::InvalidConfig(format!(
                "volume_threshold must be finite, got {}",
                threshold
            )));
        }
        if threshold < 0.0 {
            log::warn!("volume_threshold {} clamped to 0.0", threshold);
        }
        self.volume_threshold = threshold.max(0.0);
        Ok(self.volume_threshold)
    }
}

fn invalid(msg: &str) -> AnalysisError {
    AnalysisError::InvalidConfig(msg.to_string())
}

fn check_unit(name: &str, value: f32) -> Result<(), AnalysisError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(AnalysisError::InvalidConfig(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

pub(crate) fn clamp_unit(name: &str, value: f32) -> Result<f32, AnalysisError> {
    if value.is_nan() {
        return Err(AnalysisError::InvalidConfig(format!("{} must not be NaN", name)));
    }
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        log::warn!("{} {} clamped to {}", name, value, clamped);
    }
    Ok(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size, 33075);
        assert_eq!(config.hop_size, 33075 / 2);
        assert_eq!(config.max_buffered_samples, 33075 * 3);
    }

    #[test]
    fn test_hop_larger_than_window_rejected() {
        let mut config = SessionConfig::default();
        config.hop_size = config.window_size + 1;
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut config = SessionConfig::default();
        config.detection_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("detection_threshold"));

        let mut config = SessionConfig::default();
        config.volume_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_setters_clamp() {
        let mut config = SessionConfig::default();
        assert_eq!(config.set_detection_threshold(1.7).unwrap(), 1.0);
        assert_eq!(config.set_commit_threshold(-0.3).unwrap(), 0.0);
        assert_eq!(config.set_volume_threshold(-2.0).unwrap(), 0.0);
        assert!(config.set_detection_threshold(f32::NAN).is_err());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_sample_rate() {
        let config = SessionConfig::for_sample_rate(16000);
        assert_eq!(config.window_size, 24000);
        assert_eq!(config.hop_size, 12000);
        assert!(config.validate().is_ok());
    }
}
