//! Chroma vector extraction
//!
//! The pipeline treats chroma extraction as a collaborator: anything implementing
//! [`ChromaExtractor`] can be plugged into a session. [`StftChromaExtractor`] is the default,
//! folding a Hann-windowed STFT magnitude spectrum into 12 pitch classes.
//!
//! # Example
//!
//! ```
//! use harmoniq::features::chroma::{ChromaExtractor, StftChromaExtractor};
//!
//! let sample_rate = 22050;
//! let samples: Vec<f32> = (0..sample_rate)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin())
//!     .collect();
//!
//! let extractor = StftChromaExtractor::default();
//! let frames = extractor.extract(&samples, sample_rate as u32)?;
//! assert!(!frames.is_empty());
//! assert_eq!(frames[0].len(), 12);
//! # Ok::<(), harmoniq::AnalysisError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::N_PITCH_CLASSES;
use crate::error::AnalysisError;

/// Produces a chroma matrix (one 12-element vector per frame) from a window of samples
///
/// Implementations may return zero frames for pathological input; the pipeline skips such
/// windows. Errors are logged by the pipeline and never stop a session.
pub trait ChromaExtractor: Send {
    /// Extract per-frame chroma vectors from mono `samples`
    fn extract(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<Vec<f32>>, AnalysisError>;
}

impl<F> ChromaExtractor for F
where
    F: Fn(&[f32], u32) -> Result<Vec<Vec<f32>>, AnalysisError> + Send,
{
    fn extract(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<Vec<f32>>, AnalysisError> {
        self(samples, sample_rate)
    }
}

/// STFT-based chroma extractor
pub struct StftChromaExtractor {
    frame_size: usize,
    hop_size: usize,
    min_frequency: f32,
    max_frequency: f32,
    reference_a4: f32,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl fmt::Debug for StftChromaExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StftChromaExtractor")
            .field("frame_size", &self.frame_size)
            .field("hop_size", &self.hop_size)
            .field("min_frequency", &self.min_frequency)
            .field("max_frequency", &self.max_frequency)
            .field("reference_a4", &self.reference_a4)
            .finish_non_exhaustive()
    }
}

impl Default for StftChromaExtractor {
    /// 4096-sample frames, 2048 hop, C2 (65.4 Hz) to C7 (2093 Hz), A4 = 440 Hz
    fn default() -> Self {
        Self::new(4096, 2048, 65.41, 2093.0)
    }
}

impl StftChromaExtractor {
    /// Create an extractor with the given STFT geometry and analysed frequency range
    ///
    /// A `frame_size` or `hop_size` of 0 is bumped to 1.
    pub fn new(frame_size: usize, hop_size: usize, min_frequency: f32, max_frequency: f32) -> Self {
        let frame_size = frame_size.max(1);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);

        Self {
            frame_size,
            hop_size: hop_size.max(1),
            min_frequency,
            max_frequency,
            reference_a4: 440.0,
            window: hann_window(frame_size),
            fft,
        }
    }

    /// Override the tuning reference (default: 440 Hz)
    pub fn with_reference(mut self, reference_a4: f32) -> Self {
        self.reference_a4 = reference_a4;
        self
    }

    /// Pitch class for every positive-frequency bin, `None` outside the analysed range
    fn bin_pitch_classes(&self, sample_rate: u32) -> Vec<Option<usize>> {
        let bin_hz = sample_rate as f32 / self.frame_size as f32;
        (0..=self.frame_size / 2)
            .map(|k| {
                let freq = k as f32 * bin_hz;
                if k == 0 || freq < self.min_frequency || freq > self.max_frequency {
                    return None;
                }
                // MIDI note number, 69 = A4
                let midi = 69.0 + 12.0 * (freq / self.reference_a4).log2();
                Some((midi.round() as i64).rem_euclid(N_PITCH_CLASSES as i64) as usize)
            })
            .collect()
    }
}

impl ChromaExtractor for StftChromaExtractor {
    fn extract(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<Vec<f32>>, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if samples.len() < self.frame_size {
            log::debug!(
                "Window of {} samples shorter than STFT frame ({}), no chroma frames",
                samples.len(),
                self.frame_size
            );
            return Ok(Vec::new());
        }

        let pitch_classes = self.bin_pitch_classes(sample_rate);
        let n_frames = (samples.len() - self.frame_size) / self.hop_size + 1;
        let mut frames = Vec::with_capacity(n_frames);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.frame_size];

        for frame_idx in 0..n_frames {
            let start = frame_idx * self.hop_size;
            let frame = &samples[start..start + self.frame_size];
            for ((slot, &x), &w) in buffer.iter_mut().zip(frame).zip(&self.window) {
                *slot = Complex::new(x * w, 0.0);
            }
            self.fft.process(&mut buffer);

            let mut chroma = vec![0.0f32; N_PITCH_CLASSES];
            for (bin, pc) in pitch_classes.iter().enumerate() {
                if let Some(pc) = pc {
                    chroma[*pc] += buffer[bin].norm_sqr();
                }
            }

            // Per-frame max normalization
            let max = chroma.iter().copied().fold(0.0f32, f32::max);
            if max > 1e-12 {
                for x in chroma.iter_mut() {
                    *x /= max;
                }
            }
            frames.push(chroma);
        }

        log::debug!(
            "Extracted {} chroma frames from {} samples at {} Hz",
            frames.len(),
            samples.len(),
            sample_rate
        );
        Ok(frames)
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| {
            0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freqs: &[f32], sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                freqs
                    .iter()
                    .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                    .sum::<f32>()
                    / freqs.len() as f32
            })
            .collect()
    }

    #[test]
    fn test_a440_maps_to_pitch_class_a() {
        let extractor = StftChromaExtractor::default();
        let frames = extractor.extract(&tone(&[440.0], 22050, 1.0), 22050).unwrap();
        assert!(!frames.is_empty());

        for frame in &frames {
            let (argmax, _) = frame
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .unwrap();
            assert_eq!(argmax, 9, "A440 should peak at pitch class A (9), got {}", argmax);
        }
    }

    #[test]
    fn test_short_window_yields_no_frames() {
        let extractor = StftChromaExtractor::default();
        let frames = extractor.extract(&[0.1; 1000], 22050).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let extractor = StftChromaExtractor::default();
        assert!(extractor.extract(&[0.1; 8192], 0).is_err());
    }

    #[test]
    fn test_frame_count() {
        let extractor = StftChromaExtractor::new(1024, 512, 65.0, 2000.0);
        let frames = extractor.extract(&vec![0.0; 4096], 22050).unwrap();
        assert_eq!(frames.len(), (4096 - 1024) / 512 + 1);
        assert!(frames.iter().all(|f| f.iter().all(|x| *x == 0.0)));
    }

    #[test]
    fn test_closure_extractor() {
        let extractor = |_: &[f32], _: u32| -> Result<Vec<Vec<f32>>, AnalysisError> {
            Ok(vec![vec![1.0; 12]])
        };
        let frames = extractor.extract(&[0.0; 10], 22050).unwrap();
        assert_eq!(frames.len(), 1);
    }
}
