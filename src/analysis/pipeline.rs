//! Per-window analysis pipeline
//!
//! Turns one drained window into at most one [`ChordEvent`]:
//!
//! ```text
//! window → silence gate → chroma extraction → temporal average → template match → ChordEvent
//! ```
//!
//! Silence is not an error (`Ok(None)`). Extraction and classification failures are returned
//! to the caller, counted, and leave the pipeline ready for the next window. A panicking
//! extractor is reported as `ExtractionFailure` like any other failed window.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::result::{ChordEvent, WindowStats};
use crate::config::SessionConfig;
use crate::error::AnalysisError;
use crate::features::chords::{ChordClassifier, ChordTemplateBank};
use crate::features::chroma::smoothing::average_chroma;
use crate::features::chroma::ChromaExtractor;
use crate::preprocessing::silence::SilenceGate;

/// Silence gate, chroma extractor and chord classifier applied to each window
pub struct AnalysisPipeline<E> {
    extractor: E,
    classifier: ChordClassifier,
    gate: SilenceGate,
    sample_rate: u32,
    stats: WindowStats,
}

impl<E: ChromaExtractor> AnalysisPipeline<E> {
    /// Build a pipeline from the session configuration
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` if the configuration does not validate.
    pub fn new(config: &SessionConfig, extractor: E) -> Result<Self, AnalysisError> {
        config.validate()?;
        let bank = Arc::new(ChordTemplateBank::from_config(
            config.include_enharmonic_spellings,
        ));
        Self::with_bank(config, extractor, bank)
    }

    /// Build a pipeline sharing an existing template bank
    pub fn with_bank(
        config: &SessionConfig,
        extractor: E,
        bank: Arc<ChordTemplateBank>,
    ) -> Result<Self, AnalysisError> {
        Ok(Self {
            extractor,
            classifier: ChordClassifier::new(bank, config.detection_threshold)?,
            gate: SilenceGate::new(config.volume_threshold),
            sample_rate: config.sample_rate,
            stats: WindowStats::default(),
        })
    }

    /// Analyse one window emitted at `timestamp` (seconds since session start)
    ///
    /// # Returns
    ///
    /// `Ok(None)` for a silent window, `Ok(Some(event))` otherwise (the label may be `Unknown`)
    ///
    /// # Errors
    ///
    /// Returns the extractor's error, `ExtractionFailure` when it yields no frames, or the
    /// classifier's error for a malformed chroma vector.
    pub fn process_window(
        &mut self,
        window: &[f32],
        timestamp: f64,
    ) -> Result<Option<ChordEvent>, AnalysisError> {
        let volume = match self.gate.measure(window) {
            Some(volume) => volume,
            None => {
                self.stats.silent += 1;
                return Ok(None);
            }
        };

        match self.classify_window(window, volume, timestamp) {
            Ok(event) => {
                self.stats.processed += 1;
                log::debug!(
                    "Window @ {:.2}s: {} (confidence {:.3}, rms {:.4})",
                    timestamp,
                    event.label,
                    event.confidence,
                    volume
                );
                Ok(Some(event))
            }
            Err(e) => {
                self.stats.failed += 1;
                Err(e)
            }
        }
    }

    fn classify_window(
        &self,
        window: &[f32],
        volume: f32,
        timestamp: f64,
    ) -> Result<ChordEvent, AnalysisError> {
        let frames = panic::catch_unwind(AssertUnwindSafe(|| {
            self.extractor.extract(window, self.sample_rate)
        }))
        .map_err(|payload| {
            AnalysisError::ExtractionFailure(format!(
                "extractor panicked: {}",
                panic_message(&*payload)
            ))
        })??;
        let chroma = average_chroma(&frames)?;
        let matched = self.classifier.classify(&chroma)?;
        Ok(ChordEvent {
            label: matched.label,
            confidence: matched.confidence,
            volume,
            timestamp,
        })
    }

    /// Window counters so far
    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    /// Replace the detection threshold; returns the value applied
    pub fn set_detection_threshold(&mut self, threshold: f32) -> Result<f32, AnalysisError> {
        self.classifier.set_threshold(threshold)
    }

    /// Replace the silence threshold
    pub fn set_volume_threshold(&mut self, threshold: f32) {
        self.gate.volume_threshold = threshold;
    }

    /// Chord classifier in use
    pub fn classifier(&self) -> &ChordClassifier {
        &self.classifier
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
