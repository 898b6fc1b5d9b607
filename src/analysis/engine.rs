//! Synchronous chord engine
//!
//! Wires the frame buffer, analysis pipeline, key tracker and progression analyzer together.
//! The engine is push-driven: callers push samples and call [`ChordEngine::process_available`]
//! whenever they like. [`Session`](super::session::Session) runs the same engine on a worker
//! thread.

use std::sync::Arc;

use super::history::ChordHistory;
use super::pipeline::AnalysisPipeline;
use super::result::{ChordEvent, KeyState, SessionEvent, SessionSummary};
use crate::config::SessionConfig;
use crate::error::AnalysisError;
use crate::features::chroma::ChromaExtractor;
use crate::features::key::{chord_to_roman, roman_or_label, KeyTracker};
use crate::features::progression::ProgressionAnalyzer;
use crate::io::frame_buffer::StreamingFrameBuffer;

/// Frame buffer, pipeline, key tracker and progression analyzer for one session
pub struct ChordEngine<E> {
    config: SessionConfig,
    buffer: Arc<StreamingFrameBuffer>,
    pipeline: AnalysisPipeline<E>,
    tracker: KeyTracker,
    analyzer: ProgressionAnalyzer,
}

impl<E: ChromaExtractor> ChordEngine<E> {
    /// Create an engine
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` if `config` does not validate.
    pub fn new(config: SessionConfig, extractor: E) -> Result<Self, AnalysisError> {
        let pipeline = AnalysisPipeline::new(&config, extractor)?;
        log::debug!(
            "Chord engine: {} Hz, window {} samples, hop {} samples, {} templates",
            config.sample_rate,
            config.window_size,
            config.hop_size,
            pipeline.classifier().bank().len()
        );
        Ok(Self {
            buffer: Arc::new(StreamingFrameBuffer::new(config.max_buffered_samples)),
            tracker: KeyTracker::new(&config),
            analyzer: ProgressionAnalyzer::new(config.min_pattern_chords),
            pipeline,
            config,
        })
    }

    /// Shared frame buffer; producers may push into it from any thread
    pub fn buffer(&self) -> &Arc<StreamingFrameBuffer> {
        &self.buffer
    }

    /// Queue samples for analysis; returns the number of old samples dropped
    pub fn push_samples(&self, samples: &[f32]) -> usize {
        self.buffer.push(samples)
    }

    /// Next analysis window, if enough samples are queued
    pub fn next_window(&self) -> Option<Vec<f32>> {
        self.buffer
            .drain(self.config.window_size, self.config.hop_size)
    }

    /// Analyse every complete window currently queued, all stamped with `timestamp`
    pub fn process_available(&mut self, timestamp: f64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(window) = self.next_window() {
            events.extend(self.process_window(&window, timestamp));
        }
        events
    }

    /// Analyse one window; failures are logged and produce no events
    pub fn process_window(&mut self, window: &[f32], timestamp: f64) -> Vec<SessionEvent> {
        match self.pipeline.process_window(window, timestamp) {
            Ok(Some(event)) => self.observe(event),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Skipping window @ {:.2}s: {}", timestamp, e);
                Vec::new()
            }
        }
    }

    /// Feed a classified window to the key tracker and progression analyzer
    ///
    /// Emits `ChordDetected` for every event, followed by `ChordChanged` when a chord change
    /// is committed and `KeyChanged` when the committed key changes.
    pub fn observe(&mut self, event: ChordEvent) -> Vec<SessionEvent> {
        let update = self.tracker.observe(&event);
        let key = self.tracker.key_state().key;

        let roman = match key {
            Some(key) if !event.label.is_unknown() => {
                Some(chord_to_roman(event.label.as_str(), &key))
            }
            _ => None,
        };
        let mut events = vec![SessionEvent::ChordDetected { event, roman }];

        if let Some(entry) = update.committed {
            let roman = roman_or_label(&entry.chord, key.as_ref());
            let pattern = self
                .analyzer
                .current_pattern(self.tracker.history(), self.tracker.key_state());
            if let Some(pattern) = &pattern {
                log::debug!("Progression pattern: {}", pattern);
            }
            events.push(SessionEvent::ChordChanged {
                entry,
                roman,
                pattern,
            });
        }
        if let Some(state) = update.key_changed {
            events.push(SessionEvent::KeyChanged(state));
        }
        events
    }

    /// Close the open history entry at `end_time`
    pub fn finish(&mut self, end_time: f64) {
        self.tracker.finish(end_time);
    }

    /// Summary of the session so far, `elapsed` seconds after its start
    pub fn summary(&self, elapsed: f64) -> SessionSummary {
        let mut summary =
            self.analyzer
                .summarize(self.tracker.history(), self.tracker.key_state(), elapsed);
        summary.windows = self.pipeline.stats();
        summary
    }

    /// Committed key
    pub fn key_state(&self) -> &KeyState {
        self.tracker.key_state()
    }

    /// Committed chord history
    pub fn history(&self) -> &ChordHistory {
        self.tracker.history()
    }

    /// Active configuration, including runtime threshold changes
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Change the detection threshold (clamped into [0, 1])
    pub fn set_detection_threshold(&mut self, threshold: f32) -> Result<f32, AnalysisError> {
        let applied = self.config.set_detection_threshold(threshold)?;
        self.pipeline.set_detection_threshold(applied)
    }

    /// Change the commit threshold (clamped into [0, 1])
    pub fn set_commit_threshold(&mut self, threshold: f32) -> Result<f32, AnalysisError> {
        let applied = self.config.set_commit_threshold(threshold)?;
        self.tracker.set_commit_threshold(applied)
    }

    /// Change the silence threshold (negative values clamp to 0)
    pub fn set_volume_threshold(&mut self, threshold: f32) -> Result<f32, AnalysisError> {
        let applied = self.config.set_volume_threshold(threshold)?;
        self.pipeline.set_volume_threshold(applied);
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::{ChordLabel, Key};

    fn event(label: &str, confidence: f32, timestamp: f64) -> ChordEvent {
        ChordEvent {
            label: ChordLabel::Known(label.to_string()),
            confidence,
            volume: 0.2,
            timestamp,
        }
    }

    type Extractor = fn(&[f32], u32) -> Result<Vec<Vec<f32>>, AnalysisError>;

    fn zero_chroma(_: &[f32], _: u32) -> Result<Vec<Vec<f32>>, AnalysisError> {
        Ok(vec![vec![0.0; 12]])
    }

    fn engine() -> ChordEngine<Extractor> {
        ChordEngine::new(SessionConfig::for_sample_rate(1000), zero_chroma as Extractor).unwrap()
    }

    #[test]
    fn test_observe_event_sequence() {
        let mut engine = engine();
        let events = engine.observe(event("C", 0.9, 0.0));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SessionEvent::ChordDetected { roman: None, .. }));
        match &events[1] {
            SessionEvent::ChordChanged { roman, pattern, .. } => {
                assert_eq!(roman, "C");
                assert!(pattern.is_none());
            }
            other => panic!("unexpected event {:?}", other),
        }

        // Same chord again: detection only
        assert_eq!(engine.observe(event("C", 0.9, 0.75)).len(), 1);

        engine.observe(event("F", 0.9, 2.0));
        let events = engine.observe(event("G", 0.9, 4.0));
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            SessionEvent::ChordDetected { roman: Some(r), .. } if r == "V"
        ));
        assert!(matches!(
            &events[2],
            SessionEvent::KeyChanged(state) if state.key == Some(Key::Major(0))
        ));
    }

    #[test]
    fn test_pattern_after_four_chords() {
        let mut engine = engine();
        for (i, chord) in ["C", "F", "G"].iter().enumerate() {
            engine.observe(event(chord, 0.9, i as f64 * 2.0));
        }
        let events = engine.observe(event("C", 0.9, 6.0));
        match &events[1] {
            SessionEvent::ChordChanged { roman, pattern, .. } => {
                assert_eq!(roman, "I");
                assert_eq!(pattern.as_deref(), Some("Part of Basic Blues"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_unknown_events_reported_but_not_committed() {
        let mut engine = engine();
        let unknown = ChordEvent {
            label: ChordLabel::Unknown,
            confidence: 0.4,
            volume: 0.2,
            timestamp: 0.0,
        };
        let events = engine.observe(unknown);
        assert_eq!(events.len(), 1);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_process_available_drains_all_windows() {
        let mut engine = engine();
        // window 1500, hop 750 at 1 kHz
        engine.push_samples(&vec![0.5; 3000]);
        let events = engine.process_available(1.0);
        // All-zero chroma classifies as Unknown: one detection per window
        assert_eq!(events.len(), 3);
        assert_eq!(engine.summary(1.0).windows.processed, 3);
        assert!(engine.next_window().is_none());
    }

    #[test]
    fn test_silent_windows_counted() {
        let mut engine = engine();
        engine.push_samples(&vec![0.0; 1500]);
        assert!(engine.process_available(1.0).is_empty());
        assert_eq!(engine.summary(1.0).windows.silent, 1);
    }

    #[test]
    fn test_runtime_thresholds() {
        let mut engine = engine();
        assert_eq!(engine.set_commit_threshold(0.95).unwrap(), 0.95);
        engine.observe(event("C", 0.9, 0.0));
        assert!(engine.history().is_empty());
        assert_eq!(engine.set_detection_threshold(4.0).unwrap(), 1.0);
        assert_eq!(engine.config().detection_threshold, 1.0);
        assert_eq!(engine.set_volume_threshold(-1.0).unwrap(), 0.0);
    }
}
