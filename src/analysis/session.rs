//! Live analysis session
//!
//! A [`Session`] runs a [`ChordEngine`] on a dedicated worker thread. Producers push samples
//! through a [`SampleSink`] from any thread; the worker drains windows on a fixed cadence and
//! publishes [`SessionEvent`]s on a bounded channel. A slow listener never stalls analysis:
//! events that do not fit in the queue are dropped with a warning.
//!
//! # Example
//!
//! ```no_run
//! use harmoniq::{Session, SessionConfig, StftChromaExtractor};
//!
//! let (session, events) = Session::start(SessionConfig::default(), StftChromaExtractor::default())?;
//! let sink = session.sample_sink();
//!
//! std::thread::spawn(move || {
//!     for event in events {
//!         println!("{:?}", event);
//!     }
//! });
//!
//! sink.push(&vec![0.0f32; 22050]);
//! let summary = session.stop()?;
//! println!("{} chords", summary.total_chords);
//! # Ok::<(), harmoniq::AnalysisError>(())
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::engine::ChordEngine;
use super::result::{KeyState, SessionEvent, SessionSummary};
use crate::config::SessionConfig;
use crate::error::AnalysisError;
use crate::features::chroma::ChromaExtractor;
use crate::io::frame_buffer::StreamingFrameBuffer;

/// Cloneable producer handle feeding a session's frame buffer
#[derive(Debug, Clone)]
pub struct SampleSink {
    buffer: Arc<StreamingFrameBuffer>,
}

impl SampleSink {
    /// Queue mono samples; returns the number of old samples dropped to make room
    pub fn push(&self, samples: &[f32]) -> usize {
        self.buffer.push(samples)
    }

    /// Samples currently waiting for analysis
    pub fn queued(&self) -> usize {
        self.buffer.len()
    }
}

/// A running analysis session
pub struct Session<E: ChromaExtractor + 'static> {
    engine: Arc<Mutex<ChordEngine<E>>>,
    sink: SampleSink,
    running: Arc<AtomicBool>,
    started: Instant,
    worker: Option<JoinHandle<()>>,
}

impl<E: ChromaExtractor + 'static> Session<E> {
    /// Validate `config`, spawn the analysis worker and return the event receiver
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` for an invalid configuration, or
    /// `AnalysisError::ProcessingError` if the worker thread cannot be spawned.
    pub fn start(
        config: SessionConfig,
        extractor: E,
    ) -> Result<(Self, Receiver<SessionEvent>), AnalysisError> {
        let engine = ChordEngine::new(config.clone(), extractor)?;
        let sink = SampleSink {
            buffer: Arc::clone(engine.buffer()),
        };
        let engine = Arc::new(Mutex::new(engine));
        let running = Arc::new(AtomicBool::new(true));
        let started = Instant::now();
        let (tx, rx) = mpsc::sync_channel(config.event_queue_capacity);

        let worker = Worker {
            engine: Arc::clone(&engine),
            buffer: Arc::clone(&sink.buffer),
            running: Arc::clone(&running),
            events: tx,
            started,
            window_size: config.window_size,
            hop_size: config.hop_size,
            poll_interval: config.poll_interval,
        };
        let handle = thread::Builder::new()
            .name("harmoniq-analysis".to_string())
            .spawn(move || worker.run())
            .map_err(|e| {
                AnalysisError::ProcessingError(format!("Failed to spawn analysis worker: {}", e))
            })?;

        log::info!(
            "Session started: {} Hz, window {:.2}s, hop {:.2}s",
            config.sample_rate,
            config.window_size as f32 / config.sample_rate as f32,
            config.hop_size as f32 / config.sample_rate as f32
        );

        Ok((
            Self {
                engine,
                sink,
                running,
                started,
                worker: Some(handle),
            },
            rx,
        ))
    }

    /// Handle for pushing samples from a capture thread
    pub fn sample_sink(&self) -> SampleSink {
        self.sink.clone()
    }

    /// Queue samples directly; see [`SampleSink::push`]
    pub fn push_samples(&self, samples: &[f32]) -> usize {
        self.sink.push(samples)
    }

    /// Seconds since the session started
    pub fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// True until [`Session::stop`] is called or the worker exits
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.worker.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Snapshot summary of the session so far
    pub fn summary(&self) -> SessionSummary {
        let elapsed = self.elapsed();
        lock(&self.engine).summary(elapsed)
    }

    /// Snapshot of the committed key
    pub fn key_state(&self) -> KeyState {
        lock(&self.engine).key_state().clone()
    }

    /// Change the detection threshold while running
    pub fn set_detection_threshold(&self, threshold: f32) -> Result<f32, AnalysisError> {
        lock(&self.engine).set_detection_threshold(threshold)
    }

    /// Change the commit threshold while running
    pub fn set_commit_threshold(&self, threshold: f32) -> Result<f32, AnalysisError> {
        lock(&self.engine).set_commit_threshold(threshold)
    }

    /// Change the silence threshold while running
    pub fn set_volume_threshold(&self, threshold: f32) -> Result<f32, AnalysisError> {
        lock(&self.engine).set_volume_threshold(threshold)
    }

    /// Stop the worker, close the open history entry and return the final summary
    ///
    /// Samples still queued when `stop` is called are not analysed.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::ProcessingError` if the worker thread panicked.
    pub fn stop(mut self) -> Result<SessionSummary, AnalysisError> {
        let joined = self.shutdown();
        let end = self.elapsed();
        let summary = {
            let mut engine = lock(&self.engine);
            engine.finish(end);
            engine.summary(end)
        };
        log::info!(
            "Session stopped after {:.1}s: {} chords, key {}",
            end,
            summary.total_chords,
            summary.key.label.as_deref().unwrap_or("undetected")
        );
        joined.map(|_| summary)
    }

    fn shutdown(&mut self) -> Result<(), AnalysisError> {
        self.running.store(false, Ordering::SeqCst);
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        handle.thread().unpark();
        handle.join().map_err(|_| {
            AnalysisError::ProcessingError("Analysis worker panicked".to_string())
        })
    }
}

impl<E: ChromaExtractor + 'static> Drop for Session<E> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("Session dropped: {}", e);
        }
    }
}

struct Worker<E> {
    engine: Arc<Mutex<ChordEngine<E>>>,
    buffer: Arc<StreamingFrameBuffer>,
    running: Arc<AtomicBool>,
    events: SyncSender<SessionEvent>,
    started: Instant,
    window_size: usize,
    hop_size: usize,
    poll_interval: Duration,
}

impl<E: ChromaExtractor> Worker<E> {
    fn run(self) {
        log::debug!("Analysis worker running");
        let mut dropped = 0u64;

        while self.running.load(Ordering::SeqCst) {
            while self.running.load(Ordering::SeqCst) {
                let Some(window) = self.buffer.drain(self.window_size, self.hop_size) else {
                    break;
                };
                let timestamp = self.started.elapsed().as_secs_f64();
                let events = lock(&self.engine).process_window(&window, timestamp);
                for event in events {
                    match self.events.try_send(event) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            dropped += 1;
                            log::warn!(
                                "Event queue full, dropped event ({} dropped so far)",
                                dropped
                            );
                        }
                        Err(TrySendError::Disconnected(_)) => {}
                    }
                }
            }
            thread::park_timeout(self.poll_interval);
        }

        log::debug!("Analysis worker exiting ({} events dropped)", dropped);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
