//! Streaming frame buffer
//!
//! Absorbs arbitrarily sized sample chunks from a capture context and hands fixed-size,
//! optionally overlapping analysis windows to the pipeline. The queue is bounded: a push that
//! takes it past the configured ceiling drops the oldest samples instead of blocking the
//! producer.
//!
//! # Example
//!
//! ```
//! use harmoniq::io::frame_buffer::StreamingFrameBuffer;
//!
//! let buffer = StreamingFrameBuffer::new(4096);
//! buffer.push(&vec![0.1f32; 1500]);
//! assert!(buffer.drain(2048, 1024).is_none());
//!
//! buffer.push(&vec![0.1f32; 1500]);
//! let window = buffer.drain(2048, 1024).unwrap();
//! assert_eq!(window.len(), 2048);
//! assert_eq!(buffer.len(), 3000 - 1024);
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct BufferState {
    queue: VecDeque<f32>,
    pushed_total: u64,
    dropped_total: u64,
    overflowing: bool,
}

/// Bounded sample queue shared between a producer and the analysis worker
///
/// `push` and `drain` take the same lock, so they are mutually exclusive. Both are short and
/// never wait on anything but that lock.
#[derive(Debug)]
pub struct StreamingFrameBuffer {
    state: Mutex<BufferState>,
    max_samples: usize,
}

impl StreamingFrameBuffer {
    /// Create a buffer that never retains more than `max_samples` samples
    pub fn new(max_samples: usize) -> Self {
        Self {
            state: Mutex::new(BufferState {
                queue: VecDeque::with_capacity(max_samples),
                ..BufferState::default()
            }),
            max_samples,
        }
    }

    /// Append samples, evicting the oldest ones if the ceiling is exceeded
    ///
    /// Returns the number of samples dropped by this push (0 in the common case).
    pub fn push(&self, samples: &[f32]) -> usize {
        if samples.is_empty() {
            return 0;
        }

        let mut state = self.lock();
        state.queue.extend(samples.iter().copied());
        state.pushed_total += samples.len() as u64;

        let overflow = state.queue.len().saturating_sub(self.max_samples);
        if overflow > 0 {
            state.queue.drain(..overflow);
            state.dropped_total += overflow as u64;
            if !state.overflowing {
                state.overflowing = true;
                log::warn!(
                    "Frame buffer overflow (ceiling {}): consumer is falling behind, dropping oldest samples",
                    self.max_samples
                );
            }
            log::debug!("Frame buffer dropped {} oldest samples", overflow);
        } else if state.overflowing {
            state.overflowing = false;
            log::warn!(
                "Frame buffer overflow cleared after {} dropped samples in total",
                state.dropped_total
            );
        }
        overflow
    }

    /// Take the oldest `window_size` samples and advance the read position by `hop_size`
    ///
    /// Returns `None` while fewer than `window_size` samples are queued.
    pub fn drain(&self, window_size: usize, hop_size: usize) -> Option<Vec<f32>> {
        if window_size == 0 {
            return None;
        }

        let mut state = self.lock();
        if state.queue.len() < window_size {
            return None;
        }

        let window: Vec<f32> = state.queue.iter().take(window_size).copied().collect();
        let advance = hop_size.min(state.queue.len());
        state.queue.drain(..advance);
        Some(window)
    }

    /// Number of samples currently queued
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// True if no samples are queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of samples retained
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Total samples pushed and total samples dropped since creation
    pub fn totals(&self) -> (u64, u64) {
        let state = self.lock();
        (state.pushed_total, state.dropped_total)
    }

    /// True while pushes keep exceeding the ceiling
    pub fn is_overflowing(&self) -> bool {
        self.lock().overflowing
    }

    /// Discard everything queued
    pub fn clear(&self) {
        let mut state = self.lock();
        state.queue.clear();
        state.overflowing = false;
    }

    // A panic while holding the lock cannot leave the queue half-updated, so a poisoned
    // mutex is still safe to use.
    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
