//! Analysis and session modules
//!
//! Runs feature extraction on a live stream and aggregates the results:
//! - Result types (chord events, key state, session events and summaries)
//! - Committed chord history
//! - Per-window pipeline (silence gate → chroma → chord match)
//! - Synchronous engine and threaded session

pub mod engine;
pub mod history;
pub mod pipeline;
pub mod result;
pub mod session;
