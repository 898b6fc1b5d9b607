//! Feature extraction modules
//!
//! This module contains the musical feature stages:
//! - Chroma extraction
//! - Chord recognition
//! - Key detection and tracking
//! - Progression analysis

pub mod chords;
pub mod chroma;
pub mod key;
pub mod progression;
