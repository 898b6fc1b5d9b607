//! Audio preprocessing modules
//!
//! Utilities applied to samples before feature extraction:
//! - RMS volume and the silence gate
//! - Channel mixing (interleaved multi-channel to mono)

pub mod channel_mixer;
pub mod silence;
