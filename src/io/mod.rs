//! Audio I/O modules
//!
//! The capture side of a session: the bounded frame buffer shared with the analysis worker,
//! PCM sample-format conversion, and file decoding using Symphonia.

pub mod decoder;
pub mod frame_buffer;
pub mod pcm;
