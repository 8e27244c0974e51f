//! Audio feature extraction and WAV input.

pub mod features;
pub mod io;
