//! Pronunciation assessment and progress analytics for speech
//! practice.
//!
//! The crate splits into pure measurement (text metrics in [`text`],
//! waveform features in [`audio`], composite scoring in [`scoring`])
//! and stateful tracking (sessions, daily records, reports under
//! [`analytics`]), joined by [`engine::PracticeEngine`] over the
//! [`store::PracticeStore`] seam. Speech recognition itself stays
//! behind the [`asr::Recognizer`] trait; the engine only consumes
//! transcripts.

pub mod analytics;
pub mod asr;
pub mod audio;
pub mod engine;
pub mod error;
pub mod scoring;
pub mod session;
pub mod store;
pub mod text;
pub mod types;

pub use engine::{AttemptRequest, PracticeEngine};
pub use error::{EngineError, Result};
