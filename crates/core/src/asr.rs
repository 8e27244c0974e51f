//! Speech recognition seam.
//!
//! The engine never runs ASR itself: recognition sits behind the
//! [`Recognizer`] trait, so tests and offline tools inject transcripts
//! while a deployment wires in a real model backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Learner profile hints a backend may use to pick or prompt a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionContext {
    /// Recognition language, e.g. "english" or "swahili"
    pub language: String,
    /// Impairment severity band, e.g. "mild", "moderate", "severe"
    pub severity: String,
    /// Impairment etiology in snake_case, e.g. "cerebral_palsy"
    pub etiology: String,
}

impl Default for RecognitionContext {
    fn default() -> Self {
        RecognitionContext {
            language: "english".to_string(),
            severity: "moderate".to_string(),
            etiology: "none".to_string(),
        }
    }
}

/// Recognizer output: hypothesis text plus whatever run metrics the
/// backend wants preserved alongside the stored attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    #[serde(default)]
    pub metrics: Value,
}

impl Transcription {
    pub fn from_text(text: impl Into<String>) -> Self {
        Transcription {
            text: text.into(),
            metrics: Value::Null,
        }
    }
}

/// Recognition backend.
pub trait Recognizer: Send + Sync {
    /// Backend name for logs and stored metrics.
    fn name(&self) -> &str;

    /// Transcribe a mono waveform.
    fn transcribe(
        &self,
        samples: &[f64],
        sample_rate: u32,
        ctx: &RecognitionContext,
    ) -> Result<Transcription>;
}

/// Backend returning a transcript decided in advance. Used by the CLI
/// when the hypothesis is already known, and by tests.
pub struct FixedTranscript(pub String);

impl Recognizer for FixedTranscript {
    fn name(&self) -> &str {
        "fixed"
    }

    fn transcribe(
        &self,
        _samples: &[f64],
        _sample_rate: u32,
        _ctx: &RecognitionContext,
    ) -> Result<Transcription> {
        Ok(Transcription::from_text(self.0.clone()))
    }
}
