//! Score fusion: text error rates and signal features combined into a
//! pronunciation score, a confidence measure, and learner feedback.

use serde_json::Value;

use crate::audio::features::AudioFeatures;
use crate::error::Result;
use crate::text::metrics::{character_error_rate, word_error_rate};
use crate::types::{AttemptFeedback, AudioQuality, Prosody, ScoreResult};

/// Attempts scoring at or above this count as successful.
pub const SUCCESS_THRESHOLD: f64 = 70.0;

/// SNR at which the audio term of the confidence score saturates.
const SNR_FULL_MARKS_DB: f64 = 30.0;

/// Confidence weights over (1 - wer), (1 - cer), and capped SNR.
const WER_WEIGHT: f64 = 0.5;
const CER_WEIGHT: f64 = 0.3;
const SNR_WEIGHT: f64 = 0.2;

/// Score one attempt: `reference` against the recognizer `hypothesis`,
/// with the recorded waveform for the quality measures.
///
/// Pure; fails without side effects on an empty reference or unusable
/// audio. Every field of the result is rounded for presentation.
pub fn score(
    reference: &str,
    hypothesis: &str,
    samples: &[f64],
    sample_rate: u32,
) -> Result<ScoreResult> {
    let wer = word_error_rate(reference, hypothesis)?;
    let cer = character_error_rate(reference, hypothesis)?;
    let features = AudioFeatures::extract(samples, sample_rate)?;

    let accuracy = (1.0 - wer).max(0.0) * 100.0;

    // The text terms are intentionally unclamped, so a degenerate
    // hypothesis drives confidence negative; the audio term saturates
    // once SNR reaches full marks.
    let confidence = (1.0 - wer) * WER_WEIGHT
        + (1.0 - cer) * CER_WEIGHT
        + (features.snr_db / SNR_FULL_MARKS_DB).min(1.0) * SNR_WEIGHT;

    Ok(ScoreResult {
        pronunciation_score: round_to(accuracy, 2),
        confidence_score: round_to(confidence, 3),
        word_error_rate: round_to(wer, 3),
        character_error_rate: round_to(cer, 3),
        audio: AudioQuality {
            energy: round_to(features.energy, 6),
            zero_crossing_rate: round_to(features.zero_crossing_rate, 6),
            snr_db: round_to(features.snr_db, 2),
        },
        prosody: Prosody {
            mean_pitch: round_to(features.mean_pitch, 2),
            pitch_std: round_to(features.pitch_std, 2),
        },
    })
}

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl ScoreResult {
    /// Whether this attempt clears [`SUCCESS_THRESHOLD`].
    pub fn is_success(&self) -> bool {
        self.pronunciation_score >= SUCCESS_THRESHOLD
    }

    /// One-line verdict for learner feedback.
    pub fn verdict(&self) -> &'static str {
        if self.is_success() {
            "Good"
        } else {
            "Needs improvement"
        }
    }

    /// Assemble stored feedback, carrying backend recognizer metrics
    /// through untouched.
    pub fn feedback(&self, recognizer_metrics: Value) -> AttemptFeedback {
        AttemptFeedback {
            overall: self.verdict().to_string(),
            word_error_rate: self.word_error_rate,
            character_error_rate: self.character_error_rate,
            audio: self.audio,
            recognizer_metrics,
        }
    }
}
