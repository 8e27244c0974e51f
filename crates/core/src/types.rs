use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signal-level quality measurements for one recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioQuality {
    /// Mean squared sample amplitude
    pub energy: f64,
    /// Mean per-frame zero-crossing rate
    pub zero_crossing_rate: f64,
    /// Signal-to-noise estimate (dB); 100 when no noise is measurable
    pub snr_db: f64,
}

/// Pitch statistics over the voiced frames of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prosody {
    /// Mean fundamental frequency in Hz, 0 when no frame is voiced
    pub mean_pitch: f64,
    /// Population standard deviation of the frame pitches in Hz
    pub pitch_std: f64,
}

/// Full assessment of one practice attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 0 to 100, derived from the word error rate
    pub pronunciation_score: f64,
    /// Weighted agreement of text accuracy and recording quality.
    /// Deliberately unclamped: a hypothesis much longer than the
    /// reference can drive this negative.
    pub confidence_score: f64,
    pub word_error_rate: f64,
    pub character_error_rate: f64,
    pub audio: AudioQuality,
    pub prosody: Prosody,
}

/// Learner-facing feedback attached to a stored attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptFeedback {
    /// One-line verdict
    pub overall: String,
    pub word_error_rate: f64,
    pub character_error_rate: f64,
    pub audio: AudioQuality,
    /// Backend-specific recognizer details, passed through untouched
    #[serde(default)]
    pub recognizer_metrics: serde_json::Value,
}

/// One stored phrase attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub session_id: Uuid,
    /// Identifier of the phrase inside the lesson
    pub phrase_id: String,
    pub reference_text: String,
    /// What the recognizer heard
    pub transcription: String,
    /// Opaque locator of the stored recording; the engine never
    /// dereferences it
    pub audio_url: Option<String>,
    pub score: ScoreResult,
    /// 1-based, counted per (session, phrase)
    pub attempt_number: u32,
    pub success: bool,
    pub feedback: AttemptFeedback,
    pub created_at: DateTime<Utc>,
}

/// One practice session: a learner working through a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeSession {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub lesson_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_attempts: u32,
    pub successful_attempts: u32,
}

/// Per-learner, per-calendar-day analytics accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub learner_id: Uuid,
    pub date: NaiveDate,
    pub practice_time_minutes: u32,
    pub lessons_completed: u32,
    pub total_attempts: u32,
    pub successful_attempts: u32,
    /// Running mean over the day's scored attempts, 0 when none
    pub average_pronunciation_score: f64,
}

/// One unit of practice activity to fold into a day's record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeEvent {
    pub practice_minutes: u32,
    pub lesson_completed: bool,
    /// Present when the event carries a scored attempt. `Some(0.0)` is
    /// a real score and still counts as an attempt.
    pub attempt_score: Option<f64>,
    pub was_successful: bool,
}

impl PracticeEvent {
    /// Event for one scored attempt.
    pub fn attempt(score: f64, successful: bool) -> Self {
        PracticeEvent {
            attempt_score: Some(score),
            was_successful: successful,
            ..Default::default()
        }
    }

    /// Event adding practice time, in minutes.
    pub fn practice_time(minutes: u32) -> Self {
        PracticeEvent {
            practice_minutes: minutes,
            ..Default::default()
        }
    }

    /// Event marking one lesson finished.
    pub fn lesson_completed() -> Self {
        PracticeEvent {
            lesson_completed: true,
            ..Default::default()
        }
    }
}
