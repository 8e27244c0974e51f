//! Practice session lifecycle and attempt numbering.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::PracticeSession;

impl PracticeSession {
    /// Fresh session for a learner starting a lesson.
    pub fn open(learner_id: Uuid, lesson_id: Uuid, started_at: DateTime<Utc>) -> Self {
        PracticeSession {
            id: Uuid::new_v4(),
            learner_id,
            lesson_id,
            started_at,
            ended_at: None,
            total_attempts: 0,
            successful_attempts: 0,
        }
    }

    /// Copy with the attempt counters bumped. Counters only grow.
    pub fn with_attempt(&self, successful: bool) -> Self {
        let mut next = self.clone();
        next.total_attempts += 1;
        next.successful_attempts += u32::from(successful);
        next
    }

    /// Copy closed at `ended_at`. Closing an already closed session
    /// overwrites the timestamp: the last close wins.
    pub fn closed_at(&self, ended_at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.ended_at = Some(ended_at);
        next
    }
}

/// Next 1-based attempt number given the highest number already stored
/// for one (session, phrase) pair.
pub fn next_attempt_number(highest: Option<u32>) -> u32 {
    highest.map_or(1, |n| n + 1)
}
