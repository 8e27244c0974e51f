//! Per-day analytics accumulation.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::{DailyRecord, PracticeEvent};

impl DailyRecord {
    /// Blank record for a (learner, date) pair with no activity yet.
    pub fn open(learner_id: Uuid, date: NaiveDate) -> Self {
        DailyRecord {
            learner_id,
            date,
            practice_time_minutes: 0,
            lessons_completed: 0,
            total_attempts: 0,
            successful_attempts: 0,
            average_pronunciation_score: 0.0,
        }
    }

    /// Fold one practice event into the day.
    ///
    /// Counters are additive and independent. The running mean weighs
    /// the stored average by the pre-update attempt count, so folding
    /// events one at a time reproduces the arithmetic mean of every
    /// score seen that day.
    pub fn fold(&self, event: &PracticeEvent) -> Self {
        let mut next = self.clone();
        next.practice_time_minutes += event.practice_minutes;
        next.lessons_completed += u32::from(event.lesson_completed);
        next.successful_attempts += u32::from(event.was_successful);

        if let Some(score) = event.attempt_score {
            let n = f64::from(self.total_attempts);
            next.total_attempts += 1;
            next.average_pronunciation_score =
                (self.average_pronunciation_score * n + score) / (n + 1.0);
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_open_is_blank() {
        let r = DailyRecord::open(Uuid::new_v4(), day());
        assert_eq!(r.total_attempts, 0);
        assert_eq!(r.lessons_completed, 0);
        assert_eq!(r.practice_time_minutes, 0);
        assert_eq!(r.average_pronunciation_score, 0.0);
    }

    #[test]
    fn test_fold_first_attempt_sets_average() {
        let r = DailyRecord::open(Uuid::new_v4(), day()).fold(&PracticeEvent::attempt(80.0, true));
        assert_eq!(r.total_attempts, 1);
        assert_eq!(r.successful_attempts, 1);
        assert_eq!(r.average_pronunciation_score, 80.0);
    }

    #[test]
    fn test_fold_zero_score_still_counts() {
        // A scored 0.0 is a real attempt, not a missing score
        let r = DailyRecord::open(Uuid::new_v4(), day())
            .fold(&PracticeEvent::attempt(0.0, false))
            .fold(&PracticeEvent::attempt(90.0, true));
        assert_eq!(r.total_attempts, 2);
        assert_eq!(r.successful_attempts, 1);
        assert!((r.average_pronunciation_score - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_online_mean_matches_direct_mean() {
        let scores = [72.5, 88.0, 64.25, 91.0, 55.5];
        let mut r = DailyRecord::open(Uuid::new_v4(), day());
        for &s in &scores {
            r = r.fold(&PracticeEvent::attempt(s, s >= 70.0));
        }
        let direct: f64 = scores.iter().sum::<f64>() / scores.len() as f64;
        assert_eq!(r.total_attempts, scores.len() as u32);
        assert!((r.average_pronunciation_score - direct).abs() < 1e-9);
    }

    #[test]
    fn test_fold_without_attempt_leaves_average() {
        let r = DailyRecord::open(Uuid::new_v4(), day())
            .fold(&PracticeEvent::attempt(66.0, false))
            .fold(&PracticeEvent::practice_time(25))
            .fold(&PracticeEvent::lesson_completed());
        assert_eq!(r.total_attempts, 1);
        assert_eq!(r.practice_time_minutes, 25);
        assert_eq!(r.lessons_completed, 1);
        assert_eq!(r.average_pronunciation_score, 66.0);
    }

    #[test]
    fn test_counters_are_independent() {
        // Nothing couples the success counter to the score field
        let e = PracticeEvent {
            was_successful: true,
            ..Default::default()
        };
        let r = DailyRecord::open(Uuid::new_v4(), day()).fold(&e);
        assert_eq!(r.successful_attempts, 1);
        assert_eq!(r.total_attempts, 0);
    }
}
