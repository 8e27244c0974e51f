//! The engine: pure scoring glued to a storage seam.
//!
//! Clocks and calendars are always supplied by the caller. Nothing in
//! here reads the system time, which keeps every operation replayable
//! and testable.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::analytics::achievements::{self, AchievementReport};
use crate::analytics::report::{self, Dashboard, ProgressTrend};
use crate::asr::Transcription;
use crate::error::Result;
use crate::scoring;
use crate::session::next_attempt_number;
use crate::store::PracticeStore;
use crate::types::{Attempt, DailyRecord, PracticeEvent, PracticeSession};

/// Sessions shown on the dashboard.
const RECENT_SESSION_LIMIT: usize = 5;

/// Everything needed to record one scored attempt.
#[derive(Debug)]
pub struct AttemptRequest<'a> {
    pub session_id: Uuid,
    pub phrase_id: &'a str,
    pub reference_text: &'a str,
    pub transcription: &'a Transcription,
    /// Mono waveform of the learner's recording
    pub samples: &'a [f64],
    pub sample_rate: u32,
    /// Where the recording was stored, if anywhere
    pub audio_url: Option<&'a str>,
    /// Calendar day the attempt lands on for analytics
    pub date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

pub struct PracticeEngine<S> {
    store: S,
}

impl<S: PracticeStore> PracticeEngine<S> {
    pub fn new(store: S) -> Self {
        PracticeEngine { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a session for a learner starting a lesson.
    pub fn start_session(
        &self,
        learner_id: Uuid,
        lesson_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> Result<PracticeSession> {
        let session = PracticeSession::open(learner_id, lesson_id, started_at);
        self.store.insert_session(session.clone())?;
        log::info!("session {} started for learner {}", session.id, learner_id);
        Ok(session)
    }

    /// Close a session. Closing an already closed session overwrites
    /// the timestamp: the last close wins.
    pub fn end_session(
        &self,
        session_id: Uuid,
        ended_at: DateTime<Utc>,
    ) -> Result<PracticeSession> {
        let session = self
            .store
            .update_session(session_id, &|s| s.closed_at(ended_at))?;
        log::info!("session {} ended", session_id);
        Ok(session)
    }

    /// Score an attempt and commit it: store the attempt row, bump the
    /// session counters, and fold the score into the learner's day.
    ///
    /// Scoring is pure and runs before any write, so a scoring failure
    /// leaves every aggregate untouched. The three writes are each
    /// atomic per entity but not jointly: if the daily fold fails after
    /// the session counters committed, the mismatch is logged for
    /// reconciliation and the error returned.
    pub fn record_attempt(&self, request: &AttemptRequest) -> Result<Attempt> {
        let session = self.store.session(request.session_id)?;

        let score = scoring::score(
            request.reference_text,
            &request.transcription.text,
            request.samples,
            request.sample_rate,
        )?;
        let success = score.is_success();
        let feedback = score.feedback(request.transcription.metrics.clone());

        let highest = self
            .store
            .last_attempt_number(request.session_id, request.phrase_id)?;

        let attempt = Attempt {
            id: Uuid::new_v4(),
            session_id: request.session_id,
            phrase_id: request.phrase_id.to_string(),
            reference_text: request.reference_text.to_string(),
            transcription: request.transcription.text.clone(),
            audio_url: request.audio_url.map(str::to_string),
            score,
            attempt_number: next_attempt_number(highest),
            success,
            feedback,
            created_at: request.recorded_at,
        };
        self.store.insert_attempt(attempt.clone())?;

        self.store
            .update_session(request.session_id, &|s| s.with_attempt(success))?;

        let event = PracticeEvent::attempt(attempt.score.pronunciation_score, success);
        if let Err(e) = self.apply_event(session.learner_id, request.date, &event) {
            log::warn!(
                "attempt {} committed to session {} but the daily fold for learner {} on {} \
                 failed: {}; reconcile the day from stored attempts",
                attempt.id,
                request.session_id,
                session.learner_id,
                request.date,
                e
            );
            return Err(e);
        }

        log::debug!(
            "attempt #{} on phrase {} scored {:.2}",
            attempt.attempt_number,
            request.phrase_id,
            attempt.score.pronunciation_score
        );

        Ok(attempt)
    }

    /// Fold one practice event into a learner's daily record, creating
    /// the record on the first activity of the day.
    pub fn apply_event(
        &self,
        learner_id: Uuid,
        date: NaiveDate,
        event: &PracticeEvent,
    ) -> Result<DailyRecord> {
        self.store
            .upsert_daily(learner_id, date, &|current| match current {
                Some(record) => record.fold(event),
                None => DailyRecord::open(learner_id, date).fold(event),
            })
    }

    /// Attempts of one session in the order they were made.
    pub fn session_attempts(&self, session_id: Uuid) -> Result<Vec<Attempt>> {
        // Unknown sessions are an error, not an empty list
        self.store.session(session_id)?;
        self.store.attempts_for_session(session_id)
    }

    /// Milestone report over the learner's whole history.
    pub fn achievements(&self, learner_id: Uuid, today: NaiveDate) -> Result<AchievementReport> {
        let records = self.store.daily_records(learner_id)?;
        Ok(achievements::evaluate(&records, today))
    }

    /// Dashboard over the window `[today - days, today]` plus the most
    /// recently started sessions.
    pub fn dashboard(&self, learner_id: Uuid, today: NaiveDate, days: u32) -> Result<Dashboard> {
        let records = self.store.daily_records(learner_id)?;
        let daily = report::window(&records, today, days);
        let summary = report::dashboard_summary(&daily, days);

        let mut sessions = self.store.sessions_for_learner(learner_id)?;
        sessions.sort_by_key(|s| std::cmp::Reverse(s.started_at));
        sessions.truncate(RECENT_SESSION_LIMIT);

        Ok(Dashboard {
            summary,
            daily,
            recent_sessions: sessions,
        })
    }

    /// Score and success-rate trajectory over the window.
    pub fn progress_trend(
        &self,
        learner_id: Uuid,
        today: NaiveDate,
        days: u32,
    ) -> Result<ProgressTrend> {
        let records = self.store.daily_records(learner_id)?;
        Ok(report::progress_trend(&records, today, days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::store::MemoryStore;
    use chrono::{Days, TimeZone};

    fn engine() -> PracticeEngine<MemoryStore> {
        PracticeEngine::new(MemoryStore::new())
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    // DC "recording": deterministic features, SNR at the ceiling
    fn audio() -> Vec<f64> {
        vec![0.5; 4000]
    }

    fn record(
        engine: &PracticeEngine<MemoryStore>,
        session_id: Uuid,
        phrase_id: &str,
        reference: &str,
        heard: &str,
        day: u32,
    ) -> Result<Attempt> {
        let transcription = Transcription::from_text(heard);
        let samples = audio();
        engine.record_attempt(&AttemptRequest {
            session_id,
            phrase_id,
            reference_text: reference,
            transcription: &transcription,
            samples: &samples,
            sample_rate: 16000,
            audio_url: None,
            date: d(day),
            recorded_at: ts(day, 10),
        })
    }

    #[test]
    fn test_record_attempt_end_to_end() {
        let eng = engine();
        let learner = Uuid::new_v4();
        let session = eng.start_session(learner, Uuid::new_v4(), ts(10, 9)).unwrap();

        let attempt = record(&eng, session.id, "p1", "I wash my hands", "I wash hands", 10).unwrap();
        assert_eq!(attempt.attempt_number, 1);
        assert_eq!(attempt.score.pronunciation_score, 75.0);
        assert!(attempt.success);
        assert_eq!(attempt.feedback.overall, "Good");

        let session = eng.store().session(session.id).unwrap();
        assert_eq!(session.total_attempts, 1);
        assert_eq!(session.successful_attempts, 1);

        let days = eng.store().daily_records(learner).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].total_attempts, 1);
        assert_eq!(days[0].average_pronunciation_score, 75.0);
    }

    #[test]
    fn test_attempt_keeps_audio_reference() {
        let eng = engine();
        let session = eng
            .start_session(Uuid::new_v4(), Uuid::new_v4(), ts(10, 9))
            .unwrap();
        let transcription = Transcription::from_text("hello");
        let samples = audio();
        let attempt = eng
            .record_attempt(&AttemptRequest {
                session_id: session.id,
                phrase_id: "p1",
                reference_text: "hello",
                transcription: &transcription,
                samples: &samples,
                sample_rate: 16000,
                audio_url: Some("recordings/p1-take1.wav"),
                date: d(10),
                recorded_at: ts(10, 10),
            })
            .unwrap();
        assert_eq!(attempt.audio_url.as_deref(), Some("recordings/p1-take1.wav"));
    }

    #[test]
    fn test_attempt_numbers_count_per_phrase() {
        let eng = engine();
        let session = eng
            .start_session(Uuid::new_v4(), Uuid::new_v4(), ts(10, 9))
            .unwrap();

        let a = record(&eng, session.id, "p1", "good morning", "good morning", 10).unwrap();
        let b = record(&eng, session.id, "p1", "good morning", "morning", 10).unwrap();
        let c = record(&eng, session.id, "p2", "thank you", "thank you", 10).unwrap();
        assert_eq!((a.attempt_number, b.attempt_number, c.attempt_number), (1, 2, 1));
    }

    #[test]
    fn test_scoring_failure_leaves_everything_untouched() {
        let eng = engine();
        let learner = Uuid::new_v4();
        let session = eng.start_session(learner, Uuid::new_v4(), ts(10, 9)).unwrap();

        let err = record(&eng, session.id, "p1", "   ", "hello", 10).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let session = eng.store().session(session.id).unwrap();
        assert_eq!(session.total_attempts, 0);
        assert!(eng.store().daily_records(learner).unwrap().is_empty());
        assert!(eng.session_attempts(session.id).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let eng = engine();
        let err = record(&eng, Uuid::new_v4(), "p1", "hello", "hello", 10).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
        assert!(matches!(
            eng.session_attempts(Uuid::new_v4()),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_end_session_last_close_wins() {
        let eng = engine();
        let session = eng
            .start_session(Uuid::new_v4(), Uuid::new_v4(), ts(10, 9))
            .unwrap();

        let closed = eng.end_session(session.id, ts(10, 11)).unwrap();
        assert_eq!(closed.ended_at, Some(ts(10, 11)));
        let closed = eng.end_session(session.id, ts(10, 12)).unwrap();
        assert_eq!(closed.ended_at, Some(ts(10, 12)));
    }

    #[test]
    fn test_apply_event_creates_day_lazily() {
        let eng = engine();
        let learner = Uuid::new_v4();
        assert!(eng.store().daily_records(learner).unwrap().is_empty());

        let day = eng
            .apply_event(learner, d(10), &PracticeEvent::practice_time(15))
            .unwrap();
        assert_eq!(day.practice_time_minutes, 15);
        assert_eq!(day.total_attempts, 0);

        let day = eng
            .apply_event(learner, d(10), &PracticeEvent::lesson_completed())
            .unwrap();
        assert_eq!(day.practice_time_minutes, 15);
        assert_eq!(day.lessons_completed, 1);
    }

    #[test]
    fn test_dashboard_window_and_recent_sessions() {
        let eng = engine();
        let learner = Uuid::new_v4();

        // Six sessions on consecutive days; only five make the cut
        let mut ids = Vec::new();
        for day in 5..11 {
            let s = eng.start_session(learner, Uuid::new_v4(), ts(day, 9)).unwrap();
            ids.push(s.id);
        }
        // Activity on two days, one of them outside a 2-day window
        eng.apply_event(learner, d(10), &PracticeEvent::attempt(90.0, true)).unwrap();
        eng.apply_event(learner, d(10), &PracticeEvent::attempt(70.0, true)).unwrap();
        eng.apply_event(learner, d(5), &PracticeEvent::attempt(40.0, false)).unwrap();

        let dash = eng.dashboard(learner, d(10), 2).unwrap();
        assert_eq!(dash.summary.total_attempts, 2);
        assert_eq!(dash.summary.average_pronunciation_score, 80.0);
        assert_eq!(dash.summary.success_rate, 100.0);
        assert_eq!(dash.summary.days_analyzed, 2);
        assert_eq!(dash.daily.len(), 1);

        assert_eq!(dash.recent_sessions.len(), 5);
        // Newest first: the day-5 session dropped off
        assert_eq!(dash.recent_sessions[0].id, ids[5]);
        assert!(dash.recent_sessions.iter().all(|s| s.id != ids[0]));
    }

    #[test]
    fn test_practice_week() {
        let eng = engine();
        let learner = Uuid::new_v4();
        let lesson = Uuid::new_v4();

        // A week of daily practice: one session per day, a perfect
        // attempt and an 80% attempt, ten minutes, one lesson done.
        for day in 4..11 {
            let session = eng.start_session(learner, lesson, ts(day, 9)).unwrap();
            record(&eng, session.id, "p1", "a b c d e", "a b c d e", day).unwrap();
            record(&eng, session.id, "p2", "a b c d e", "a b c d x", day).unwrap();
            eng.apply_event(learner, d(day), &PracticeEvent::practice_time(10)).unwrap();
            eng.apply_event(learner, d(day), &PracticeEvent::lesson_completed()).unwrap();
            eng.end_session(session.id, ts(day, 10)).unwrap();
        }

        let report = eng.achievements(learner, d(10)).unwrap();
        assert_eq!(report.total_lessons_completed, 7);
        assert_eq!(report.total_practice_minutes, 70);
        assert_eq!(report.total_attempts, 14);
        assert_eq!(report.current_streak_days, 7);
        assert_eq!(report.best_daily_score, 90.0);

        let names: Vec<&str> = report.achievements.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "First Steps",
                "Learning Journey",
                "Practice Warrior",
                "Consistency King",
                "Week Warrior",
                "Excellence",
            ]
        );

        let trend = eng.progress_trend(learner, d(10), 30).unwrap();
        assert_eq!(trend.data.len(), 7);
        assert!(trend.data.iter().all(|p| p.pronunciation_score == 90.0));
        assert!(trend.data.iter().all(|p| p.success_rate == 100.0));

        // Every session closed with its two attempts on file
        let dash = eng.dashboard(learner, d(10), 7).unwrap();
        for session in &dash.recent_sessions {
            assert!(session.ended_at.is_some());
            assert_eq!(session.total_attempts, 2);
            assert_eq!(eng.session_attempts(session.id).unwrap().len(), 2);
        }
    }

    #[test]
    fn test_streak_breaks_after_missed_day() {
        let eng = engine();
        let learner = Uuid::new_v4();
        for day in [6u32, 8, 9, 10] {
            eng.apply_event(learner, d(day), &PracticeEvent::practice_time(5)).unwrap();
        }
        let report = eng.achievements(learner, d(10)).unwrap();
        assert_eq!(report.current_streak_days, 3);

        // A day later with no practice yet, the streak is gone
        let report = eng
            .achievements(learner, d(10).checked_add_days(Days::new(1)).unwrap())
            .unwrap();
        assert_eq!(report.current_streak_days, 0);
    }
}
