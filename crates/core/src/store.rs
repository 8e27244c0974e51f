//! Storage seam and the in-memory reference store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::types::{Attempt, DailyRecord, PracticeSession};

/// Persistence seam for the engine.
///
/// Writer contract: `update_session` and `upsert_daily` apply the
/// closure to the current value and commit the result as one atomic
/// step for that entity. Writers on different sessions or different
/// (learner, date) rows may proceed in parallel; two writers on the
/// same row must serialize, or one must fail with `Conflict`.
pub trait PracticeStore: Send + Sync {
    /// Insert a freshly opened session. Ids are caller-generated v4
    /// uuids, so collisions are not handled.
    fn insert_session(&self, session: PracticeSession) -> Result<()>;

    fn session(&self, id: Uuid) -> Result<PracticeSession>;

    /// Atomically replace a session with `apply(current)`.
    fn update_session(
        &self,
        id: Uuid,
        apply: &dyn Fn(&PracticeSession) -> PracticeSession,
    ) -> Result<PracticeSession>;

    /// Every session of one learner, in no particular order.
    fn sessions_for_learner(&self, learner_id: Uuid) -> Result<Vec<PracticeSession>>;

    fn insert_attempt(&self, attempt: Attempt) -> Result<()>;

    /// Attempts of one session in insertion order.
    fn attempts_for_session(&self, session_id: Uuid) -> Result<Vec<Attempt>>;

    /// Highest stored attempt number for a (session, phrase) pair.
    ///
    /// Numbering is read-then-insert, so two concurrent attempts on
    /// the same pair can observe the same value; a session serves one
    /// learner device, which keeps that out of normal operation.
    fn last_attempt_number(&self, session_id: Uuid, phrase_id: &str) -> Result<Option<u32>>;

    /// Atomically create-or-update the (learner, date) record: `apply`
    /// receives the current record if one exists and returns the
    /// record to store.
    fn upsert_daily(
        &self,
        learner_id: Uuid,
        date: NaiveDate,
        apply: &dyn Fn(Option<&DailyRecord>) -> DailyRecord,
    ) -> Result<DailyRecord>;

    /// Every daily record of one learner, in no particular order.
    fn daily_records(&self, learner_id: Uuid) -> Result<Vec<DailyRecord>>;
}

/// In-memory store with one lock per mutable row.
///
/// The outer maps are locked only long enough to find or insert a
/// row's `Arc`; the row mutex is then held for the whole
/// read-modify-write. That serializes writers per entity without
/// blocking unrelated rows, so this store never returns `Conflict`.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<PracticeSession>>>>,
    attempts: RwLock<HashMap<Uuid, Vec<Attempt>>>,
    daily: RwLock<HashMap<(Uuid, NaiveDate), Arc<Mutex<Option<DailyRecord>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn session_cell(&self, id: Uuid) -> Result<Arc<Mutex<PracticeSession>>> {
        let sessions = self.sessions.read().unwrap();
        sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("session", id))
    }

    fn daily_cell(&self, learner_id: Uuid, date: NaiveDate) -> Arc<Mutex<Option<DailyRecord>>> {
        let mut daily = self.daily.write().unwrap();
        daily
            .entry((learner_id, date))
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }
}

impl PracticeStore for MemoryStore {
    fn insert_session(&self, session: PracticeSession) -> Result<()> {
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(session.id, Arc::new(Mutex::new(session)));
        Ok(())
    }

    fn session(&self, id: Uuid) -> Result<PracticeSession> {
        let cell = self.session_cell(id)?;
        let session = cell.lock().unwrap().clone();
        Ok(session)
    }

    fn update_session(
        &self,
        id: Uuid,
        apply: &dyn Fn(&PracticeSession) -> PracticeSession,
    ) -> Result<PracticeSession> {
        let cell = self.session_cell(id)?;
        let mut guard = cell.lock().unwrap();
        let next = apply(&guard);
        *guard = next.clone();
        Ok(next)
    }

    fn sessions_for_learner(&self, learner_id: Uuid) -> Result<Vec<PracticeSession>> {
        let sessions = self.sessions.read().unwrap();
        let out = sessions
            .values()
            .map(|cell| cell.lock().unwrap().clone())
            .filter(|s| s.learner_id == learner_id)
            .collect();
        Ok(out)
    }

    fn insert_attempt(&self, attempt: Attempt) -> Result<()> {
        let mut attempts = self.attempts.write().unwrap();
        attempts.entry(attempt.session_id).or_default().push(attempt);
        Ok(())
    }

    fn attempts_for_session(&self, session_id: Uuid) -> Result<Vec<Attempt>> {
        let attempts = self.attempts.read().unwrap();
        Ok(attempts.get(&session_id).cloned().unwrap_or_default())
    }

    fn last_attempt_number(&self, session_id: Uuid, phrase_id: &str) -> Result<Option<u32>> {
        let attempts = self.attempts.read().unwrap();
        let highest = attempts
            .get(&session_id)
            .into_iter()
            .flatten()
            .filter(|a| a.phrase_id == phrase_id)
            .map(|a| a.attempt_number)
            .max();
        Ok(highest)
    }

    fn upsert_daily(
        &self,
        learner_id: Uuid,
        date: NaiveDate,
        apply: &dyn Fn(Option<&DailyRecord>) -> DailyRecord,
    ) -> Result<DailyRecord> {
        let cell = self.daily_cell(learner_id, date);
        let mut guard = cell.lock().unwrap();
        let next = apply(guard.as_ref());
        *guard = Some(next.clone());
        Ok(next)
    }

    fn daily_records(&self, learner_id: Uuid) -> Result<Vec<DailyRecord>> {
        let daily = self.daily.read().unwrap();
        let out = daily
            .iter()
            .filter(|((learner, _), _)| *learner == learner_id)
            .filter_map(|(_, cell)| cell.lock().unwrap().clone())
            .collect();
        Ok(out)
    }
}
