//! Error type shared across the engine.
//!
//! Callers match on the variant to tell a rejected request apart from a
//! missing entity or a lost write race, so this is a closed enum rather
//! than an opaque error chain.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Request-level input that can never be scored, e.g. an empty
    /// reference text.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Waveform that cannot be analyzed (empty, zero sample rate,
    /// unreadable file).
    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    /// A referenced entity does not exist in the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A read-modify-write cycle lost a race and was not applied. The
    /// bundled in-memory store serializes writers per entity and never
    /// returns this; stores built on optimistic concurrency do.
    #[error("concurrent update conflict: {0}")]
    Conflict(String),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
