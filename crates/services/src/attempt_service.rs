use std::sync::Arc;

use tracing::{info, warn};

use storage::repository::{AttemptRepository, StorageError};
use uebung_core::model::{AttemptDraft, AttemptId, AttemptRecord};
use uebung_core::time::format_local;

use crate::Clock;
use crate::journal::{JournalEntry, display_name, journal_entries};

/// Ids tried after the clock's millisecond value collides with a saved attempt.
const ID_RETRIES: u64 = 3;

/// Result of saving a checked attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved(AttemptId),
    /// The learner name was blank; nothing was written.
    NameRequired,
    /// Nothing to save, or the store refused the write.
    NotSaved,
}

impl SaveStatus {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Saved(_) => "Gespeichert.",
            Self::NameRequired => "Bitte gib deinen Namen ein.",
            Self::NotSaved => "Speichern nicht moeglich.",
        }
    }
}

/// Result of a delete request confirmed by typing the attempt's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NameMismatch { expected: String },
    NotFound,
    Failed,
}

/// Reads, writes and deletes saved attempts without ever failing the caller.
#[derive(Clone)]
pub struct AttemptService {
    clock: Clock,
    attempts: Arc<dyn AttemptRepository>,
}

impl AttemptService {
    #[must_use]
    pub fn new(clock: Clock, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { clock, attempts }
    }

    /// All saved attempts in save order; unreadable data counts as none.
    pub async fn load_all(&self) -> Vec<AttemptRecord> {
        match self.attempts.list_attempts().await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "attempt store unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    pub async fn find(&self, id: AttemptId) -> Option<AttemptRecord> {
        match self.attempts.get_attempt(id).await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, %id, "attempt lookup failed");
                None
            }
        }
    }

    /// Journal entries, newest first.
    pub async fn journal(&self) -> Vec<JournalEntry> {
        journal_entries(&self.load_all().await)
    }

    /// Persist `draft` under `name`, stamped with the clock's time.
    pub async fn save(&self, draft: AttemptDraft, name: &str) -> SaveStatus {
        let name = name.trim();
        if name.is_empty() {
            return SaveStatus::NameRequired;
        }
        let now = self.clock.now();
        let base = self.clock.now_millis();
        let record = draft.into_record(AttemptId::new(base), name, format_local(now));
        for offset in 0..ID_RETRIES {
            let candidate = AttemptRecord {
                id: AttemptId::new(base + offset),
                ..record.clone()
            };
            match self.attempts.append_attempt(&candidate).await {
                Ok(()) => {
                    info!(id = %candidate.id, score = %candidate.score_text, "attempt saved");
                    return SaveStatus::Saved(candidate.id);
                }
                Err(StorageError::Conflict) => continue,
                Err(err) => {
                    warn!(error = %err, "attempt not saved");
                    return SaveStatus::NotSaved;
                }
            }
        }
        warn!(id = base, "attempt not saved, id already taken");
        SaveStatus::NotSaved
    }

    /// Delete an attempt once `typed_name` equals the name shown for it.
    pub async fn remove_with_confirmation(&self, id: AttemptId, typed_name: &str) -> DeleteOutcome {
        let Some(record) = self.find(id).await else {
            return DeleteOutcome::NotFound;
        };
        let expected = display_name(&record);
        if typed_name.trim() != expected {
            return DeleteOutcome::NameMismatch {
                expected: expected.to_owned(),
            };
        }
        match self.attempts.remove_attempt(id).await {
            Ok(()) => {
                info!(%id, "attempt deleted");
                DeleteOutcome::Deleted
            }
            Err(StorageError::NotFound) => DeleteOutcome::NotFound,
            Err(err) => {
                warn!(error = %err, %id, "attempt not deleted");
                DeleteOutcome::Failed
            }
        }
    }
}
