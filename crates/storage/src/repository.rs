use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uebung_core::model::{AttemptId, AttemptRecord, Mode};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for saved attempts.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append a record after all existing ones.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken, or other storage errors.
    async fn append_attempt(&self, record: &AttemptRecord) -> Result<(), StorageError>;

    /// All records in the order they were appended.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing data cannot be read or decoded.
    async fn list_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError>;

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing data cannot be read or decoded.
    async fn get_attempt(&self, id: AttemptId) -> Result<Option<AttemptRecord>, StorageError>;

    /// Delete a record by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no record has this id, or other storage errors.
    async fn remove_attempt(&self, id: AttemptId) -> Result<(), StorageError>;
}

/// Repository contract for the last mode the learner picked.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the preference cannot be read.
    async fn preferred_mode(&self) -> Result<Option<Mode>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the preference cannot be stored.
    async fn set_preferred_mode(&self, mode: Mode) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    attempts: Arc<Mutex<Vec<AttemptRecord>>>,
    preferred: Arc<Mutex<Option<Mode>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, record: &AttemptRecord) -> Result<(), StorageError> {
        let mut guard = self.attempts.lock().map_err(poisoned)?;
        if guard.iter().any(|r| r.id == record.id) {
            return Err(StorageError::Conflict);
        }
        guard.push(record.clone());
        Ok(())
    }

    async fn list_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Option<AttemptRecord>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        Ok(guard.iter().find(|r| r.id == id).cloned())
    }

    async fn remove_attempt(&self, id: AttemptId) -> Result<(), StorageError> {
        let mut guard = self.attempts.lock().map_err(poisoned)?;
        let before = guard.len();
        guard.retain(|r| r.id != id);
        if guard.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryRepository {
    async fn preferred_mode(&self) -> Result<Option<Mode>, StorageError> {
        let guard = self.preferred.lock().map_err(poisoned)?;
        Ok(*guard)
    }

    async fn set_preferred_mode(&self, mode: Mode) -> Result<(), StorageError> {
        let mut guard = self.preferred.lock().map_err(poisoned)?;
        *guard = Some(mode);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn AttemptRepository>,
    pub preferences: Arc<dyn PreferenceRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo.clone());
        let preferences: Arc<dyn PreferenceRepository> = Arc::new(repo);
        Self {
            attempts,
            preferences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> AttemptRecord {
        AttemptRecord {
            id: AttemptId::new(id),
            name: "Mia".into(),
            datetime: "14.11.2023, 23:13:20".into(),
            score_text: "1/2".into(),
            mode: Mode::Hard,
            path: "/ubungen/perfekt.html".into(),
            title: "Perfekt".into(),
            answers: vec!["ging".into(), "gegangen".into()],
        }
    }

    #[tokio::test]
    async fn append_list_remove_round_trip() {
        let repo = InMemoryRepository::new();
        repo.append_attempt(&record(1)).await.unwrap();
        repo.append_attempt(&record(2)).await.unwrap();

        let all = repo.list_attempts().await.unwrap();
        assert_eq!(all.iter().map(|r| r.id.value()).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(repo.get_attempt(AttemptId::new(2)).await.unwrap(), Some(record(2)));

        repo.remove_attempt(AttemptId::new(1)).await.unwrap();
        assert_eq!(repo.list_attempts().await.unwrap(), vec![record(2)]);
        assert!(matches!(
            repo.remove_attempt(AttemptId::new(1)).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_id_conflicts() {
        let repo = InMemoryRepository::new();
        repo.append_attempt(&record(1)).await.unwrap();
        assert!(matches!(
            repo.append_attempt(&record(1)).await,
            Err(StorageError::Conflict)
        ));
    }

    #[tokio::test]
    async fn preference_defaults_to_none() {
        let storage = Storage::in_memory();
        assert_eq!(storage.preferences.preferred_mode().await.unwrap(), None);
        storage
            .preferences
            .set_preferred_mode(Mode::Hard)
            .await
            .unwrap();
        assert_eq!(
            storage.preferences.preferred_mode().await.unwrap(),
            Some(Mode::Hard)
        );
    }
}
