use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::Storage;
use uebung_core::model::{ExerciseDefinition, Page};

use crate::Clock;
use crate::attempt_service::AttemptService;
use crate::error::WorkflowError;
use crate::sessions::ExerciseWorkflow;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct ExerciseServices {
    clock: Clock,
    storage: Storage,
    attempts: Arc<AttemptService>,
}

impl ExerciseServices {
    #[must_use]
    pub fn new(clock: Clock, storage: Storage) -> Self {
        let attempts = Arc::new(AttemptService::new(clock, Arc::clone(&storage.attempts)));
        Self {
            clock,
            storage,
            attempts,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Sqlite` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, WorkflowError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(clock, storage))
    }

    /// Build services backed by a JSON file in the browser's storage layout.
    #[must_use]
    pub fn new_json_file(path: impl Into<PathBuf>, clock: Clock) -> Self {
        Self::new(clock, Storage::json_file(path))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Storage::in_memory())
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn attempts(&self) -> Arc<AttemptService> {
        Arc::clone(&self.attempts)
    }

    /// Prepare a workflow for one exercise page.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Definition` if the exercise has no fields or an invalid choice.
    pub fn workflow(&self, definition: &ExerciseDefinition) -> Result<ExerciseWorkflow, WorkflowError> {
        let page = Page::from_definition(definition)?;
        Ok(ExerciseWorkflow::new(
            page,
            (*self.attempts).clone(),
            Arc::clone(&self.storage.preferences),
        ))
    }

    /// Like [`workflow`](Self::workflow), reading the exercise from JSON.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Definition` if the JSON or the exercise is invalid.
    pub fn workflow_from_json(&self, raw: &str) -> Result<ExerciseWorkflow, WorkflowError> {
        let definition = ExerciseDefinition::from_json(raw)?;
        self.workflow(&definition)
    }
}
