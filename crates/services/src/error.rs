//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use uebung_core::DefinitionError;

/// Errors emitted while setting up an exercise.
///
/// Once an exercise is running nothing fails; storage problems degrade to
/// status values instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkflowError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
