#![forbid(unsafe_code)]
//! Persistence adapters for attempt records and the preferred exercise mode.

pub mod json_file;
pub mod repository;
pub mod sqlite;

pub use repository::{
    AttemptRepository, InMemoryRepository, PreferenceRepository, Storage, StorageError,
};
