#![forbid(unsafe_code)]

pub mod attempt_service;
pub mod error;
pub mod exercise_services;
pub mod journal;
pub mod report;
pub mod sessions;

pub use uebung_core::Clock;

pub use attempt_service::{AttemptService, DeleteOutcome, SaveStatus};
pub use error::WorkflowError;
pub use exercise_services::ExerciseServices;
pub use journal::{JournalEntry, journal_entries};
pub use report::results_text;
pub use sessions::{
    CheckOutcome, Controls, ExerciseWorkflow, ForwardAction, NextLabel, Opened, SessionController,
};
