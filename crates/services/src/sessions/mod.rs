mod controller;
mod workflow;

// Public API of the session subsystem.
pub use controller::{CheckOutcome, Controls, ForwardAction, NextLabel, SessionController};
pub use workflow::{ExerciseWorkflow, Opened};
