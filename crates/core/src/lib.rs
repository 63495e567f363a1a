#![forbid(unsafe_code)]
//! Domain core of the exercise self-check engine: answer matching, page model,
//! grouping and scoring, progress derivation and input helpers.

pub mod error;
pub mod grouping;
pub mod input;
pub mod matching;
pub mod model;
pub mod progress;
pub mod request;
pub mod time;

pub use error::DefinitionError;
pub use grouping::{Evaluation, FieldOutcome, Group, GroupOutcome, Score, evaluate, group_fields, score};
pub use matching::{MatchPolicy, matches, normalize};
pub use progress::{ItemStatus, ProgressTracker, Segment};
pub use request::PageRequest;
pub use time::Clock;
