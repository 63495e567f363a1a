mod attempt;
pub mod definition;
mod field;
mod ids;
mod mode;
mod page;

pub use attempt::{AttemptDraft, AttemptRecord};
pub use definition::{BlockDefinition, ExerciseDefinition, PartDefinition};
pub use field::{AnswerField, FieldKind, FieldValue};
pub use ids::{AttemptId, ContainerId, FieldId, GroupId};
pub use mode::{Mode, ModeParseError};
pub use page::{Inline, Page, SentenceContainer};
