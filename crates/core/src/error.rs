use thiserror::Error;

/// Errors raised while turning an authored exercise into a page.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DefinitionError {
    #[error("exercise has no answer fields")]
    NoFields,
    #[error("choice field {position} offers no options")]
    EmptyOptions { position: usize },
    #[error("choice field {position} does not offer its answer {answer:?}")]
    AnswerNotOffered { position: usize, answer: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
