//! Authoring format for exercise pages.
//!
//! An exercise is a JSON document with a title, the page path it is served
//! under, and an ordered list of blocks. A block is either a sentence made of
//! text, blanks, choices and line breaks, or a standalone answer field.
//!
//! ```json
//! {
//!   "title": "Perfekt mit sein",
//!   "path": "/ubungen/perfekt.html",
//!   "blocks": [
//!     { "type": "sentence", "parts": [
//!       { "type": "text", "text": "Ich bin nach Hause " },
//!       { "type": "blank", "answer": "gegangen" },
//!       { "type": "text", "text": ". (gehen)" }
//!     ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub title: String,
    #[serde(default)]
    pub path: String,
    pub blocks: Vec<BlockDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockDefinition {
    Sentence {
        /// Overrides the reconstructed sentence text in results.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sentence: Option<String>,
        parts: Vec<PartDefinition>,
    },
    Blank {
        answer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Choice {
        answer: String,
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartDefinition {
    Text {
        text: String,
    },
    Break,
    Blank {
        answer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Choice {
        answer: String,
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl ExerciseDefinition {
    /// Parse an exercise document.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::Json` when the document is not valid JSON for this schema.
    pub fn from_json(raw: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl BlockDefinition {
    #[must_use]
    pub fn sentence(parts: Vec<PartDefinition>) -> Self {
        Self::Sentence {
            sentence: None,
            parts,
        }
    }

    #[must_use]
    pub fn blank(answer: impl Into<String>) -> Self {
        Self::Blank {
            answer: answer.into(),
            label: None,
        }
    }
}

impl PartDefinition {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    pub fn blank(answer: impl Into<String>) -> Self {
        Self::Blank {
            answer: answer.into(),
            label: None,
        }
    }

    #[must_use]
    pub fn choice(answer: impl Into<String>, options: &[&str]) -> Self {
        Self::Choice {
            answer: answer.into(),
            options: options.iter().map(|&o| o.to_owned()).collect(),
            label: None,
        }
    }
}
