use crate::model::ids::{ContainerId, FieldId};

/// How the learner supplies a value for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    FreeText,
    SingleChoice,
}

/// Current learner input, tagged by the kind of control that produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    FreeText(String),
    SingleChoice {
        options: Vec<String>,
        selected: Option<String>,
    },
}

/// One atomic answer slot on an exercise page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerField {
    id: FieldId,
    container: Option<ContainerId>,
    expected: String,
    label: Option<String>,
    value: FieldValue,
    locked: bool,
}

impl AnswerField {
    #[must_use]
    pub fn free_text(id: FieldId, expected: impl Into<String>) -> Self {
        Self {
            id,
            container: None,
            expected: expected.into(),
            label: None,
            value: FieldValue::FreeText(String::new()),
            locked: false,
        }
    }

    #[must_use]
    pub fn single_choice(id: FieldId, expected: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            id,
            container: None,
            expected: expected.into(),
            label: None,
            value: FieldValue::SingleChoice {
                options,
                selected: None,
            },
            locked: false,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    #[must_use]
    pub(crate) fn within(mut self, container: Option<ContainerId>) -> Self {
        self.container = container;
        self
    }

    #[must_use]
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Nearest enclosing sentence container, if any.
    #[must_use]
    pub fn container(&self) -> Option<ContainerId> {
        self.container
    }

    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self.value {
            FieldValue::FreeText(_) => FieldKind::FreeText,
            FieldValue::SingleChoice { .. } => FieldKind::SingleChoice,
        }
    }

    #[must_use]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Current answer; empty when nothing was typed or selected.
    #[must_use]
    pub fn actual(&self) -> &str {
        match &self.value {
            FieldValue::FreeText(text) => text,
            FieldValue::SingleChoice { selected, .. } => selected.as_deref().unwrap_or(""),
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Text is complete once it holds a non-blank value; a choice once a non-empty option is selected.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match &self.value {
            FieldValue::FreeText(text) => !text.trim().is_empty(),
            FieldValue::SingleChoice { selected, .. } => {
                selected.as_deref().is_some_and(|s| !s.is_empty())
            }
        }
    }

    /// Replace the typed text. Returns `false` when locked or not a text field.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        if self.locked {
            return false;
        }
        match &mut self.value {
            FieldValue::FreeText(current) => {
                *current = text.into();
                true
            }
            FieldValue::SingleChoice { .. } => false,
        }
    }

    /// Select one of the offered options. Returns `false` when locked, unknown, or not a choice.
    pub fn select(&mut self, option: &str) -> bool {
        if self.locked {
            return false;
        }
        match &mut self.value {
            FieldValue::SingleChoice { options, selected } => {
                if options.iter().any(|o| o == option) {
                    *selected = Some(option.to_owned());
                    true
                } else {
                    false
                }
            }
            FieldValue::FreeText(_) => false,
        }
    }

    /// Write a persisted value back, bypassing the lock.
    ///
    /// A choice value that matches none of the options leaves nothing selected.
    pub(crate) fn restore(&mut self, value: &str) {
        match &mut self.value {
            FieldValue::FreeText(current) => value.clone_into(current),
            FieldValue::SingleChoice { options, selected } => {
                *selected = options.iter().find(|o| *o == value).cloned();
            }
        }
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    pub(crate) fn unlock(&mut self) {
        self.locked = false;
    }
}
