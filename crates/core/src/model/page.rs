use crate::error::DefinitionError;
use crate::model::definition::{BlockDefinition, ExerciseDefinition, PartDefinition};
use crate::model::field::AnswerField;
use crate::model::ids::{ContainerId, FieldId};

/// Inline content of a sentence container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Field(FieldId),
    Break,
}

/// A sentence (list item) that encloses one or more answer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceContainer {
    id: ContainerId,
    content: Vec<Inline>,
    sentence: Option<String>,
}

impl SentenceContainer {
    #[must_use]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    #[must_use]
    pub fn content(&self) -> &[Inline] {
        &self.content
    }

    /// Authored sentence text that replaces reconstruction, if any.
    #[must_use]
    pub fn sentence_override(&self) -> Option<&str> {
        self.sentence.as_deref()
    }
}

/// An exercise page: its answer fields in document order plus their sentence containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    title: String,
    path: String,
    fields: Vec<AnswerField>,
    containers: Vec<SentenceContainer>,
}

impl Page {
    /// Build a page from its authored definition.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError` if the page has no answer fields or a choice is malformed.
    pub fn from_definition(def: &ExerciseDefinition) -> Result<Self, DefinitionError> {
        let mut page = Self {
            title: def.title.trim().to_owned(),
            path: def.path.clone(),
            fields: Vec::new(),
            containers: Vec::new(),
        };

        for block in &def.blocks {
            match block {
                BlockDefinition::Sentence { sentence, parts } => {
                    let id = ContainerId::new(page.containers.len());
                    let mut content = Vec::with_capacity(parts.len());
                    for part in parts {
                        let inline = match part {
                            PartDefinition::Text { text } => Inline::Text(text.clone()),
                            PartDefinition::Break => Inline::Break,
                            PartDefinition::Blank { answer, label } => Inline::Field(
                                page.push_text_field(answer, label.clone(), Some(id)),
                            ),
                            PartDefinition::Choice {
                                answer,
                                options,
                                label,
                            } => Inline::Field(page.push_choice_field(
                                answer,
                                options,
                                label.clone(),
                                Some(id),
                            )?),
                        };
                        content.push(inline);
                    }
                    page.containers.push(SentenceContainer {
                        id,
                        content,
                        sentence: sentence.clone(),
                    });
                }
                BlockDefinition::Blank { answer, label } => {
                    page.push_text_field(answer, label.clone(), None);
                }
                BlockDefinition::Choice {
                    answer,
                    options,
                    label,
                } => {
                    page.push_choice_field(answer, options, label.clone(), None)?;
                }
            }
        }

        if page.fields.is_empty() {
            return Err(DefinitionError::NoFields);
        }
        Ok(page)
    }

    fn push_text_field(
        &mut self,
        answer: &str,
        label: Option<String>,
        container: Option<ContainerId>,
    ) -> FieldId {
        let id = FieldId::new(self.fields.len());
        self.fields.push(
            AnswerField::free_text(id, answer)
                .with_label(label)
                .within(container),
        );
        id
    }

    fn push_choice_field(
        &mut self,
        answer: &str,
        options: &[String],
        label: Option<String>,
        container: Option<ContainerId>,
    ) -> Result<FieldId, DefinitionError> {
        let position = self.fields.len();
        if options.is_empty() {
            return Err(DefinitionError::EmptyOptions { position });
        }
        if !options.iter().any(|o| o == answer) {
            return Err(DefinitionError::AnswerNotOffered {
                position,
                answer: answer.to_owned(),
            });
        }
        let id = FieldId::new(position);
        self.fields.push(
            AnswerField::single_choice(id, answer, options.to_vec())
                .with_label(label)
                .within(container),
        );
        Ok(id)
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn fields(&self) -> &[AnswerField] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&AnswerField> {
        self.fields.get(id.index())
    }

    #[must_use]
    pub fn containers(&self) -> &[SentenceContainer] {
        &self.containers
    }

    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<&SentenceContainer> {
        self.containers.get(id.index())
    }

    /// Type into a text field. Returns `false` if the field is missing, locked, or a choice.
    pub fn set_text(&mut self, id: FieldId, text: impl Into<String>) -> bool {
        self.fields
            .get_mut(id.index())
            .is_some_and(|f| f.set_text(text))
    }

    /// Select an option of a choice field. Returns `false` if nothing changed.
    pub fn select(&mut self, id: FieldId, option: &str) -> bool {
        self.fields
            .get_mut(id.index())
            .is_some_and(|f| f.select(option))
    }

    /// Current values of every field, in document order.
    #[must_use]
    pub fn answers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.actual().to_owned()).collect()
    }

    /// Replay persisted answers positionally; fields beyond `answers` become empty.
    pub fn restore_answers(&mut self, answers: &[String]) {
        for (idx, field) in self.fields.iter_mut().enumerate() {
            field.restore(answers.get(idx).map_or("", String::as_str));
        }
    }

    pub fn lock_all(&mut self) {
        self.fields.iter_mut().for_each(AnswerField::lock);
    }

    pub fn unlock_all(&mut self) {
        self.fields.iter_mut().for_each(AnswerField::unlock);
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.fields.iter().all(AnswerField::is_locked)
    }
}
