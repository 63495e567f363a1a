//! Partitioning answer fields into scored groups.
//!
//! Fields that share a sentence container form one group; a field outside any
//! container is a group on its own. A group counts as correct only when every
//! one of its fields matches.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::matching::{MatchPolicy, matches};
use crate::model::{ContainerId, FieldId, FieldKind, GroupId, Inline, Page, SentenceContainer};

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*").expect("parenthetical pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey {
    Container(ContainerId),
    Field(FieldId),
}

/// Answer fields scored together as one sentence or question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    label: String,
    source_text: String,
    fields: Vec<FieldId>,
}

impl Group {
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The sentence with blanks filled by the reference answers and annotations removed.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldId] {
        &self.fields
    }

    /// Every member field has a value.
    #[must_use]
    pub fn is_complete(&self, page: &Page) -> bool {
        self.fields
            .iter()
            .all(|id| page.field(*id).is_some_and(|f| f.is_complete()))
    }

    /// Every member field matches its reference under `policy`.
    #[must_use]
    pub fn is_correct(&self, page: &Page, policy: MatchPolicy) -> bool {
        !self.fields.is_empty()
            && self.fields.iter().all(|id| {
                page.field(*id)
                    .is_some_and(|f| matches(f.expected(), f.actual(), policy))
            })
    }

    /// Field to focus when the group is shown: the first empty text field, else the first text field.
    #[must_use]
    pub fn focus_target(&self, page: &Page) -> Option<FieldId> {
        let text_fields: Vec<_> = self
            .fields
            .iter()
            .filter_map(|id| page.field(*id))
            .filter(|f| f.kind() == FieldKind::FreeText)
            .collect();
        text_fields
            .iter()
            .find(|f| f.actual().trim().is_empty())
            .or_else(|| text_fields.first())
            .map(|f| f.id())
    }
}

/// Group the page's fields by their nearest sentence container, in encounter order.
///
/// Labels are `Item 1`, `Item 2`, ... and are stable for an unmodified page.
#[must_use]
pub fn group_fields(page: &Page) -> Vec<Group> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for field in page.fields() {
        let key = field
            .container()
            .map_or(GroupKey::Field(field.id()), GroupKey::Container);
        let slot = *index.entry(key).or_insert_with(|| {
            let id = GroupId::new(groups.len());
            let source_text = match key {
                GroupKey::Container(cid) => page.container(cid).map(|c| source_text(page, c)),
                GroupKey::Field(_) => None,
            };
            groups.push(Group {
                id,
                label: format!("Item {}", id.index() + 1),
                source_text: source_text.unwrap_or_default(),
                fields: Vec::new(),
            });
            id.index()
        });
        groups[slot].fields.push(field.id());
    }

    groups
}

/// Rebuild the sentence text of a container with every blank resolved to its reference answer.
#[must_use]
pub fn source_text(page: &Page, container: &SentenceContainer) -> String {
    if let Some(sentence) = container.sentence_override() {
        return sentence.to_owned();
    }
    let mut raw = String::new();
    for inline in container.content() {
        match inline {
            Inline::Text(text) => raw.push_str(text),
            Inline::Field(id) => {
                if let Some(field) = page.field(*id) {
                    raw.push_str(field.expected());
                }
            }
            Inline::Break => raw.push(' '),
        }
    }
    let stripped = PARENTHETICAL.replace_all(&raw, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of correct groups out of all groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    /// Accuracy rounded to the nearest whole percent; 0 when there are no groups.
    #[must_use]
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (200 * self.correct + self.total) / (2 * self.total)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.correct, self.total)
    }
}

#[must_use]
pub fn score(page: &Page, groups: &[Group], policy: MatchPolicy) -> Score {
    Score {
        correct: groups
            .iter()
            .filter(|g| g.is_correct(page, policy))
            .count(),
        total: groups.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    pub field: FieldId,
    pub label: String,
    pub expected: String,
    pub actual: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOutcome {
    pub group: GroupId,
    pub label: String,
    pub source_text: String,
    pub correct: bool,
    pub fields: Vec<FieldOutcome>,
}

/// Per-field and per-group results of one checking pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub policy: MatchPolicy,
    pub groups: Vec<GroupOutcome>,
    pub score: Score,
}

impl Evaluation {
    #[must_use]
    pub fn outcome(&self, group: GroupId) -> Option<&GroupOutcome> {
        self.groups.iter().find(|g| g.group == group)
    }
}

/// Score every field of every group; the aggregate agrees with [`score`].
#[must_use]
pub fn evaluate(page: &Page, groups: &[Group], policy: MatchPolicy) -> Evaluation {
    let outcomes: Vec<GroupOutcome> = groups
        .iter()
        .map(|group| {
            let fields: Vec<FieldOutcome> = group
                .fields
                .iter()
                .enumerate()
                .filter_map(|(idx, id)| {
                    let field = page.field(*id)?;
                    Some(FieldOutcome {
                        field: *id,
                        label: field
                            .label()
                            .map_or_else(|| format!("Teil {}", idx + 1), str::to_owned),
                        expected: field.expected().to_owned(),
                        actual: field.actual().to_owned(),
                        correct: matches(field.expected(), field.actual(), policy),
                    })
                })
                .collect();
            GroupOutcome {
                group: group.id,
                label: group.label.clone(),
                source_text: group.source_text.clone(),
                correct: !fields.is_empty() && fields.iter().all(|f| f.correct),
                fields,
            }
        })
        .collect();

    let correct = outcomes.iter().filter(|g| g.correct).count();
    Evaluation {
        policy,
        score: Score {
            correct,
            total: outcomes.len(),
        },
        groups: outcomes,
    }
}
