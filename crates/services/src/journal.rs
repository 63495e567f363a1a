use uebung_core::model::{AttemptId, AttemptRecord, Mode};
use uebung_core::request::replay_link;

pub const UNKNOWN_NAME: &str = "Unbekannt";
const MISSING: &str = "-";
const DEFAULT_TITLE: &str = "Uebung";

/// One journal line for a saved attempt, with display fallbacks applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub id: AttemptId,
    pub name: String,
    pub datetime: String,
    pub score: String,
    pub mode: Mode,
    pub title: String,
    pub path: String,
    /// Opens the attempt read-only; absent without an id or path.
    pub view_link: Option<String>,
    /// Starts the exercise again; absent without a path.
    pub retry_link: Option<String>,
}

/// Name shown for an attempt, also the name a learner must type to delete it.
#[must_use]
pub fn display_name(record: &AttemptRecord) -> &str {
    non_empty(&record.name).unwrap_or(UNKNOWN_NAME)
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}

impl JournalEntry {
    #[must_use]
    pub fn from_record(record: &AttemptRecord) -> Self {
        let path = non_empty(&record.path);
        let view_link = path
            .filter(|_| record.id.value() != 0)
            .map(|p| replay_link(p, record.id));
        Self {
            id: record.id,
            name: display_name(record).to_owned(),
            datetime: non_empty(&record.datetime).unwrap_or(MISSING).to_owned(),
            score: non_empty(&record.score_text).unwrap_or(MISSING).to_owned(),
            mode: record.mode,
            title: non_empty(&record.title).unwrap_or(DEFAULT_TITLE).to_owned(),
            path: path.unwrap_or(MISSING).to_owned(),
            view_link,
            retry_link: path.map(str::to_owned),
        }
    }
}

/// Journal entries, newest first.
#[must_use]
pub fn journal_entries(records: &[AttemptRecord]) -> Vec<JournalEntry> {
    records.iter().rev().map(JournalEntry::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, name: &str, path: &str) -> AttemptRecord {
        AttemptRecord {
            id: AttemptId::new(id),
            name: name.into(),
            datetime: String::new(),
            score_text: "3/4".into(),
            mode: Mode::Hard,
            path: path.into(),
            title: String::new(),
            answers: Vec::new(),
        }
    }

    #[test]
    fn newest_entries_come_first() {
        let records = vec![record(1, "A", "/a.html"), record(2, "B", "/b.html")];
        let entries = journal_entries(&records);
        assert_eq!(entries[0].name, "B");
        assert_eq!(entries[1].name, "A");
    }

    #[test]
    fn missing_values_use_placeholders() {
        let entry = JournalEntry::from_record(&record(5, "", ""));
        assert_eq!(entry.name, "Unbekannt");
        assert_eq!(entry.datetime, "-");
        assert_eq!(entry.path, "-");
        assert_eq!(entry.title, "Uebung");
        assert_eq!(entry.view_link, None);
        assert_eq!(entry.retry_link, None);
    }

    #[test]
    fn links_point_back_to_the_exercise() {
        let entry = JournalEntry::from_record(&record(42, "Mia", "/ubungen/perfekt.html"));
        assert_eq!(
            entry.view_link.as_deref(),
            Some("/ubungen/perfekt.html?attemptId=42&view=1")
        );
        assert_eq!(entry.retry_link.as_deref(), Some("/ubungen/perfekt.html"));
    }
}
