use serde::{Deserialize, Deserializer, Serialize};

use crate::grouping::Score;
use crate::model::ids::AttemptId;
use crate::model::mode::Mode;

/// A persisted attempt, in the exact key order and naming of the stored JSON.
///
/// `answers[i]` belongs to the i-th answer field of the page in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: AttemptId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub datetime: String,
    #[serde(rename = "score", default)]
    pub score_text: String,
    #[serde(default, deserialize_with = "lenient_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub answers: Vec<String>,
}

/// Anything but `"hard"` replays as soft, including missing or malformed values.
fn lenient_mode<'de, D>(deserializer: D) -> Result<Mode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(if value.as_str() == Some("hard") {
        Mode::Hard
    } else {
        Mode::Soft
    })
}

/// Outcome of a completed check, waiting for the learner's name before it becomes a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptDraft {
    pub score: Score,
    pub mode: Mode,
    pub path: String,
    pub title: String,
    pub answers: Vec<String>,
}

impl AttemptDraft {
    #[must_use]
    pub fn score_text(&self) -> String {
        self.score.to_string()
    }

    #[must_use]
    pub fn into_record(
        self,
        id: AttemptId,
        name: impl Into<String>,
        datetime: impl Into<String>,
    ) -> AttemptRecord {
        AttemptRecord {
            id,
            name: name.into(),
            datetime: datetime.into(),
            score_text: self.score.to_string(),
            mode: self.mode,
            path: self.path,
            title: self.title,
            answers: self.answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AttemptRecord {
        AttemptDraft {
            score: Score {
                correct: 1,
                total: 2,
            },
            mode: Mode::Hard,
            path: "/ubungen/perfekt.html".into(),
            title: "Perfekt".into(),
            answers: vec!["ging".into(), "gegangen".into()],
        }
        .into_record(AttemptId::new(1_700_000_000_000), "Mia", "14.11.2023, 23:13:20")
    }

    #[test]
    fn serializes_with_stored_key_order() {
        let json = serde_json::to_string(&record()).unwrap();
        assert_eq!(
            json,
            r#"{"id":1700000000000,"name":"Mia","datetime":"14.11.2023, 23:13:20","score":"1/2","mode":"hard","path":"/ubungen/perfekt.html","title":"Perfekt","answers":["ging","gegangen"]}"#
        );
        let back: AttemptRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record());
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let back: AttemptRecord = serde_json::from_str(r#"{"id":5}"#).unwrap();
        assert_eq!(back.id, AttemptId::new(5));
        assert_eq!(back.mode, Mode::Soft);
        assert!(back.answers.is_empty());
        assert!(back.name.is_empty());
    }

    #[test]
    fn unknown_modes_replay_as_soft() {
        let back: AttemptRecord = serde_json::from_str(r#"{"id":5,"mode":"medium"}"#).unwrap();
        assert_eq!(back.mode, Mode::Soft);
        let back: AttemptRecord = serde_json::from_str(r#"{"id":5,"mode":null}"#).unwrap();
        assert_eq!(back.mode, Mode::Soft);
    }
}
