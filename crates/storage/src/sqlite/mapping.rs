use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uebung_core::model::{AttemptId, AttemptRecord, Mode};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn attempt_id_to_i64(id: AttemptId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("attempt id overflow".into()))
}

pub(crate) fn attempt_id_from_i64(v: i64) -> Result<AttemptId, StorageError> {
    u64::try_from(v)
        .map(AttemptId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid attempt id: {v}")))
}

pub(crate) fn parse_mode(s: &str) -> Result<Mode, StorageError> {
    s.parse::<Mode>().map_err(ser)
}

pub(crate) fn answers_to_json(answers: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

pub(crate) fn map_attempt_row(row: &SqliteRow) -> Result<AttemptRecord, StorageError> {
    let id = attempt_id_from_i64(row.try_get("id").map_err(ser)?)?;
    let mode_str: String = row.try_get("mode").map_err(ser)?;
    let answers_json: String = row.try_get("answers").map_err(ser)?;
    let answers: Vec<String> = serde_json::from_str(&answers_json).map_err(ser)?;

    Ok(AttemptRecord {
        id,
        name: row.try_get("name").map_err(ser)?,
        datetime: row.try_get("datetime").map_err(ser)?,
        score_text: row.try_get("score").map_err(ser)?,
        mode: parse_mode(&mode_str)?,
        path: row.try_get("path").map_err(ser)?,
        title: row.try_get("title").map_err(ser)?,
        answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_ids_reject_negative_values() {
        assert!(attempt_id_from_i64(-1).is_err());
        assert_eq!(attempt_id_from_i64(42).unwrap(), AttemptId::new(42));
        assert!(attempt_id_to_i64(AttemptId::new(u64::MAX)).is_err());
    }

    #[test]
    fn parses_stored_modes() {
        assert_eq!(parse_mode("hard").unwrap(), Mode::Hard);
        assert!(matches!(parse_mode("x"), Err(StorageError::Serialization(_))));
    }
}
