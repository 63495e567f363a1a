use async_trait::async_trait;
use uebung_core::model::{AttemptId, AttemptRecord};

use super::SqliteRepository;
use super::mapping::{answers_to_json, attempt_id_to_i64, map_attempt_row};
use crate::repository::{AttemptRepository, StorageError};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(&self, record: &AttemptRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO attempts (id, name, datetime, score, mode, path, title, answers)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(attempt_id_to_i64(record.id)?)
        .bind(&record.name)
        .bind(&record.datetime)
        .bind(&record.score_text)
        .bind(record.mode.as_str())
        .bind(&record.path)
        .bind(&record.title)
        .bind(answers_to_json(&record.answers)?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Conflict
            } else {
                StorageError::Connection(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn list_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, datetime, score, mode, path, title, answers
            FROM attempts
            ORDER BY seq ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_attempt_row).collect()
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Option<AttemptRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, datetime, score, mode, path, title, answers
            FROM attempts
            WHERE id = ?1
            ",
        )
        .bind(attempt_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_attempt_row).transpose()
    }

    async fn remove_attempt(&self, id: AttemptId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM attempts WHERE id = ?1")
            .bind(attempt_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
