use async_trait::async_trait;
use sqlx::Row;
use uebung_core::model::Mode;

use super::SqliteRepository;
use super::mapping::{parse_mode, ser};
use crate::repository::{PreferenceRepository, StorageError};

const MODE_KEY: &str = "uebungMode";

#[async_trait]
impl PreferenceRepository for SqliteRepository {
    async fn preferred_mode(&self) -> Result<Option<Mode>, StorageError> {
        let row = sqlx::query("SELECT value FROM preferences WHERE key = ?1")
            .bind(MODE_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row.try_get("value").map_err(ser)?;
        parse_mode(&value).map(Some)
    }

    async fn set_preferred_mode(&self, mode: Mode) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO preferences (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(MODE_KEY)
        .bind(mode.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
