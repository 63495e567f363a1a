//! Single-file JSON store that mirrors the browser key/value layout.
//!
//! The document holds the attempt list under `uebungAttempts` and the
//! preferred mode under `uebungMode`, so a file exported from the web page
//! can be read directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uebung_core::model::{AttemptId, AttemptRecord, Mode};

use crate::repository::{AttemptRepository, PreferenceRepository, Storage, StorageError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(rename = "uebungAttempts", default)]
    attempts: Vec<AttemptRecord>,
    #[serde(
        rename = "uebungMode",
        default,
        deserialize_with = "lenient_mode",
        skip_serializing_if = "Option::is_none"
    )]
    mode: Option<Mode>,
}

/// An unrecognised stored mode reads as no preference.
fn lenient_mode<'de, D>(deserializer: D) -> Result<Option<Mode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(|raw| raw.parse().ok()))
}

#[derive(Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Arc<Mutex<()>>,
}

impl JsonFileRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Document, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Document::default());
            }
            Err(err) => return Err(StorageError::Connection(err.to_string())),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn write(&self, doc: &Document) -> Result<(), StorageError> {
        let json =
            serde_json::to_vec_pretty(doc).map_err(|e| StorageError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        debug!(path = %self.path.display(), attempts = doc.attempts.len(), "wrote attempt store");
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for JsonFileRepository {
    async fn append_attempt(&self, record: &AttemptRecord) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        if doc.attempts.iter().any(|r| r.id == record.id) {
            return Err(StorageError::Conflict);
        }
        doc.attempts.push(record.clone());
        self.write(&doc).await
    }

    async fn list_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.attempts)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Option<AttemptRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.attempts.into_iter().find(|r| r.id == id))
    }

    async fn remove_attempt(&self, id: AttemptId) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        let before = doc.attempts.len();
        doc.attempts.retain(|r| r.id != id);
        if doc.attempts.len() == before {
            return Err(StorageError::NotFound);
        }
        self.write(&doc).await
    }
}

#[async_trait]
impl PreferenceRepository for JsonFileRepository {
    async fn preferred_mode(&self) -> Result<Option<Mode>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.mode)
    }

    async fn set_preferred_mode(&self, mode: Mode) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        doc.mode = Some(mode);
        self.write(&doc).await
    }
}

impl Storage {
    /// Build a `Storage` backed by one JSON file at `path`.
    ///
    /// The file is created on the first write.
    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        let repo = JsonFileRepository::new(path);
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo.clone());
        let preferences: Arc<dyn PreferenceRepository> = Arc::new(repo);
        Self {
            attempts,
            preferences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_uses_browser_keys() {
        let doc = Document {
            attempts: Vec::new(),
            mode: Some(Mode::Hard),
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"uebungAttempts":[],"uebungMode":"hard"}"#);
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert!(doc.attempts.is_empty());
        assert_eq!(doc.mode, None);
    }

    #[test]
    fn unknown_preference_keeps_attempts_readable() {
        let raw = r#"{"uebungAttempts":[{"id":5,"mode":"hard"}],"uebungMode":"medium"}"#;
        let doc: Document = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.attempts.len(), 1);
        assert_eq!(doc.mode, None);

        let doc: Document = serde_json::from_str(r#"{"uebungMode":42}"#).unwrap();
        assert_eq!(doc.mode, None);
        let doc: Document = serde_json::from_str(r#"{"uebungMode":"soft"}"#).unwrap();
        assert_eq!(doc.mode, Some(Mode::Soft));
    }
}
