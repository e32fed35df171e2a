use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::record::{record_schema, update_concept, KnowledgeRecord};
use crate::protocol::{McpErrorCode, McpErrorResponse};
use crate::schema::{SchemaValidationError, SchemaValidator};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Stored knowledge record is corrupt: {0}")]
    CorruptState(String),
    #[error("Knowledge record is invalid: {0}")]
    InvalidRecord(String),
    #[error("Failed to persist knowledge record: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for McpErrorResponse {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::CorruptState(_) => McpErrorCode::CorruptState,
            StoreError::InvalidRecord(_) => McpErrorCode::InvalidRecord,
            StoreError::Io(_) => McpErrorCode::IoError,
        };
        McpErrorResponse::new(code, err.to_string())
    }
}

/// Sole owner of the JSON file backing the knowledge record.
///
/// Reads go straight to disk. Writers (`save`, `record_concept`) are
/// serialized through `write_lock`, and every write lands via a sibling
/// temp file renamed over the target, so readers never see a partial file.
#[derive(Debug)]
pub struct KnowledgeStore {
    path: PathBuf,
    schema: SchemaValidator,
    write_lock: Mutex<()>,
}

impl KnowledgeStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SchemaValidationError> {
        Ok(Self {
            path: path.into(),
            schema: SchemaValidator::compile(record_schema())?,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, parse, and validate the record.
    pub async fn load(&self) -> Result<KnowledgeRecord, StoreError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            error!(path = %self.path.display(), "Cannot read memory file: {e}");
            StoreError::CorruptState(format!("cannot read {}: {e}", self.path.display()))
        })?;

        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            error!(path = %self.path.display(), "Memory file is not valid JSON: {e}");
            StoreError::CorruptState(format!("invalid JSON: {e}"))
        })?;

        self.schema.check(&value).map_err(|e| {
            error!(path = %self.path.display(), "Memory file failed schema validation: {e}");
            StoreError::CorruptState(e.to_string())
        })?;

        serde_json::from_value(value).map_err(|e| StoreError::CorruptState(e.to_string()))
    }

    /// Validate and persist `record`, replacing the previous content.
    ///
    /// A record that fails validation is rejected before the file is touched.
    pub async fn save(&self, record: &KnowledgeRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.persist(record).await
    }

    /// Load, merge one concept flag, and save as a single critical section.
    pub async fn record_concept(
        &self,
        concept: &str,
        known: bool,
    ) -> Result<KnowledgeRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let current = self.load().await?;
        let updated = update_concept(&current, concept, known);
        self.persist(&updated).await?;
        debug!(concept, known, "Recorded concept");
        Ok(updated)
    }

    // Caller must hold `write_lock`.
    async fn persist(&self, record: &KnowledgeRecord) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(record).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
        self.schema.check(&value).map_err(|e| {
            error!("Refusing to save invalid knowledge record: {e}");
            StoreError::InvalidRecord(e.to_string())
        })?;

        let text = serde_json::to_string_pretty(record)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        let tmp = self.temp_path();
        if let Err(e) = tokio::fs::write(&tmp, text).await {
            error!(path = %tmp.display(), "Cannot write temp memory file: {e}");
            discard_temp(&tmp).await;
            return Err(e.into());
        }

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            error!(path = %self.path.display(), "Cannot replace memory file: {e}");
            discard_temp(&tmp).await;
            return Err(e.into());
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

// Best effort: the file may not exist if the write failed before creating it.
async fn discard_temp(tmp: &Path) {
    match tokio::fs::remove_file(tmp).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %tmp.display(), "Cannot remove temp memory file: {e}"),
    }
}
