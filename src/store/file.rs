//! Fallback store for bookings.
//!
//! Bookings live in a single JSON file holding an array of records:
//! ```text
//! [
//!   { "id": "1767607200000", "customer": "A", "status": "Pending Confirmation", ... }
//! ]
//! ```
//!
//! The whole file is read on every operation and rewritten on every mutation.
//! Read-modify-write cycles are serialized by an in-process mutex; nothing
//! guards against a second process writing the same file.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use super::{Collection, RecordStore, StoreError};
use crate::models::{Fields, Record};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Held across each read-modify-write cycle.
    write_lock: Mutex<()>,
    /// Last identifier handed out, in milliseconds since the epoch.
    last_id: AtomicU64,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            last_id: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file as an empty array if it does not exist yet.
    pub async fn init(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        if !tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(e))?
        {
            self.save(&[]).await?;
            tracing::info!("Created bookings file {}", self.path.display());
        }

        Ok(())
    }

    /// Time-derived identifier, strictly increasing within this process.
    fn next_id(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut last = self.last_id.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last_id
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next.to_string(),
                Err(current) => last = current,
            }
        }
    }

    /// Reads the raw entries. A missing, unreadable or unparseable file reads
    /// as empty, as does any top-level value other than an array.
    async fn load(&self) -> Vec<Value> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                }
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!("{} does not hold an array", self.path.display());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Rewrites the whole file via a temp file and rename.
    async fn save(&self, entries: &[Value]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        let temp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&temp_path, bytes)
            .await
            .map_err(|e| StoreError::Io {
                path: temp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn check(collection: Collection, operation: &'static str) -> Result<(), StoreError> {
        if collection == Collection::Bookings {
            Ok(())
        } else {
            Err(StoreError::Unsupported {
                collection,
                operation,
            })
        }
    }
}

/// Identifier of a stored entry. Numeric ids written by older versions are
/// read back as their decimal text.
fn entry_id(entry: &Value) -> Option<String> {
    match entry.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn to_record(entry: &Value) -> Option<Record> {
    let id = entry_id(entry)?;
    let fields = entry.as_object()?.clone();
    Some(Record::new(id, fields))
}

#[async_trait]
impl RecordStore for FileStore {
    /// Entries that are not objects with an id are skipped, but stay in the file.
    async fn list_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        Self::check(collection, "list")?;

        let entries = self.load().await;
        let records: Vec<Record> = entries.iter().filter_map(to_record).collect();
        if records.len() < entries.len() {
            tracing::warn!(
                "Skipped {} malformed entries in {}",
                entries.len() - records.len(),
                self.path.display()
            );
        }
        Ok(records)
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<Record, StoreError> {
        Self::check(collection, "create")?;

        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await;
        let record = Record::new(self.next_id(), fields);
        entries.push(serde_json::to_value(&record)?);
        self.save(&entries).await?;

        Ok(record)
    }

    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<Option<Record>, StoreError> {
        Self::check(collection, "patch")?;

        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await;
        let Some(entry) = entries
            .iter_mut()
            .find(|entry| entry_id(entry).as_deref() == Some(id))
        else {
            return Ok(None);
        };

        if let Some(stored) = entry.as_object_mut() {
            for (key, value) in fields {
                if key != "id" {
                    stored.insert(key, value);
                }
            }
        }
        let updated = to_record(&*entry);
        self.save(&entries).await?;

        Ok(updated)
    }
}
