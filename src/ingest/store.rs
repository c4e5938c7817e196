// src/ingest/store.rs
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::ingest::types::CurrencyRecord;

/// One persisted observation of a resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    /// Unix seconds, fractional.
    pub utc_time: f64,
    /// Local offset in seconds *west* of UTC (UTC+2 -> -7200).
    pub utc_offset: i32,
    pub resource_name: String,
    pub currencies: CurrencyRecord,
}

impl StoredRecord {
    /// Stamp `currencies` with the current wall clock and local offset.
    pub fn now(resource_name: &str, currencies: CurrencyRecord) -> Self {
        let now = Utc::now();
        let utc_time = now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1e6;
        let utc_offset = -Local::now().offset().local_minus_utc();
        Self {
            utc_time,
            utc_offset,
            resource_name: resource_name.to_string(),
            currencies,
        }
    }
}

#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist one record; `false` when it was not stored.
    async fn insert(&self, record: &StoredRecord) -> bool;
}

/// Appends one JSON document per line.
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub const DEFAULT_PATH: &'static str = "data/currencies.jsonl";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, record: &StoredRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for JsonlStore {
    async fn insert(&self, record: &StoredRecord) -> bool {
        match self.append(record).await {
            Ok(()) => {
                tracing::info!(
                    path = %self.path.display(),
                    resource = %record.resource_name,
                    "record stored"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    resource = %record.resource_name,
                    error = ?e,
                    "record was not stored"
                );
                false
            }
        }
    }
}

/// Keeps records in memory; used for dry runs and tests.
pub struct MemoryStore {
    pub records: Mutex<Vec<StoredRecord>>,
    accept: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(vec![]),
            accept: true,
        }
    }

    /// A store whose every insert fails.
    pub fn rejecting() -> Self {
        Self {
            records: Mutex::new(vec![]),
            accept: false,
        }
    }

    pub fn snapshot(&self) -> Vec<StoredRecord> {
        self.records
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &StoredRecord) -> bool {
        if !self.accept {
            return false;
        }
        match self.records.lock() {
            Ok(mut v) => {
                v.push(record.clone());
                true
            }
            Err(_) => false,
        }
    }
}
