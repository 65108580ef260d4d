use crate::CacheError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::trace;

/// The validators of the last feed version that was acted upon.
///
/// Both fields are `None` before the first detected update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl CacheRecord {
    pub fn new(etag: Option<String>, last_modified: Option<String>) -> Self {
        Self {
            etag,
            last_modified,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// Single-slot storage for a [`CacheRecord`].
#[async_trait]
pub trait ValidatorStore: Send + Sync {
    /// Load the stored record; an absent record loads as [`CacheRecord::default`].
    async fn load(&self) -> Result<CacheRecord, CacheError>;

    /// Replace the stored record.
    async fn save(&self, record: &CacheRecord) -> Result<(), CacheError>;

    /// Forget the stored record.
    async fn clear(&self) -> Result<(), CacheError>;
}

/// A [`ValidatorStore`] backed by a `bincode` file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ValidatorStore for FileStore {
    async fn load(&self) -> Result<CacheRecord, CacheError> {
        trace!("reading validator file: {}", self.path.display());
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                trace!("no validator file; starting from an empty record");
                return Ok(CacheRecord::default());
            }
            Err(err) => return Err(err.into()),
        };
        let record: CacheRecord = bincode::deserialize(&bytes)?;
        trace!("validator file read: {record:?}");
        Ok(record)
    }

    async fn save(&self, record: &CacheRecord) -> Result<(), CacheError> {
        let bytes = bincode::serialize(record)?;
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        // stage then rename; an interrupted save keeps the previous record
        let staging = self.path.with_extension("tmp");
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        trace!("validator file written: {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// An in-memory [`ValidatorStore`]; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<CacheRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: CacheRecord) -> Self {
        Self {
            slot: Mutex::new(Some(record)),
        }
    }

    /// The record as last saved, if any.
    pub async fn snapshot(&self) -> Option<CacheRecord> {
        self.slot.lock().await.clone()
    }
}

#[async_trait]
impl ValidatorStore for MemoryStore {
    async fn load(&self) -> Result<CacheRecord, CacheError> {
        Ok(self.slot.lock().await.clone().unwrap_or_default())
    }

    async fn save(&self, record: &CacheRecord) -> Result<(), CacheError> {
        *self.slot.lock().await = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
