//! Persistence gateway
//!
//! One JSON document per user. The gateway only moves documents; it never
//! interprets them. Validation and repair happen in the store on load.

use crate::error::PersistenceError;
use crate::types::UserId;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

/// Load and save whole store documents keyed by user
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Fetch the user's document; `None` when nothing was ever saved
    async fn load(&self, user: &UserId) -> Result<Option<Value>, PersistenceError>;

    /// Replace the user's document
    async fn save(&self, user: &UserId, document: &Value) -> Result<(), PersistenceError>;
}

/// In-process gateway backed by a concurrent map
///
/// Failures can be switched on to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    documents: DashMap<UserId, Value>,
    saves: AtomicUsize,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryGateway {
    /// Create empty gateway
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document
    #[must_use]
    pub fn with_document(self, user: impl Into<UserId>, document: Value) -> Self {
        self.documents.insert(user.into(), document);
        self
    }

    /// Stored document of a user
    #[must_use]
    pub fn document(&self, user: &UserId) -> Option<Value> {
        self.documents.get(user).map(|entry| entry.value().clone())
    }

    /// Successful saves so far
    #[inline]
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make subsequent loads fail
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent saves fail
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn load(&self, user: &UserId) -> Result<Option<Value>, PersistenceError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(PersistenceError::unavailable("memory gateway refusing loads"));
        }
        Ok(self.document(user))
    }

    async fn save(&self, user: &UserId, document: &Value) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::unavailable("memory gateway refusing saves"));
        }
        self.documents.insert(user.clone(), document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Gateway writing one `<user>.json` file per user under a directory
#[derive(Debug, Clone)]
pub struct FileGateway {
    root: PathBuf,
}

impl FileGateway {
    /// Create gateway rooted at `root`; the directory is created on first save
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the documents
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path of a user's document
    #[must_use]
    pub fn path_for(&self, user: &UserId) -> PathBuf {
        let stem: String = user
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{stem}.json"))
    }
}

#[async_trait]
impl PersistenceGateway for FileGateway {
    async fn load(&self, user: &UserId) -> Result<Option<Value>, PersistenceError> {
        let path = self.path_for(user);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(path, e)),
        };
        debug!(path = %path.display(), bytes = bytes.len(), "Loaded document");
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, user: &UserId, document: &Value) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PersistenceError::io(&self.root, e))?;

        let path = self.path_for(user);
        let staging = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(document)?;

        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(|e| PersistenceError::io(&staging, e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| PersistenceError::io(&path, e))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Saved document");
        Ok(())
    }
}
