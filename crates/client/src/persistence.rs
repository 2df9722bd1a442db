//! Where the signed-in identity survives between runs.
//!
//! Values are opaque strings; parsing is the session's job so corrupt data
//! can be detected and cleared there.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::ClientError;

#[async_trait]
pub trait SessionPersistence: Send + Sync {
    async fn load(&self) -> Result<Option<String>, ClientError>;
    async fn store(&self, value: &str) -> Result<(), ClientError>;
    async fn clear(&self) -> Result<(), ClientError>;
}

/// Process-local persistence.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: Mutex<Option<String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot, e.g. with a previously stored value.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(value.into())),
        }
    }
}

#[async_trait]
impl SessionPersistence for MemoryPersistence {
    async fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn store(&self, value: &str) -> Result<(), ClientError> {
        *self.slot.lock().await = Some(value.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        self.slot.lock().await.take();
        Ok(())
    }
}

/// Persistence in a single JSON file.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionPersistence for FilePersistence {
    async fn load(&self) -> Result<Option<String>, ClientError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, value: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, value).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
