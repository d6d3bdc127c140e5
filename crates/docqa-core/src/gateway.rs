//! Turns a local file selection or a remote key into a [`DocumentHandle`].
//!
//! Local uploads are mirrored to the blob store in the background. Mirroring
//! is best-effort: its outcome is logged and never reaches the caller, and an
//! object that already exists under the derived key is left alone.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use thiserror::Error;
use tokio_util::task::TaskTracker;

use crate::blob::{BlobError, BlobStore, blob_key};
use crate::document::{DocumentHandle, Origin};

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Wrong file type or unusable input, caught before any transfer.
    #[error("{0}")]
    Validation(String),
    /// Remote lookup found nothing under the key.
    #[error("no document stored under {key}")]
    NotFound { key: String },
    /// Storage or network fault while retrieving.
    #[error("transfer failed: {0}")]
    Transfer(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that `name` looks like a PDF by extension / guessed MIME type.
pub fn validate_pdf_name(name: &str) -> Result<(), GatewayError> {
    let is_pdf = mime_guess::from_path(name)
        .iter()
        .any(|m| m == mime_guess::mime::APPLICATION_PDF);
    if is_pdf {
        Ok(())
    } else {
        Err(GatewayError::Validation(format!(
            "{name} is not a PDF (only .pdf files are accepted)"
        )))
    }
}

/// A file chosen through the selection surface, already type-checked.
#[derive(Debug, Clone)]
pub struct LocalFile {
    name: String,
    bytes: Vec<u8>,
    path: Option<PathBuf>,
}

impl LocalFile {
    /// Wrap raw bytes handed over by the host (drag-and-drop style).
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, GatewayError> {
        let name = name.into();
        validate_pdf_name(&name)?;
        Ok(Self {
            name,
            bytes,
            path: None,
        })
    }

    /// Read a file from disk, rejecting non-PDF names before touching it.
    pub async fn read(path: &Path) -> Result<Self, GatewayError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| GatewayError::Validation(format!("{} is not a file", path.display())))?;
        validate_pdf_name(&name)?;
        let bytes = tokio::fs::read(path).await?;
        let path = tokio::fs::canonicalize(path)
            .await
            .unwrap_or_else(|_| path.to_path_buf());
        Ok(Self {
            name,
            bytes,
            path: Some(path),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Upload/retrieve gateway. Owns the scratch directory for transient locators
/// and the set of detached mirror tasks.
pub struct Gateway {
    store: Option<Arc<dyn BlobStore>>,
    scratch: TempDir,
    mirrors: TaskTracker,
}

impl Gateway {
    pub fn new(store: Option<Arc<dyn BlobStore>>) -> Result<Self, GatewayError> {
        let scratch = tempfile::Builder::new().prefix("docqa-").tempdir()?;
        Ok(Self {
            store,
            scratch,
            mirrors: TaskTracker::new(),
        })
    }

    pub fn store_name(&self) -> Option<&str> {
        self.store.as_deref().map(|s| s.name())
    }

    /// Register a local selection as a fresh handle and start mirroring it.
    ///
    /// Must be called inside a Tokio runtime (the mirror is spawned).
    pub fn from_local_file(&self, file: LocalFile) -> Result<DocumentHandle, GatewayError> {
        let LocalFile { name, bytes, path } = file;
        let handle = match path {
            Some(path) => DocumentHandle::from_path(name, bytes, path),
            None => {
                let bytes: Arc<[u8]> = Arc::from(bytes);
                let temp = write_scratch(self.scratch.path(), &name, &bytes)?;
                DocumentHandle::from_temp(name, bytes, temp, Origin::Local)
            }
        };
        tracing::debug!(document = %handle.id(), name = handle.name(), bytes = handle.len(), "local document registered");

        if let Some(store) = &self.store {
            self.spawn_mirror(Arc::clone(store), blob_key(handle.name()), handle.shared_bytes());
        }
        Ok(handle)
    }

    /// Fetch `pdfs/<key>.pdf` from the blob store.
    ///
    /// Leaves no trace on failure: `NotFound` for a missing object,
    /// `Transfer` for anything else.
    pub async fn from_remote_key(&self, key: &str) -> Result<DocumentHandle, GatewayError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(GatewayError::Validation("enter a document name to look up".into()));
        }
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| GatewayError::Transfer("no blob store configured".into()))?;

        let object_key = blob_key(key);
        tracing::debug!(key = %object_key, store = store.name(), "remote lookup");
        let bytes = match store.get(&object_key).await {
            Ok(bytes) => bytes,
            Err(BlobError::NotFound(_)) => return Err(GatewayError::NotFound { key: object_key }),
            Err(e) => return Err(GatewayError::Transfer(e.to_string())),
        };

        let name = object_key
            .strip_prefix(crate::blob::PDF_PREFIX)
            .unwrap_or(&object_key)
            .to_string();
        let bytes: Arc<[u8]> = Arc::from(bytes);
        let temp = {
            let dir = self.scratch.path().to_path_buf();
            let name = name.clone();
            let bytes = Arc::clone(&bytes);
            tokio::task::spawn_blocking(move || write_scratch(&dir, &name, &bytes))
                .await
                .map_err(|e| GatewayError::Io(std::io::Error::other(e)))??
        };
        let handle = DocumentHandle::from_temp(
            name,
            bytes,
            temp,
            Origin::Remote {
                key: object_key.clone(),
            },
        );
        tracing::debug!(document = %handle.id(), key = %object_key, bytes = handle.len(), "remote document retrieved");
        Ok(handle)
    }

    /// Wait for every mirror started so far. Used at shutdown and in tests.
    pub async fn flush_mirrors(&self) {
        self.mirrors.close();
        self.mirrors.wait().await;
        self.mirrors.reopen();
    }

    /// Detached, best-effort upload. Nothing observes the result.
    fn spawn_mirror(&self, store: Arc<dyn BlobStore>, key: String, bytes: Arc<[u8]>) {
        self.mirrors.spawn(async move {
            match store.exists(&key).await {
                Ok(true) => {
                    tracing::debug!(key = %key, "already mirrored, skipping upload");
                    return;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "mirror existence check failed");
                    return;
                }
            }
            match store.put(&key, &bytes).await {
                Ok(()) => tracing::info!(key = %key, store = store.name(), "mirrored upload"),
                Err(e) => tracing::warn!(key = %key, error = %e, "mirror upload failed"),
            }
        });
    }
}

/// Write `bytes` to a fresh `<stem>-*.pdf` in `dir`. Blocking.
fn write_scratch(dir: &Path, name: &str, bytes: &[u8]) -> Result<tempfile::TempPath, GatewayError> {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let mut file = tempfile::Builder::new()
        .prefix(&format!("{stem}-"))
        .suffix(".pdf")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file.into_temp_path())
}
