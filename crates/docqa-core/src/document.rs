//! In-memory representation of one uploaded or retrieved PDF.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempPath;
use uuid::Uuid;

/// Opaque document identifier, unique for the lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the document entered the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Picked from the local filesystem (or handed over as raw bytes).
    Local,
    /// Fetched from the blob store by key.
    Remote { key: String },
}

/// Backing file for the display locator.
///
/// `Transient` files live in the gateway's scratch directory and are removed
/// when the owning handle is dropped.
#[derive(Debug)]
enum Locator {
    Path(PathBuf),
    Transient(TempPath),
}

impl Locator {
    fn path(&self) -> &Path {
        match self {
            Locator::Path(p) => p.as_path(),
            Locator::Transient(t) => &**t,
        }
    }
}

/// One document in the registry. Never mutated after creation.
#[derive(Debug)]
pub struct DocumentHandle {
    id: DocumentId,
    name: String,
    bytes: Arc<[u8]>,
    locator: Locator,
    origin: Origin,
}

impl DocumentHandle {
    /// A handle whose locator is an existing file the session does not own.
    pub fn from_path(name: impl Into<String>, bytes: Vec<u8>, path: PathBuf) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            bytes: Arc::from(bytes),
            locator: Locator::Path(path),
            origin: Origin::Local,
        }
    }

    /// A handle backed by a temporary file that is deleted with the handle.
    pub fn from_temp(
        name: impl Into<String>,
        bytes: Arc<[u8]>,
        temp: TempPath,
        origin: Origin,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            bytes,
            locator: Locator::Transient(temp),
            origin,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Original filename, e.g. `plan123.pdf`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared view of the payload, for tasks that outlive a borrow.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Filesystem path behind the locator.
    pub fn path(&self) -> &Path {
        self.locator.path()
    }

    /// Dereferenceable `file://` URL for external viewers.
    pub fn url(&self) -> String {
        let path = self.locator.path();
        reqwest::Url::from_file_path(path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("file://{}", path.display()))
    }

    /// Whether the locator is a session-owned temporary file.
    pub fn is_transient(&self) -> bool {
        matches!(self.locator, Locator::Transient(_))
    }
}
