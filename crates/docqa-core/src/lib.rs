use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub mod blob;
pub mod config_file;
pub mod conversation;
pub mod document;
pub mod gateway;
pub mod inference;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod transcript;

// Re-export for convenience
pub use blob::{BlobError, BlobStore, blob_key};
pub use conversation::{ConversationLog, Role, Turn};
pub use document::{DocumentHandle, DocumentId, Origin};
pub use gateway::{Gateway, GatewayError, LocalFile};
pub use inference::{Answer, HttpInference, InferenceClient, InferenceError};
pub use pipeline::{QueryPipeline, QueryStatus, QueryTicket};
pub use registry::Registry;
pub use session::{Session, SessionError, Settled};

/// Boxed future returned by the pluggable backends (inference, blob storage).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default inference endpoint (the development server's question route).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5328/api/process_prompt";

/// Default timeout for a single inference request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("blob store error: {0}")]
    Blob(#[from] BlobError),
    #[error("config error: {0}")]
    Config(String),
}

/// Where mirrored PDFs are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// A directory on the local filesystem.
    Local(PathBuf),
    /// A REST object store addressed as `{base_url}/{key}`.
    Http(String),
    /// Process-local map; contents vanish with the session.
    Memory,
    /// No mirroring and no remote lookup.
    Disabled,
}

impl StorageBackend {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Http(_) => "http",
            Self::Memory => "memory",
            Self::Disabled => "none",
        }
    }

    /// Default location for the local blob directory: `<data_dir>/docqa/blobs`.
    pub fn default_local() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docqa")
            .join("blobs");
        Self::Local(dir)
    }
}

/// Effective runtime configuration, resolved from CLI > env > file > defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint_url: String,
    pub request_timeout: Duration,
    pub storage: StorageBackend,
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            storage: StorageBackend::default_local(),
            theme: "hacker".to_string(),
        }
    }
}

impl Config {
    /// Build the blob store selected by `storage`. `None` means mirroring is off.
    pub fn build_blob_store(&self) -> Result<Option<Arc<dyn BlobStore>>, CoreError> {
        let store: Arc<dyn BlobStore> = match &self.storage {
            StorageBackend::Disabled => return Ok(None),
            StorageBackend::Memory => Arc::new(blob::MemoryBlobStore::new()),
            StorageBackend::Local(dir) => Arc::new(blob::LocalBlobStore::new(dir.clone())?),
            StorageBackend::Http(base) => {
                Arc::new(blob::HttpBlobStore::new(base.clone(), self.request_timeout)?)
            }
        };
        Ok(Some(store))
    }

    /// Build the HTTP inference client for `endpoint_url`.
    pub fn build_inference(&self) -> Result<HttpInference, CoreError> {
        HttpInference::new(self.endpoint_url.clone(), self.request_timeout)
    }
}
