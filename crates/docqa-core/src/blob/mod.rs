//! Keyed blob storage used to mirror uploads and fetch them back by name.

mod http;
mod local;
mod memory;

pub use http::HttpBlobStore;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use std::path::Path;

use thiserror::Error;

use crate::BoxFuture;

/// Prefix under which every PDF is stored.
pub const PDF_PREFIX: &str = "pdfs/";

#[derive(Error, Debug)]
pub enum BlobError {
    /// No object under this key. Distinct from every other failure.
    #[error("no object stored under {0}")]
    NotFound(String),
    #[error("blob store returned HTTP {status} for {key}")]
    Status { status: u16, key: String },
    #[error("blob store request failed: {0}")]
    Transport(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlobError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobError::NotFound(_))
    }
}

/// Storage key for a document name: `pdfs/<stem>.pdf`.
///
/// Accepts either a bare key (`plan123`) or a filename (`plan123.pdf`,
/// `dir/plan123.PDF`); only the final component's stem is used.
pub fn blob_key(name: &str) -> String {
    let trimmed = name.trim();
    let file = Path::new(trimmed)
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| trimmed.to_string());
    let stem = match file.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("pdf") && !stem.is_empty() => stem,
        _ => file.as_str(),
    };
    format!("{PDF_PREFIX}{stem}.pdf")
}

/// A keyed object store.
pub trait BlobStore: Send + Sync {
    /// Name shown in logs and the status bar.
    fn name(&self) -> &str;

    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, BlobError>>;

    /// Fetch an object. Missing objects yield [`BlobError::NotFound`].
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, BlobError>>;

    fn put<'a>(&'a self, key: &'a str, data: &'a [u8]) -> BoxFuture<'a, Result<(), BlobError>>;
}
