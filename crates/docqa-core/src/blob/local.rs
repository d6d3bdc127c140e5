use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::{BlobError, BlobStore};
use crate::BoxFuture;

/// Blob store backed by a directory; keys map to relative paths.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf) -> Result<Self, BlobError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key below `root`, refusing anything that would escape it.
    fn object_path(&self, key: &str) -> Result<PathBuf, BlobError> {
        let rel = Path::new(key);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(BlobError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid blob key: {key:?}"),
            )));
        }
        Ok(self.root.join(rel))
    }
}

impl BlobStore for LocalBlobStore {
    fn name(&self) -> &str {
        "local"
    }

    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, BlobError>> {
        Box::pin(async move {
            let path = self.object_path(key)?;
            Ok(tokio::fs::try_exists(&path).await?)
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, BlobError>> {
        Box::pin(async move {
            let path = self.object_path(key)?;
            match tokio::fs::read(&path).await {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(key.to_string())),
                Err(e) => Err(BlobError::Io(e)),
            }
        })
    }

    fn put<'a>(&'a self, key: &'a str, data: &'a [u8]) -> BoxFuture<'a, Result<(), BlobError>> {
        Box::pin(async move {
            let path = self.object_path(key)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, data).await?;
            Ok(())
        })
    }
}
