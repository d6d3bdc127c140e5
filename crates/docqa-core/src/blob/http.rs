use std::time::Duration;

use reqwest::StatusCode;

use super::{BlobError, BlobStore};
use crate::BoxFuture;
use crate::CoreError;

/// REST object store: `HEAD`/`GET`/`PUT {base_url}/{key}`.
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("docqa/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn object_url(&self, key: &str) -> String {
        let encoded: Vec<_> = key.split('/').map(urlencoding::encode).collect();
        format!("{}/{}", self.base_url, encoded.join("/"))
    }
}

fn transport(e: reqwest::Error) -> BlobError {
    BlobError::Transport(e.to_string())
}

impl BlobStore for HttpBlobStore {
    fn name(&self) -> &str {
        "http"
    }

    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, BlobError>> {
        Box::pin(async move {
            let resp = self
                .client
                .head(self.object_url(key))
                .timeout(self.timeout)
                .send()
                .await
                .map_err(transport)?;
            match resp.status() {
                s if s.is_success() => Ok(true),
                StatusCode::NOT_FOUND => Ok(false),
                s => Err(BlobError::Status {
                    status: s.as_u16(),
                    key: key.to_string(),
                }),
            }
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, BlobError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.object_url(key))
                .timeout(self.timeout)
                .send()
                .await
                .map_err(transport)?;
            match resp.status() {
                s if s.is_success() => Ok(resp.bytes().await.map_err(transport)?.to_vec()),
                StatusCode::NOT_FOUND => Err(BlobError::NotFound(key.to_string())),
                s => Err(BlobError::Status {
                    status: s.as_u16(),
                    key: key.to_string(),
                }),
            }
        })
    }

    fn put<'a>(&'a self, key: &'a str, data: &'a [u8]) -> BoxFuture<'a, Result<(), BlobError>> {
        Box::pin(async move {
            let resp = self
                .client
                .put(self.object_url(key))
                .header(reqwest::header::CONTENT_TYPE, "application/pdf")
                .body(data.to_vec())
                .timeout(self.timeout)
                .send()
                .await
                .map_err(transport)?;
            let status = resp.status();
            if !status.is_success() {
                return Err(BlobError::Status {
                    status: status.as_u16(),
                    key: key.to_string(),
                });
            }
            Ok(())
        })
    }
}
