//! Inference endpoint trait and the HTTP implementation.

mod http;

pub use http::HttpInference;

use serde::Deserialize;
use thiserror::Error;

use crate::BoxFuture;
use crate::document::DocumentHandle;

/// A successful answer from the inference endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Answer {
    #[serde(rename = "answer")]
    pub text: String,
    #[serde(default)]
    pub sources: Option<String>,
}

/// Failure of a single inference request. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// Endpoint answered with a non-2xx status.
    #[error("inference endpoint returned HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    /// Connection, timeout or other transport fault.
    #[error("inference request failed: {0}")]
    Transport(String),
    /// 2xx response whose body was not `{ "answer": ... }`.
    #[error("unreadable inference response: {0}")]
    Decode(String),
}

/// Something that can answer a question about a document.
pub trait InferenceClient: Send + Sync {
    /// Short name for logs and the status bar.
    fn name(&self) -> &str;

    /// Send the document's bytes and the prompt; resolve to the answer.
    fn ask<'a>(
        &'a self,
        document: &'a DocumentHandle,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<Answer, InferenceError>>;
}
