use std::time::Duration;

use reqwest::multipart::{Form, Part};

use super::{Answer, InferenceClient, InferenceError};
use crate::BoxFuture;
use crate::CoreError;
use crate::document::DocumentHandle;

/// Multipart POST client for the question endpoint.
///
/// Sends `file` (PDF bytes with the original filename) and `prompt`, expects
/// `{ "answer": ..., "sources"?: ... }` back.
pub struct HttpInference {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpInference {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("docqa/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Pull the `error` field out of a failure body, if it is JSON.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["error"].as_str().map(|s| s.to_string())
}

impl InferenceClient for HttpInference {
    fn name(&self) -> &str {
        "http"
    }

    fn ask<'a>(
        &'a self,
        document: &'a DocumentHandle,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<Answer, InferenceError>> {
        Box::pin(async move {
            let file = Part::bytes(document.bytes().to_vec())
                .file_name(document.name().to_string())
                .mime_str("application/pdf")
                .map_err(|e| InferenceError::Transport(e.to_string()))?;
            let form = Form::new().part("file", file).text("prompt", prompt.to_string());

            tracing::debug!(
                endpoint = %self.endpoint,
                document = %document.id(),
                bytes = document.len(),
                "sending inference request"
            );

            let resp = self
                .client
                .post(&self.endpoint)
                .multipart(form)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| InferenceError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(InferenceError::Status {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }

            resp.json::<Answer>()
                .await
                .map_err(|e| InferenceError::Decode(e.to_string()))
        })
    }
}
