//! Hand-rolled test doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use docqa_core::blob::MemoryBlobStore;
use docqa_core::{Answer, BlobError, BlobStore, BoxFuture, DocumentHandle, InferenceClient, InferenceError};

/// A configurable mock response for [`MockInference`].
#[derive(Clone, Debug)]
pub enum MockReply {
    Answer(String),
    Status(u16),
    Transport(String),
}

/// Inference double: fixed reply or a sequence (last one repeats), optional
/// latency, and a record of every prompt it was asked.
pub struct MockInference {
    replies: Mutex<Vec<MockReply>>,
    fallback: MockReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
}

impl MockInference {
    pub fn new(reply: MockReply) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            fallback: reply,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::new(MockReply::Answer(text.to_string()))
    }

    pub fn with_sequence(mut replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "sequence must have at least one reply");
        replies.reverse();
        let fallback = replies.first().cloned().unwrap();
        Self {
            replies: Mutex::new(replies),
            ..Self::new(fallback)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(document name, prompt)` for every call, in order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl InferenceClient for MockInference {
    fn name(&self) -> &str {
        "mock"
    }

    fn ask<'a>(
        &'a self,
        document: &'a DocumentHandle,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<Answer, InferenceError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((document.name().to_string(), prompt.to_string()));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| self.fallback.clone());
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            match reply {
                MockReply::Answer(text) => Ok(Answer {
                    text,
                    sources: None,
                }),
                MockReply::Status(status) => Err(InferenceError::Status {
                    status,
                    message: None,
                }),
                MockReply::Transport(msg) => Err(InferenceError::Transport(msg)),
            }
        })
    }
}

/// Memory store that counts operations and can be told to fail.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryBlobStore,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
    fail_puts: bool,
    fail_gets: bool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_puts() -> Self {
        Self {
            fail_puts: true,
            ..Self::default()
        }
    }

    pub fn failing_gets() -> Self {
        Self {
            fail_gets: true,
            ..Self::default()
        }
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub async fn seed(&self, key: &str, data: &[u8]) {
        self.inner.put(key, data).await.unwrap();
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.exists(key).await.unwrap()
    }
}

impl BlobStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, BlobError>> {
        self.inner.exists(key)
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, BlobError>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets {
            return Box::pin(async { Err(BlobError::Transport("connection reset".into())) });
        }
        self.inner.get(key)
    }

    fn put<'a>(&'a self, key: &'a str, data: &'a [u8]) -> BoxFuture<'a, Result<(), BlobError>> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts {
            return Box::pin(async { Err(BlobError::Status { status: 503, key: key.to_string() }) });
        }
        self.inner.put(key, data)
    }
}

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%test\n";
