//! HTTP inference client and HTTP blob store against throwaway axum servers
//! bound to 127.0.0.1.

mod common;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use common::PDF_BYTES;
use docqa_core::blob::HttpBlobStore;
use docqa_core::{
    BlobError, BlobStore, DocumentHandle, HttpInference, InferenceClient, InferenceError,
};

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn document() -> DocumentHandle {
    DocumentHandle::from_path(
        "plan.pdf",
        PDF_BYTES.to_vec(),
        std::env::temp_dir().join("plan.pdf"),
    )
}

#[derive(Default, Debug)]
struct Received {
    file_name: Option<String>,
    file_bytes: Vec<u8>,
    prompt: Option<String>,
}

type Shared = Arc<Mutex<Received>>;

async fn answer_route(State(seen): State<Shared>, mut multipart: Multipart) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.unwrap();
                let mut seen = seen.lock().unwrap();
                seen.file_name = file_name;
                seen.file_bytes = data.to_vec();
            }
            Some("prompt") => {
                let text = field.text().await.unwrap();
                seen.lock().unwrap().prompt = Some(text);
            }
            _ => {}
        }
    }
    Json(serde_json::json!({
        "answer": "Dental is covered.",
        "sources": "Page 3"
    }))
}

#[tokio::test]
async fn inference_sends_file_and_prompt() {
    let seen: Shared = Arc::default();
    let app = Router::new()
        .route("/api/process_prompt", post(answer_route))
        .with_state(Arc::clone(&seen));
    let addr = serve(app).await;

    let client = HttpInference::new(
        format!("http://{addr}/api/process_prompt"),
        Duration::from_secs(5),
    )
    .unwrap();
    let answer = client.ask(&document(), "What is covered?").await.unwrap();
    assert_eq!(answer.text, "Dental is covered.");
    assert_eq!(answer.sources.as_deref(), Some("Page 3"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.file_name.as_deref(), Some("plan.pdf"));
    assert_eq!(seen.file_bytes, PDF_BYTES);
    assert_eq!(seen.prompt.as_deref(), Some("What is covered?"));
}

#[tokio::test]
async fn inference_error_body_is_carried() {
    let app = Router::new().route(
        "/ask",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "model unavailable" })),
            )
        }),
    );
    let addr = serve(app).await;

    let client = HttpInference::new(format!("http://{addr}/ask"), Duration::from_secs(5)).unwrap();
    let err = client.ask(&document(), "X").await.unwrap_err();
    assert_eq!(
        err,
        InferenceError::Status {
            status: 500,
            message: Some("model unavailable".into()),
        }
    );
    assert_eq!(
        err.to_string(),
        "inference endpoint returned HTTP 500: model unavailable"
    );
}

#[tokio::test]
async fn inference_non_json_success_is_decode_error() {
    let app = Router::new().route("/ask", post(|| async { "plain text" }));
    let addr = serve(app).await;

    let client = HttpInference::new(format!("http://{addr}/ask"), Duration::from_secs(5)).unwrap();
    let err = client.ask(&document(), "X").await.unwrap_err();
    assert!(matches!(err, InferenceError::Decode(_)));
}

#[tokio::test]
async fn inference_unreachable_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpInference::new(format!("http://{addr}/ask"), Duration::from_secs(2)).unwrap();
    let err = client.ask(&document(), "X").await.unwrap_err();
    assert!(matches!(err, InferenceError::Transport(_)));
}

type Objects = Arc<Mutex<HashMap<String, Vec<u8>>>>;

async fn get_object(State(objects): State<Objects>, Path(key): Path<String>) -> impl IntoResponse {
    match objects.lock().unwrap().get(&key) {
        Some(data) => (StatusCode::OK, data.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_object(
    State(objects): State<Objects>,
    Path(key): Path<String>,
    body: Bytes,
) -> StatusCode {
    objects.lock().unwrap().insert(key, body.to_vec());
    StatusCode::CREATED
}

async fn blob_server() -> (SocketAddr, Objects) {
    let objects: Objects = Arc::default();
    let app = Router::new()
        .route("/bucket/{*key}", get(get_object).put(put_object))
        .with_state(Arc::clone(&objects));
    (serve(app).await, objects)
}

#[tokio::test]
async fn http_store_round_trip() {
    let (addr, objects) = blob_server().await;
    let store = HttpBlobStore::new(format!("http://{addr}/bucket/"), Duration::from_secs(5)).unwrap();

    assert!(!store.exists("pdfs/plan.pdf").await.unwrap());
    store.put("pdfs/plan.pdf", PDF_BYTES).await.unwrap();
    assert!(objects.lock().unwrap().contains_key("pdfs/plan.pdf"));
    assert!(store.exists("pdfs/plan.pdf").await.unwrap());
    assert_eq!(store.get("pdfs/plan.pdf").await.unwrap(), PDF_BYTES);
}

#[tokio::test]
async fn http_store_missing_object_is_not_found() {
    let (addr, _objects) = blob_server().await;
    let store = HttpBlobStore::new(format!("http://{addr}/bucket"), Duration::from_secs(5)).unwrap();
    let err = store.get("pdfs/nothing.pdf").await.unwrap_err();
    assert!(matches!(err, BlobError::NotFound(ref k) if k == "pdfs/nothing.pdf"));
}

#[tokio::test]
async fn http_store_server_error_is_not_not_found() {
    let app = Router::new().route(
        "/bucket/{*key}",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let addr = serve(app).await;
    let store = HttpBlobStore::new(format!("http://{addr}/bucket"), Duration::from_secs(5)).unwrap();
    let err = store.get("pdfs/x.pdf").await.unwrap_err();
    assert!(matches!(err, BlobError::Status { status: 503, .. }));
    assert!(!err.is_not_found());
}
