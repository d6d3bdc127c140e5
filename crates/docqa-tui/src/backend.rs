use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;

use docqa_core::{DocumentHandle, Gateway, InferenceClient, LocalFile, QueryTicket};

use crate::model::preview;
use crate::tui_event::{BackendCommand, BackendEvent, LoadSource};

/// Serve commands from the UI until its sender is dropped.
///
/// Every command runs as its own task so a slow inference request never
/// holds up a file load. Returns once all in-flight work has reported back.
pub async fn run(
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    event_tx: mpsc::UnboundedSender<BackendEvent>,
    gateway: Arc<Gateway>,
    client: Arc<dyn InferenceClient>,
) {
    let tasks = TaskTracker::new();

    while let Some(cmd) = cmd_rx.recv().await {
        let tx = event_tx.clone();
        match cmd {
            BackendCommand::OpenLocal { path } => {
                let gateway = Arc::clone(&gateway);
                tasks.spawn(async move { open_local(&gateway, path, &tx).await });
            }
            BackendCommand::FetchRemote { key } => {
                let gateway = Arc::clone(&gateway);
                tasks.spawn(async move { fetch_remote(&gateway, key, &tx).await });
            }
            BackendCommand::Ask { ticket } => {
                let client = Arc::clone(&client);
                tasks.spawn(async move { ask(client.as_ref(), ticket, &tx).await });
            }
        }
    }

    tasks.close();
    tasks.wait().await;
}

async fn open_local(gateway: &Gateway, path: PathBuf, tx: &mpsc::UnboundedSender<BackendEvent>) {
    let source = LoadSource::Local(path.clone());
    let loaded = match LocalFile::read(&path).await {
        Ok(file) => gateway.from_local_file(file),
        Err(e) => Err(e),
    };
    publish(loaded, source, tx).await;
}

async fn fetch_remote(gateway: &Gateway, key: String, tx: &mpsc::UnboundedSender<BackendEvent>) {
    let loaded = gateway.from_remote_key(&key).await;
    publish(loaded, LoadSource::Remote(key), tx).await;
}

/// Report a load result, then build the text preview off the async threads.
async fn publish(
    loaded: Result<DocumentHandle, docqa_core::GatewayError>,
    source: LoadSource,
    tx: &mpsc::UnboundedSender<BackendEvent>,
) {
    let handle = match loaded {
        Ok(handle) => handle,
        Err(error) => {
            let _ = tx.send(BackendEvent::LoadFailed { source, error });
            return;
        }
    };

    let document = handle.id();
    let bytes = handle.shared_bytes();
    if tx
        .send(BackendEvent::DocumentLoaded { source, handle })
        .is_err()
    {
        return;
    }

    let preview = tokio::task::spawn_blocking(move || preview::extract(&bytes))
        .await
        .unwrap_or_else(|e| Err(format!("preview task failed: {e}")));
    if let Err(reason) = &preview {
        tracing::debug!(%document, %reason, "no preview");
    }
    let _ = tx.send(BackendEvent::PreviewReady { document, preview });
}

async fn ask(
    client: &dyn InferenceClient,
    ticket: QueryTicket,
    tx: &mpsc::UnboundedSender<BackendEvent>,
) {
    let result = docqa_core::pipeline::execute(client, &ticket).await;
    let _ = tx.send(BackendEvent::AnswerSettled {
        ticket_id: ticket.id(),
        result,
    });
}
