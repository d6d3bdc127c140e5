use std::path::PathBuf;

use docqa_core::{Answer, DocumentHandle, DocumentId, GatewayError, InferenceError, QueryTicket};

use crate::model::preview::PdfPreview;

/// Commands sent from the TUI to the backend.
pub enum BackendCommand {
    /// Read a PDF from disk and register it.
    OpenLocal { path: PathBuf },
    /// Retrieve a previously mirrored PDF by name.
    FetchRemote { key: String },
    /// Run one inference request.
    Ask { ticket: QueryTicket },
}

/// Where a load request came from, so failures land in the right place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Local(PathBuf),
    Remote(String),
}

/// Events flowing from the backend task to the TUI.
#[derive(Debug)]
pub enum BackendEvent {
    DocumentLoaded {
        source: LoadSource,
        handle: DocumentHandle,
    },
    LoadFailed {
        source: LoadSource,
        error: GatewayError,
    },
    /// Text preview for the viewer pane finished (or could not be produced).
    PreviewReady {
        document: DocumentId,
        preview: Result<PdfPreview, String>,
    },
    AnswerSettled {
        ticket_id: u64,
        result: Result<Answer, InferenceError>,
    },
}
