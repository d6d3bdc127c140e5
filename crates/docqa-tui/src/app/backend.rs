use docqa_core::Settled;

use super::{App, InputMode, Lookup, Prompt};
use crate::model::preview::PreviewState;
use crate::tui_event::{BackendEvent, LoadSource};

impl App {
    /// Apply an event coming back from the backend task.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::DocumentLoaded { source, handle } => {
                let handle = self.session.add_document(handle);
                self.previews.insert(handle.id(), PreviewState::Loading);
                self.doc_cursor = 0;
                self.chat_scroll = 0;
                match source {
                    LoadSource::Local(_) => {
                        self.loading_local = self.loading_local.saturating_sub(1);
                    }
                    LoadSource::Remote(_) => {
                        self.lookup = Lookup::Idle;
                        self.key_input.clear();
                        if self.prompt == Some(Prompt::FetchKey) {
                            self.prompt = None;
                            self.input_mode = InputMode::Normal;
                        }
                    }
                }
                self.activity.info(format!(
                    "Loaded {} ({})",
                    handle.name(),
                    crate::view::format_bytes(handle.len() as u64)
                ));
            }
            BackendEvent::LoadFailed { source, error } => match source {
                LoadSource::Local(path) => {
                    self.loading_local = self.loading_local.saturating_sub(1);
                    let message = format!("Could not open {}: {error}", path.display());
                    self.activity.warn(message.clone());
                    self.banner = Some(message);
                }
                LoadSource::Remote(key) => {
                    self.activity.warn(format!("Lookup of {key} failed: {error}"));
                    self.lookup = Lookup::Failed(error.to_string());
                }
            },
            BackendEvent::PreviewReady { document, preview } => {
                // The document may have been dropped in the meantime
                if self.session.registry().get(document).is_none() {
                    return;
                }
                let state = match preview {
                    Ok(p) => PreviewState::Ready(p),
                    Err(e) => PreviewState::Unavailable(e),
                };
                self.previews.insert(document, state);
            }
            BackendEvent::AnswerSettled { ticket_id, result } => {
                match self.session.settle(ticket_id, result) {
                    Settled::Answered => {
                        self.question.clear();
                        self.chat_scroll = 0;
                    }
                    Settled::Failed(e) => {
                        self.banner = Some(format!("Request failed: {e}"));
                    }
                    Settled::Stale => {
                        self.activity
                            .info("Discarded an answer for a conversation that was reset");
                    }
                    Settled::Ignored => {}
                }
            }
        }
    }
}
