use chrono::Local;

use docqa_core::config_file;
use docqa_core::transcript::{self, ExportFormat};
use docqa_core::{SessionError, Settled};

use super::{App, Focus, InputMode, Lookup, Prompt, Screen, osc52_copy};
use crate::action::Action;
use crate::tui_event::BackendCommand;

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::ForceQuit => {
                self.should_quit = true;
                return true;
            }
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                return false;
            }
            Action::Resize(_w, h) => {
                self.visible_rows = (h as usize).saturating_sub(12);
                return false;
            }
            _ => {}
        }

        // Quit confirmation modal: q confirms, Esc cancels
        if self.confirm_quit {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::NavigateBack | Action::InputCancel => {
                    self.confirm_quit = false;
                }
                _ => {}
            }
            return false;
        }

        if self.show_help {
            match action {
                Action::ToggleHelp | Action::NavigateBack => self.show_help = false,
                Action::Quit => self.confirm_quit = true,
                _ => {}
            }
            return false;
        }

        if self.input_mode == InputMode::TextInput {
            self.handle_text_input(action);
            return false;
        }

        if self.export_state.active {
            self.handle_export_action(action);
            return false;
        }

        if self.screen == Screen::FilePicker {
            self.handle_file_picker_action(action);
            return false;
        }

        self.status_message = None;
        match action {
            Action::Quit => {
                self.confirm_quit = true;
            }
            Action::MoveDown => match self.focus {
                Focus::Documents => {
                    let max = self.session.registry().len().saturating_sub(1);
                    self.doc_cursor = (self.doc_cursor + 1).min(max);
                }
                Focus::Chat => self.chat_scroll = self.chat_scroll.saturating_sub(1),
            },
            Action::MoveUp => match self.focus {
                Focus::Documents => self.doc_cursor = self.doc_cursor.saturating_sub(1),
                Focus::Chat => self.chat_scroll = self.chat_scroll.saturating_add(1),
            },
            Action::PageDown => match self.focus {
                Focus::Documents => {
                    let max = self.session.registry().len().saturating_sub(1);
                    self.doc_cursor = (self.doc_cursor + self.visible_rows.max(1)).min(max);
                }
                Focus::Chat => {
                    self.chat_scroll = self.chat_scroll.saturating_sub(self.page_lines());
                }
            },
            Action::PageUp => match self.focus {
                Focus::Documents => {
                    self.doc_cursor = self.doc_cursor.saturating_sub(self.visible_rows.max(1));
                }
                Focus::Chat => {
                    self.chat_scroll = self.chat_scroll.saturating_add(self.page_lines());
                }
            },
            Action::GoTop => match self.focus {
                Focus::Documents => self.doc_cursor = 0,
                Focus::Chat => self.chat_scroll = u16::MAX,
            },
            Action::GoBottom => match self.focus {
                Focus::Documents => {
                    self.doc_cursor = self.session.registry().len().saturating_sub(1);
                }
                Focus::Chat => self.chat_scroll = 0,
            },
            Action::DrillIn => match self.focus {
                Focus::Documents => self.select_document_at_cursor(),
                Focus::Chat => self.start_compose(),
            },
            Action::NavigateBack => {
                if self.banner.is_some() {
                    self.dismiss_banner();
                } else if matches!(self.lookup, Lookup::Failed(_)) {
                    self.lookup = Lookup::Idle;
                }
            }
            Action::CycleFocus => {
                self.focus = match self.focus {
                    Focus::Documents => Focus::Chat,
                    Focus::Chat => Focus::Documents,
                };
            }
            Action::AddFiles => {
                self.file_picker.message = None;
                self.file_picker.refresh_entries();
                self.screen = Screen::FilePicker;
            }
            Action::FetchByKey => {
                if !self.is_looking_up() {
                    self.lookup = Lookup::Idle;
                    self.key_input.clear();
                }
                self.prompt = Some(Prompt::FetchKey);
                self.input_mode = InputMode::TextInput;
            }
            Action::Compose => self.start_compose(),
            Action::NewChat => {
                self.session.new_chat();
                self.chat_scroll = 0;
                self.activity.info("Started a new chat");
            }
            Action::CopyLastAnswer => match self.session.log().last_answer() {
                Some(turn) => {
                    osc52_copy(&turn.text);
                    self.status_message = Some("Copied last answer to clipboard".into());
                }
                None => self.status_message = Some("No answer to copy yet".into()),
            },
            Action::Export => self.open_export(),
            Action::CycleTheme => self.cycle_theme(),
            Action::SaveConfig => self.save_config(),
            Action::ToggleHelp => self.show_help = true,
            _ => {}
        }
        false
    }

    fn page_lines(&self) -> u16 {
        self.visible_rows.max(1).min(u16::MAX as usize) as u16
    }

    fn select_document_at_cursor(&mut self) {
        let Some(doc) = self.document_at_cursor().cloned() else {
            return;
        };
        if self.session.set_active(doc.id()) {
            self.chat_scroll = 0;
            self.activity.info(format!("Switched to {}", doc.name()));
        }
        self.focus = Focus::Chat;
    }

    fn start_compose(&mut self) {
        if self.session.active().is_none() {
            self.status_message = Some("Open a PDF first (a to add, / to fetch)".into());
            return;
        }
        self.focus = Focus::Chat;
        self.prompt = Some(Prompt::Question);
        self.input_mode = InputMode::TextInput;
    }

    fn leave_text_input(&mut self) {
        self.prompt = None;
        self.input_mode = InputMode::Normal;
    }

    fn handle_text_input(&mut self, action: Action) {
        let Some(prompt) = self.prompt else {
            self.input_mode = InputMode::Normal;
            return;
        };
        let input = match prompt {
            Prompt::Question => &mut self.question,
            Prompt::FetchKey => &mut self.key_input,
            Prompt::ExportPath => &mut self.export_state.path_input,
        };
        match action {
            Action::TextInput(ch) => input.insert(ch),
            Action::Paste(text) => input.insert_str(&text),
            Action::Backspace => input.backspace(),
            Action::DeleteForward => input.delete_forward(),
            Action::CursorLeft => input.left(),
            Action::CursorRight => input.right(),
            Action::CursorHome => input.home(),
            Action::CursorEnd => input.end(),
            Action::InputCancel => {
                if prompt == Prompt::FetchKey && !self.is_looking_up() {
                    self.lookup = Lookup::Idle;
                }
                self.leave_text_input();
            }
            Action::InputConfirm => match prompt {
                Prompt::Question => self.submit_question(),
                Prompt::FetchKey => self.fetch_remote(),
                Prompt::ExportPath => {
                    let text = self.export_state.path_input.text().trim().to_string();
                    if !text.is_empty() {
                        self.export_state.output_path = text;
                    }
                    self.leave_text_input();
                }
            },
            _ => {}
        }
    }

    /// Submit the composed question about the active document.
    pub(super) fn submit_question(&mut self) {
        match self.session.submit(self.question.text()) {
            Ok(ticket) => {
                let ticket_id = ticket.id();
                self.leave_text_input();
                self.chat_scroll = 0;
                if !self.send_command(BackendCommand::Ask { ticket }) {
                    // Nothing will ever answer; settle as a failure right away.
                    let result = Err(docqa_core::InferenceError::Transport(
                        "backend is not running".into(),
                    ));
                    if let Settled::Failed(e) = self.session.settle(ticket_id, result) {
                        self.banner = Some(format!("Request failed: {e}"));
                    }
                }
            }
            Err(error) => {
                let message = match error {
                    SessionError::Pending => "Still waiting for the previous answer",
                    SessionError::NoDocument => "Open a PDF first (a to add, / to fetch)",
                    SessionError::EmptyQuestion => "Type a question first",
                };
                self.status_message = Some(message.into());
            }
        }
    }

    fn fetch_remote(&mut self) {
        if self.is_looking_up() {
            return;
        }
        let key = self.key_input.text().trim().to_string();
        if key.is_empty() {
            self.lookup = Lookup::Failed("Enter a document name to look up".into());
            return;
        }
        if self.send_command(BackendCommand::FetchRemote { key: key.clone() }) {
            self.activity.info(format!("Looking up {key}"));
            self.lookup = Lookup::Loading(key);
        } else {
            self.lookup = Lookup::Failed("Backend is not running".into());
        }
    }

    fn open_export(&mut self) {
        if self.session.log().is_empty() {
            self.status_message = Some("Nothing to export yet".into());
            return;
        }
        let name = self.export_document_name();
        let file = transcript::default_file_name(&name, self.export_state.format, Local::now());
        self.export_state.output_path = match file.rsplit_once('.') {
            Some((stem, _)) => stem.to_string(),
            None => file.clone(),
        };
        self.export_state.cursor = 0;
        self.export_state.message = None;
        self.export_state.active = true;
    }

    fn export_document_name(&self) -> String {
        self.session
            .active()
            .map(|d| d.name().to_string())
            .unwrap_or_else(|| "conversation".to_string())
    }

    fn handle_export_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.confirm_quit = true,
            Action::NavigateBack => self.export_state.active = false,
            Action::MoveDown => {
                self.export_state.cursor = (self.export_state.cursor + 1).min(2);
            }
            Action::MoveUp => {
                self.export_state.cursor = self.export_state.cursor.saturating_sub(1);
            }
            Action::DrillIn => match self.export_state.cursor {
                0 => {
                    let formats = ExportFormat::all();
                    let idx = formats
                        .iter()
                        .position(|&f| f == self.export_state.format)
                        .unwrap_or(0);
                    self.export_state.format = formats[(idx + 1) % formats.len()];
                }
                1 => {
                    let current = self.export_state.output_path.clone();
                    self.export_state.path_input.set(current);
                    self.prompt = Some(Prompt::ExportPath);
                    self.input_mode = InputMode::TextInput;
                }
                _ => {
                    let path = format!(
                        "{}.{}",
                        self.export_state.output_path,
                        self.export_state.format.extension()
                    );
                    let name = self.export_document_name();
                    match transcript::export_transcript(
                        &name,
                        self.session.log().turns(),
                        self.export_state.format,
                        std::path::Path::new(&path),
                    ) {
                        Ok(()) => {
                            self.export_state.message = Some(format!("Saved {path}"));
                            self.activity.info(format!("Exported transcript to {path}"));
                        }
                        Err(e) => {
                            self.export_state.message = Some(format!("Export failed: {e}"));
                            self.activity.warn(format!("Export to {path} failed: {e}"));
                        }
                    }
                }
            },
            _ => {}
        }
    }

    fn save_config(&mut self) {
        let file_cfg = config_file::from_config(&self.config);
        match config_file::save_config(&file_cfg) {
            Ok(path) => {
                self.status_message = Some(format!("Saved settings to {}", path.display()));
                self.activity.info(format!("Saved settings to {}", path.display()));
            }
            Err(e) => {
                self.status_message = Some(format!("Could not save settings: {e}"));
                self.activity.warn(format!("Could not save settings: {e}"));
            }
        }
    }
}
