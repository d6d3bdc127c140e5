mod backend;
mod update;
mod update_file_picker;
mod util;
use util::*;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc;

use docqa_core::{Config, DocumentHandle, DocumentId, Session};

use crate::model::activity::ActivityLog;
use crate::model::preview::PreviewState;
use crate::model::text_input::TextInput;
use crate::theme::Theme;
use crate::tui_event::BackendCommand;
use crate::view::export::ExportState;

/// Which screen is currently displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Main,
    FilePicker,
}

/// Pane that receives navigation keys on the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Documents,
    Chat,
}

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    TextInput,
}

/// Which text field is being edited while in [`InputMode::TextInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Question,
    FetchKey,
    ExportPath,
}

/// Fetch-by-key lookup state, shown inline under the key prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Idle,
    Loading(String),
    Failed(String),
}

/// State for the file picker screen.
#[derive(Debug, Clone)]
pub struct FilePickerState {
    /// Current directory being browsed.
    pub current_dir: PathBuf,
    /// Entries in the current directory (dirs first, then files).
    pub entries: Vec<FileEntry>,
    pub cursor: usize,
    /// PDFs marked with Space, opened together on Esc.
    pub selected: Vec<PathBuf>,
    /// Last rejection (non-PDF chosen), shown above the footer.
    pub message: Option<String>,
}

/// A single entry in the file picker.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_pdf: bool,
}

impl FilePickerState {
    pub fn new() -> Self {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::at(current_dir)
    }

    pub fn at(dir: PathBuf) -> Self {
        let mut state = Self {
            current_dir: dir,
            entries: Vec::new(),
            cursor: 0,
            selected: Vec::new(),
            message: None,
        };
        state.refresh_entries();
        state
    }

    /// Refresh the entries list from the current directory.
    pub fn refresh_entries(&mut self) {
        let mut entries = Vec::new();

        if let Some(parent) = self.current_dir.parent() {
            entries.push(FileEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
                is_pdf: false,
            });
        }

        if let Ok(read_dir) = std::fs::read_dir(&self.current_dir) {
            let mut dirs = Vec::new();
            let mut files = Vec::new();

            for entry in read_dir.flatten() {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    continue;
                }
                if path.is_dir() {
                    dirs.push(FileEntry {
                        name,
                        path,
                        is_dir: true,
                        is_pdf: false,
                    });
                } else {
                    let is_pdf = docqa_core::gateway::validate_pdf_name(&name).is_ok();
                    files.push(FileEntry {
                        name,
                        path,
                        is_dir: false,
                        is_pdf,
                    });
                }
            }

            dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            entries.extend(dirs);
            entries.extend(files);
        }

        self.entries = entries;
        self.cursor = 0;
    }

    /// Toggle selection of the current entry. Returns an error message for
    /// anything that is not a PDF.
    pub fn toggle_selected(&mut self) -> Result<(), String> {
        let Some(entry) = self.entries.get(self.cursor) else {
            return Ok(());
        };
        if entry.is_dir {
            return Ok(());
        }
        if !entry.is_pdf {
            return Err(pdf_rejection(&entry.name));
        }
        if let Some(pos) = self.selected.iter().position(|p| p == &entry.path) {
            self.selected.remove(pos);
        } else {
            self.selected.push(entry.path.clone());
        }
        Ok(())
    }

    /// Enter the directory at cursor, or return false if not a directory.
    pub fn enter_directory(&mut self) -> bool {
        if let Some(entry) = self.entries.get(self.cursor)
            && entry.is_dir
        {
            self.current_dir = entry.path.clone();
            self.refresh_entries();
            return true;
        }
        false
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selected.iter().any(|p| p == path)
    }
}

/// Main application state.
pub struct App {
    pub session: Session,
    pub config: Config,
    pub theme: Theme,
    pub screen: Screen,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub prompt: Option<Prompt>,

    /// Question being composed. Cleared only once an answer arrives.
    pub question: TextInput,
    pub key_input: TextInput,
    pub lookup: Lookup,
    /// Local files sent to the backend and not yet loaded.
    pub loading_local: usize,
    pub previews: HashMap<DocumentId, PreviewState>,

    /// Row in the documents sidebar (0 = most recent).
    pub doc_cursor: usize,
    /// Lines scrolled up from the bottom of the chat.
    pub chat_scroll: u16,

    pub activity: ActivityLog,
    /// Dismissible error (failed request, failed load).
    pub banner: Option<String>,
    /// One-shot feedback for the footer (copied, saved, rejected input).
    pub status_message: Option<String>,

    pub show_help: bool,
    pub confirm_quit: bool,
    pub should_quit: bool,
    pub tick: usize,
    /// Height of the visible list area (set on resize, used for page up/down).
    pub visible_rows: usize,

    pub file_picker: FilePickerState,
    pub export_state: ExportState,
    /// Channel to send commands to the backend task.
    pub backend_cmd_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            session: Session::new(),
            theme: Theme::by_name(&config.theme),
            config,
            screen: Screen::Main,
            focus: Focus::Documents,
            input_mode: InputMode::Normal,
            prompt: None,
            question: TextInput::default(),
            key_input: TextInput::default(),
            lookup: Lookup::Idle,
            loading_local: 0,
            previews: HashMap::new(),
            doc_cursor: 0,
            chat_scroll: 0,
            activity: ActivityLog::default(),
            banner: None,
            status_message: None,
            show_help: false,
            confirm_quit: false,
            should_quit: false,
            tick: 0,
            visible_rows: 20,
            file_picker: FilePickerState::new(),
            export_state: ExportState::default(),
            backend_cmd_tx: None,
        }
    }

    /// Document shown at `doc_cursor` in the sidebar (most recent first).
    pub fn document_at_cursor(&self) -> Option<&std::sync::Arc<DocumentHandle>> {
        self.session.registry().list().nth(self.doc_cursor)
    }

    /// Whether a fetch-by-key request is in flight.
    pub fn is_looking_up(&self) -> bool {
        matches!(self.lookup, Lookup::Loading(_))
    }

    /// Queue local PDFs for loading. Non-PDF paths are rejected here, before
    /// anything reaches the gateway.
    pub fn open_paths(&mut self, paths: Vec<PathBuf>) {
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            if let Err(e) = docqa_core::gateway::validate_pdf_name(&name) {
                self.activity.warn(e.to_string());
                self.banner = Some(e.to_string());
                continue;
            }
            if self.send_command(BackendCommand::OpenLocal { path }) {
                self.loading_local += 1;
                self.activity.info(format!("Opening {name}"));
            }
        }
    }

    /// Send a command to the backend. Returns false if there is no backend.
    fn send_command(&mut self, cmd: BackendCommand) -> bool {
        match &self.backend_cmd_tx {
            Some(tx) if tx.send(cmd).is_ok() => true,
            _ => {
                self.activity.warn("Backend is not running");
                false
            }
        }
    }

    /// Cycle theme: hacker -> modern -> hacker.
    fn cycle_theme(&mut self) {
        let name = match self.config.theme.as_str() {
            "hacker" => "modern",
            _ => "hacker",
        };
        self.config.theme = name.to_string();
        self.theme = Theme::by_name(name);
    }

    /// Dismiss the error banner and acknowledge any pipeline failure.
    fn dismiss_banner(&mut self) {
        self.banner = None;
        self.session.acknowledge_error();
    }

    /// Render the current screen.
    pub fn view(&mut self, f: &mut ratatui::Frame) {
        let area = f.area();

        if self.screen == Screen::FilePicker {
            crate::view::file_picker::render_in(f, self, area);
            if self.show_help {
                crate::view::help::render(f, &self.theme);
            }
            if self.confirm_quit {
                crate::view::quit_confirm::render(f, &self.theme);
            }
            return;
        }

        let banner_height = if self.banner.is_some() { 3 } else { 0 };
        let [header_area, banner_area, body_area, activity_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(8),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .areas(area);

        crate::view::banner::render_header(f, self, header_area);
        if let Some(message) = &self.banner {
            crate::view::banner::render_error(f, &self.theme, message, banner_area);
        }

        let sidebar_width = if body_area.width > 120 {
            36
        } else {
            (body_area.width / 4).max(24)
        };
        let [sidebar_area, right_area] =
            Layout::horizontal([Constraint::Length(sidebar_width), Constraint::Min(30)])
                .areas(body_area);
        let [viewer_area, chat_area] =
            Layout::vertical([Constraint::Percentage(35), Constraint::Min(6)]).areas(right_area);

        self.visible_rows = sidebar_area.height.saturating_sub(2) as usize;

        crate::view::sidebar::render(f, self, sidebar_area);
        crate::view::viewer::render(f, self, viewer_area);
        crate::view::chat::render(f, self, chat_area);
        crate::view::activity::render(f, self, activity_area);
        render_footer(f, self, footer_area);

        if self.prompt == Some(Prompt::FetchKey) {
            crate::view::key_prompt::render(f, self);
        }
        if self.export_state.active {
            crate::view::export::render(f, self);
        }
        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
        if self.confirm_quit {
            crate::view::quit_confirm::render(f, &self.theme);
        }
    }
}

fn render_footer(f: &mut ratatui::Frame, app: &App, area: Rect) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let hints = match (app.input_mode.clone(), app.focus) {
        (InputMode::TextInput, _) => " Enter:send  Esc:stop typing  \u{2190}/\u{2192}:move cursor",
        (InputMode::Normal, Focus::Documents) => {
            " j/k:move  Enter:select  a:add PDF  /:fetch by name  Tab:chat  n:new chat  ?:help  q:quit"
        }
        (InputMode::Normal, Focus::Chat) => {
            " i:ask  j/k:scroll  y:copy answer  e:export  n:new chat  Tab:documents  ?:help  q:quit"
        }
    };
    let mut spans = vec![Span::styled(hints, app.theme.footer_style())];
    if let Some(msg) = &app.status_message {
        spans.push(Span::styled(
            format!("  \u{2502} {msg}"),
            ratatui::style::Style::default().fg(app.theme.active),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests;
