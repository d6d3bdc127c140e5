use super::*;
use crate::action::Action;
use crate::model::preview::PdfPreview;
use crate::tui_event::{BackendEvent, LoadSource};
use docqa_core::{Answer, GatewayError, InferenceError, QueryStatus, Role, StorageBackend};

/// Create a minimal App for testing (no backend, picker in a scratch dir).
fn test_app(dir: &Path) -> App {
    let config = Config {
        storage: StorageBackend::Memory,
        ..Config::default()
    };
    let mut app = App::new(config);
    app.file_picker = FilePickerState::at(dir.to_path_buf());
    app
}

/// App wired to a channel so tests can see what it sends to the backend.
fn connected_app(dir: &Path) -> (App, mpsc::UnboundedReceiver<BackendCommand>) {
    let mut app = test_app(dir);
    let (tx, rx) = mpsc::unbounded_channel();
    app.backend_cmd_tx = Some(tx);
    (app, rx)
}

fn handle(name: &str) -> DocumentHandle {
    DocumentHandle::from_path(name, b"%PDF-1.4".to_vec(), std::env::temp_dir().join(name))
}

fn load(app: &mut App, name: &str) -> DocumentId {
    app.handle_backend_event(BackendEvent::DocumentLoaded {
        source: LoadSource::Local(std::env::temp_dir().join(name)),
        handle: handle(name),
    });
    app.session.active().map(|d| d.id()).unwrap()
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.update(Action::TextInput(ch));
    }
}

/// Compose and send a question, returning the ticket id the backend received.
fn ask(app: &mut App, rx: &mut mpsc::UnboundedReceiver<BackendCommand>, q: &str) -> u64 {
    app.update(Action::Compose);
    type_text(app, q);
    app.update(Action::InputConfirm);
    match rx.try_recv() {
        Ok(BackendCommand::Ask { ticket }) => ticket.id(),
        _ => panic!("expected an Ask command"),
    }
}

// ── Opening files ─────────────────────────────────────────────

#[test]
fn open_paths_rejects_non_pdf_before_backend() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    app.open_paths(vec![dir.path().join("notes.txt")]);
    assert!(rx.try_recv().is_err());
    assert!(app.banner.as_deref().unwrap().contains("not a PDF"));
    assert_eq!(app.loading_local, 0);
}

#[test]
fn open_paths_sends_pdf_to_backend() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    let path = dir.path().join("report.pdf");
    app.open_paths(vec![path.clone()]);
    match rx.try_recv() {
        Ok(BackendCommand::OpenLocal { path: sent }) => assert_eq!(sent, path),
        _ => panic!("expected OpenLocal"),
    }
    assert_eq!(app.loading_local, 1);
}

#[test]
fn loaded_document_becomes_active_and_clears_chat() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    load(&mut app, "a.pdf");
    let t = ask(&mut app, &mut rx, "hi");
    app.handle_backend_event(BackendEvent::AnswerSettled {
        ticket_id: t,
        result: Ok(Answer {
            text: "hello".into(),
            sources: None,
        }),
    });
    assert_eq!(app.session.log().len(), 2);

    let b = load(&mut app, "b.pdf");
    assert_eq!(app.session.active().map(|d| d.id()), Some(b));
    assert!(app.session.log().is_empty());
    assert!(matches!(app.previews.get(&b), Some(PreviewState::Loading)));
}

#[test]
fn local_load_failure_shows_banner() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    app.loading_local = 1;
    app.handle_backend_event(BackendEvent::LoadFailed {
        source: LoadSource::Local(dir.path().join("gone.pdf")),
        error: GatewayError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)),
    });
    assert_eq!(app.loading_local, 0);
    assert!(app.banner.as_deref().unwrap().contains("gone.pdf"));
    assert!(app.session.active().is_none());
}

#[test]
fn preview_for_unknown_document_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    app.handle_backend_event(BackendEvent::PreviewReady {
        document: DocumentId::new(),
        preview: Ok(PdfPreview {
            pages: 1,
            excerpt: String::new(),
        }),
    });
    assert!(app.previews.is_empty());
}

#[test]
fn preview_failure_marks_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    let id = load(&mut app, "a.pdf");
    app.handle_backend_event(BackendEvent::PreviewReady {
        document: id,
        preview: Err("encrypted".into()),
    });
    assert!(matches!(
        app.previews.get(&id),
        Some(PreviewState::Unavailable(msg)) if msg == "encrypted"
    ));
}

#[test]
fn load_and_switch_each_log_one_activity_line() {
    use tracing_subscriber::layer::SubscriberExt;

    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscriber = tracing_subscriber::registry().with(crate::logging::ActivityLayer::new(tx));
    tracing::subscriber::with_default(subscriber, || {
        let gateway = docqa_core::Gateway::new(None).unwrap();
        for name in ["a.pdf", "b.pdf"] {
            let file = docqa_core::LocalFile::from_bytes(name, b"%PDF-1.4".to_vec()).unwrap();
            app.handle_backend_event(BackendEvent::DocumentLoaded {
                source: LoadSource::Local(dir.path().join(name)),
                handle: gateway.from_local_file(file).unwrap(),
            });
        }
        app.focus = Focus::Documents;
        app.doc_cursor = 1;
        app.update(Action::DrillIn);
    });
    while let Ok(entry) = rx.try_recv() {
        app.activity.push(entry);
    }

    let mentions = |name: &str| {
        app.activity
            .recent(usize::MAX)
            .filter(|e| e.message.contains(name))
            .count()
    };
    assert_eq!(mentions("b.pdf"), 1);
    // "Loaded a.pdf" plus "Switched to a.pdf"
    assert_eq!(mentions("a.pdf"), 2);
    assert_eq!(app.activity.len(), 3);
}

// ── Asking questions ──────────────────────────────────────────

#[test]
fn compose_without_document_stays_normal() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    app.update(Action::Compose);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.status_message.is_some());
}

#[test]
fn question_shows_immediately_and_answer_clears_input() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    load(&mut app, "plan.pdf");
    let t = ask(&mut app, &mut rx, "What is covered?");

    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.session.status(), QueryStatus::Pending);
    assert_eq!(app.session.log().turns()[0].text, "What is covered?");
    // Input is kept until the answer arrives
    assert_eq!(app.question.text(), "What is covered?");

    app.handle_backend_event(BackendEvent::AnswerSettled {
        ticket_id: t,
        result: Ok(Answer {
            text: "Dental is covered.".into(),
            sources: Some("page 3".into()),
        }),
    });
    assert_eq!(app.session.log().turns()[1].role, Role::Answer);
    assert!(app.question.text().is_empty());
    assert_eq!(app.session.status(), QueryStatus::Idle);
}

#[test]
fn failed_answer_keeps_question_and_shows_banner() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    load(&mut app, "plan.pdf");
    let t = ask(&mut app, &mut rx, "X");
    app.handle_backend_event(BackendEvent::AnswerSettled {
        ticket_id: t,
        result: Err(InferenceError::Status {
            status: 500,
            message: None,
        }),
    });
    assert_eq!(app.session.log().len(), 1);
    assert_eq!(app.question.text(), "X");
    assert!(app.banner.as_deref().unwrap().contains("500"));

    // Esc dismisses the banner and returns the pipeline to idle
    app.update(Action::NavigateBack);
    assert!(app.banner.is_none());
    assert_eq!(app.session.status(), QueryStatus::Idle);
}

#[test]
fn second_question_while_pending_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    load(&mut app, "plan.pdf");
    ask(&mut app, &mut rx, "first");

    app.update(Action::Compose);
    app.question.clear();
    type_text(&mut app, "second");
    app.update(Action::InputConfirm);
    assert!(rx.try_recv().is_err());
    assert_eq!(app.session.log().len(), 1);
    assert_eq!(app.input_mode, InputMode::TextInput);
    assert_eq!(
        app.status_message.as_deref(),
        Some("Still waiting for the previous answer")
    );
}

#[test]
fn blank_question_is_refused_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    load(&mut app, "plan.pdf");
    app.update(Action::Compose);
    type_text(&mut app, "   ");
    app.update(Action::InputConfirm);
    assert!(rx.try_recv().is_err());
    assert!(app.session.log().is_empty());
    assert_eq!(app.status_message.as_deref(), Some("Type a question first"));
}

#[test]
fn switching_documents_drops_late_answer() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    load(&mut app, "a.pdf");
    load(&mut app, "b.pdf");
    let t = ask(&mut app, &mut rx, "about b");

    // Sidebar lists most recent first; row 1 is a.pdf
    app.focus = Focus::Documents;
    app.doc_cursor = 1;
    app.update(Action::DrillIn);
    assert_eq!(app.session.active().map(|d| d.name()), Some("a.pdf"));

    app.handle_backend_event(BackendEvent::AnswerSettled {
        ticket_id: t,
        result: Ok(Answer {
            text: "late".into(),
            sources: None,
        }),
    });
    assert!(app.session.log().is_empty());
    assert!(app.banner.is_none());
    assert_eq!(app.session.status(), QueryStatus::Idle);
}

#[test]
fn missing_backend_fails_question_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    load(&mut app, "a.pdf");
    app.update(Action::Compose);
    type_text(&mut app, "anyone there?");
    app.update(Action::InputConfirm);
    assert_eq!(app.session.status(), QueryStatus::Failed);
    assert!(app.banner.is_some());
}

// ── Fetch by key ──────────────────────────────────────────────

#[test]
fn fetch_by_key_failure_stays_in_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    app.update(Action::FetchByKey);
    type_text(&mut app, "missing.pdf");
    app.update(Action::InputConfirm);
    assert!(matches!(rx.try_recv(), Ok(BackendCommand::FetchRemote { key }) if key == "missing.pdf"));
    assert_eq!(app.lookup, Lookup::Loading("missing.pdf".into()));

    app.handle_backend_event(BackendEvent::LoadFailed {
        source: LoadSource::Remote("missing.pdf".into()),
        error: GatewayError::NotFound {
            key: "missing.pdf".into(),
        },
    });
    assert!(matches!(app.lookup, Lookup::Failed(_)));
    assert_eq!(app.prompt, Some(Prompt::FetchKey));
    assert!(app.session.active().is_none());
}

#[test]
fn fetch_by_key_success_closes_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = connected_app(dir.path());
    app.update(Action::FetchByKey);
    type_text(&mut app, "plan.pdf");
    app.update(Action::InputConfirm);

    app.handle_backend_event(BackendEvent::DocumentLoaded {
        source: LoadSource::Remote("plan.pdf".into()),
        handle: handle("plan.pdf"),
    });
    assert_eq!(app.lookup, Lookup::Idle);
    assert_eq!(app.prompt, None);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.key_input.text().is_empty());
    assert_eq!(app.session.active().map(|d| d.name()), Some("plan.pdf"));
}

#[test]
fn blank_key_is_not_sent() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    app.update(Action::FetchByKey);
    app.update(Action::InputConfirm);
    assert!(rx.try_recv().is_err());
    assert!(matches!(app.lookup, Lookup::Failed(_)));
}

// ── File picker ───────────────────────────────────────────────

#[test]
fn picker_lists_dirs_first_and_flags_pdfs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("a.pdf"), b"%PDF").unwrap();
    std::fs::write(dir.path().join("b.txt"), b"x").unwrap();
    let app = test_app(dir.path());

    let names: Vec<&str> = app.file_picker.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["..", "sub", "a.pdf", "b.txt"]);
    assert!(app.file_picker.entries[2].is_pdf);
    assert!(!app.file_picker.entries[3].is_pdf);
}

#[test]
fn picker_space_on_non_pdf_shows_rejection() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.txt"), b"x").unwrap();
    let mut app = test_app(dir.path());
    app.update(Action::AddFiles);
    app.file_picker.cursor = 1; // after ".."
    app.update(Action::ToggleSelect);
    assert!(app.file_picker.selected.is_empty());
    assert!(app.file_picker.message.as_deref().unwrap().contains("not a PDF"));
}

#[test]
fn picker_esc_opens_marked_pdfs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.pdf"), b"%PDF").unwrap();
    std::fs::write(dir.path().join("b.pdf"), b"%PDF").unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    app.update(Action::AddFiles);
    app.file_picker.cursor = 1;
    app.update(Action::ToggleSelect);
    app.file_picker.cursor = 2;
    app.update(Action::ToggleSelect);
    app.update(Action::NavigateBack);

    assert_eq!(app.screen, Screen::Main);
    assert_eq!(app.loading_local, 2);
    assert!(matches!(rx.try_recv(), Ok(BackendCommand::OpenLocal { .. })));
    assert!(matches!(rx.try_recv(), Ok(BackendCommand::OpenLocal { .. })));
    assert!(app.file_picker.selected.is_empty());
}

#[test]
fn picker_enter_on_pdf_opens_it() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.pdf"), b"%PDF").unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    app.update(Action::AddFiles);
    app.file_picker.cursor = 1;
    app.update(Action::DrillIn);
    assert_eq!(app.screen, Screen::Main);
    assert!(
        matches!(rx.try_recv(), Ok(BackendCommand::OpenLocal { path }) if path.ends_with("a.pdf"))
    );
}

// ── Chat actions ──────────────────────────────────────────────

#[test]
fn new_chat_keeps_documents() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    load(&mut app, "a.pdf");
    ask(&mut app, &mut rx, "q");
    app.update(Action::NewChat);
    assert!(app.session.log().is_empty());
    assert_eq!(app.session.registry().len(), 1);
}

#[test]
fn export_with_empty_log_does_not_open_modal() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    app.update(Action::Export);
    assert!(!app.export_state.active);
    assert_eq!(app.status_message.as_deref(), Some("Nothing to export yet"));
}

#[test]
fn export_writes_transcript_with_extension() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = connected_app(dir.path());
    load(&mut app, "plan.pdf");
    let t = ask(&mut app, &mut rx, "What is covered?");
    app.handle_backend_event(BackendEvent::AnswerSettled {
        ticket_id: t,
        result: Ok(Answer {
            text: "Dental.".into(),
            sources: None,
        }),
    });

    app.update(Action::Export);
    assert!(app.export_state.active);
    assert!(app.export_state.output_path.starts_with("plan-chat-"));

    let stem = dir.path().join("out");
    app.export_state.output_path = stem.display().to_string();
    app.export_state.cursor = 2;
    app.update(Action::DrillIn);

    let written = std::fs::read_to_string(dir.path().join("out.md")).unwrap();
    assert!(written.contains("**Q:** What is covered?"));
    assert!(app.export_state.message.as_deref().unwrap().starts_with("Saved"));
}

#[test]
fn export_format_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    app.export_state.active = true;
    let first = app.export_state.format;
    app.update(Action::DrillIn);
    assert_ne!(app.export_state.format, first);
}

// ── Global ────────────────────────────────────────────────────

#[test]
fn quit_needs_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    assert!(!app.update(Action::Quit));
    assert!(app.confirm_quit);
    app.update(Action::NavigateBack);
    assert!(!app.confirm_quit);
    app.update(Action::Quit);
    assert!(app.update(Action::Quit));
}

#[test]
fn force_quit_is_immediate_even_while_typing() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    load(&mut app, "a.pdf");
    app.update(Action::Compose);
    assert!(app.update(Action::ForceQuit));
}

#[test]
fn theme_cycles_and_updates_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    app.update(Action::CycleTheme);
    assert_eq!(app.config.theme, "modern");
    app.update(Action::CycleTheme);
    assert_eq!(app.config.theme, "hacker");
}

#[test]
fn sidebar_cursor_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());
    load(&mut app, "a.pdf");
    load(&mut app, "b.pdf");
    app.focus = Focus::Documents;
    for _ in 0..5 {
        app.update(Action::MoveDown);
    }
    assert_eq!(app.doc_cursor, 1);
    app.update(Action::GoTop);
    assert_eq!(app.document_at_cursor().map(|d| d.name()), Some("b.pdf"));
}
