use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use docqa_core::transcript::ExportFormat;

use crate::app::{App, Prompt};
use crate::model::text_input::TextInput;
use crate::view::centered_rect;

/// State for the transcript export modal.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub format: ExportFormat,
    /// Output path without extension; the format's extension is appended.
    pub output_path: String,
    pub cursor: usize, // 0=format, 1=path, 2=confirm
    pub path_input: TextInput,
    pub message: Option<String>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self {
            active: false,
            format: ExportFormat::Markdown,
            output_path: "docqa-chat".to_string(),
            cursor: 0,
            path_input: TextInput::default(),
            message: None,
        }
    }
}

/// Render the export modal overlay.
pub fn render(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let export = &app.export_state;
    let editing_path = app.prompt == Some(Prompt::ExportPath);
    let popup = centered_rect(64, 13, f.area());

    let mut lines = vec![
        Line::from(Span::styled(
            " Export Conversation ",
            Style::default()
                .fg(theme.header_fg)
                .bg(theme.header_bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let fmt_indicator = if export.cursor == 0 { "> " } else { "  " };
    lines.push(Line::from(vec![
        Span::styled(
            format!("  {}Format:  ", fmt_indicator),
            Style::default().fg(theme.text),
        ),
        Span::styled(export.format.label(), Style::default().fg(theme.active)),
    ]));

    let path_indicator = if export.cursor == 1 { "> " } else { "  " };
    let (path_display, path_style) = if editing_path {
        (
            format!("{}\u{2588}", export.path_input.text()),
            Style::default().fg(theme.active),
        )
    } else {
        (export.output_path.clone(), Style::default().fg(theme.dim))
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("  {}Output:  ", path_indicator),
            Style::default().fg(theme.text),
        ),
        Span::styled(path_display, path_style),
        Span::styled(
            format!(".{}", export.format.extension()),
            Style::default().fg(theme.dim),
        ),
    ]));

    lines.push(Line::from(""));

    let confirm_style = if export.cursor == 2 {
        Style::default()
            .fg(theme.header_fg)
            .bg(theme.active)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.active)
    };
    lines.push(Line::from(vec![
        Span::raw("          "),
        Span::styled(" Export ", confirm_style),
    ]));

    if let Some(msg) = &export.message {
        let color = if msg.starts_with("Saved") {
            theme.ok
        } else {
            theme.error
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", msg),
            Style::default().fg(color),
        )));
    }

    lines.push(Line::from(""));
    let hint = if editing_path {
        "  Type filename, Enter:confirm, Esc:cancel"
    } else {
        "  j/k:navigate  Enter:select/cycle  Esc:close"
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(theme.dim))));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.active))
            .title(" Export "),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
