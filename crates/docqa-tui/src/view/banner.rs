use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::App;
use crate::theme::Theme;
use crate::view::spinner_char;

/// One-line title bar: app name, active document, pipeline status, storage.
pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let status = app.session.status();

    let mut spans = vec![
        Span::styled(" DocQA ", theme.header_style()),
        Span::raw(" "),
    ];
    match app.session.active() {
        Some(doc) => spans.push(Span::styled(
            doc.name().to_string(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        None => spans.push(Span::styled("no document", Style::default().fg(theme.dim))),
    }

    spans.push(Span::styled("  \u{2502} ", Style::default().fg(theme.dim)));
    let status_label = if status == docqa_core::QueryStatus::Pending {
        format!("{} {}", spinner_char(app.tick), status.label())
    } else {
        status.label().to_string()
    };
    spans.push(Span::styled(
        status_label,
        Style::default().fg(theme.status_color(status)),
    ));

    spans.push(Span::styled("  \u{2502} ", Style::default().fg(theme.dim)));
    spans.push(Span::styled(
        format!("storage: {}", app.config.storage.label()),
        Style::default().fg(theme.dim),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Dismissible error strip under the header.
pub fn render_error(f: &mut Frame, theme: &Theme, message: &str, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            " \u{2717} ",
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        ),
        Span::styled(message.to_string(), Style::default().fg(theme.error)),
        Span::styled("  (Esc to dismiss)", Style::default().fg(theme.dim)),
    ]);
    let paragraph = Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.error)),
        );
    f.render_widget(paragraph, area);
}
