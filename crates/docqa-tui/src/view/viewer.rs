use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use docqa_core::Origin;

use crate::app::App;
use crate::model::preview::PreviewState;
use crate::view::{format_bytes, spinner_char};

/// Viewer pane for the active document: metadata, locator and a text excerpt.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Viewer ");

    let Some(doc) = app.session.active() else {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No document open.",
                Style::default().fg(theme.dim),
            )),
            Line::from(Span::styled(
                "  Press a to pick a PDF or / to fetch one by name.",
                Style::default().fg(theme.dim),
            )),
        ])
        .block(block);
        f.render_widget(hint, area);
        return;
    };

    let label = Style::default().fg(theme.dim);
    let origin = match doc.origin() {
        Origin::Local => "local file".to_string(),
        Origin::Remote { key } => format!("fetched as {key}"),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            doc.name().to_string(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("size: ", label),
            Span::styled(format_bytes(doc.len() as u64), Style::default().fg(theme.text)),
            Span::styled("  source: ", label),
            Span::styled(origin, Style::default().fg(theme.text)),
        ]),
        Line::from(vec![
            Span::styled("open: ", label),
            Span::styled(doc.url(), Style::default().fg(theme.active)),
        ]),
    ];

    match app.previews.get(&doc.id()) {
        Some(PreviewState::Ready(preview)) => {
            lines[1].spans.push(Span::styled("  pages: ", label));
            lines[1]
                .spans
                .push(Span::styled(preview.pages.to_string(), Style::default().fg(theme.text)));
            lines.push(Line::from(""));
            if preview.excerpt.is_empty() {
                lines.push(Line::from(Span::styled("(no extractable text)", label)));
            } else {
                for text_line in preview.excerpt.lines() {
                    lines.push(Line::from(Span::styled(
                        text_line.to_string(),
                        Style::default().fg(theme.text),
                    )));
                }
            }
        }
        Some(PreviewState::Unavailable(reason)) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("preview unavailable: {reason}"),
                Style::default().fg(theme.warn),
            )));
        }
        Some(PreviewState::Loading) | None => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("{} reading pages\u{2026}", spinner_char(app.tick)),
                Style::default().fg(theme.spinner),
            )));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
