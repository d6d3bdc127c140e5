use ratatui::Frame;
use ratatui::layout::Position;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{App, Lookup};
use crate::view::{centered_rect, spinner_char};

/// Popup asking for the name of a previously uploaded PDF.
pub fn render(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let popup = centered_rect(60, 7, f.area());

    let status = match &app.lookup {
        Lookup::Idle => Line::from(Span::styled(
            "  Enter: fetch   Esc: close",
            Style::default().fg(theme.dim),
        )),
        Lookup::Loading(key) => Line::from(Span::styled(
            format!("  {} fetching {key}\u{2026}", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        )),
        Lookup::Failed(reason) => Line::from(Span::styled(
            format!("  \u{2717} {reason}"),
            Style::default().fg(theme.error),
        )),
    };

    let text = app.key_input.text();
    let lines = vec![
        Line::from(Span::styled(
            "  Name of a previously uploaded PDF:",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {text}"),
            Style::default().fg(theme.active),
        )),
        Line::from(""),
        status,
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.active))
            .title(" Fetch by name "),
    );
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);

    let cursor_col = text[..app.key_input.cursor()].chars().count() as u16;
    let x = (popup.x + 3 + cursor_col).min(popup.right().saturating_sub(2));
    f.set_cursor_position(Position::new(x, popup.y + 3));
}
