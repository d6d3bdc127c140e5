use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use docqa_core::{QueryStatus, Role};

use crate::app::{App, Focus, InputMode, Prompt};
use crate::view::spinner_char;

/// Render the conversation for the active document plus the question input.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let [log_area, input_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    let mut lines: Vec<Line> = Vec::new();
    for turn in app.session.log().turns() {
        let (who, color) = match turn.role {
            Role::Question => ("You", theme.role_color(Role::Question)),
            Role::Answer => ("Answer", theme.role_color(Role::Answer)),
        };
        lines.push(Line::from(Span::styled(
            format!("{who}:"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for text_line in turn.text.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {text_line}"),
                Style::default().fg(theme.text),
            )));
        }
        if let Some(sources) = turn.sources.as_deref().filter(|s| !s.is_empty()) {
            lines.push(Line::from(Span::styled(
                format!("  sources: {sources}"),
                Style::default().fg(theme.sources),
            )));
        }
        lines.push(Line::from(""));
    }
    if app.session.status() == QueryStatus::Pending {
        lines.push(Line::from(Span::styled(
            format!("{} thinking\u{2026}", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        )));
    } else if lines.is_empty() && app.session.active().is_some() {
        lines.push(Line::from(Span::styled(
            "Ask a question about this document (i).",
            Style::default().fg(theme.dim),
        )));
    }

    // Keep the newest turns in view; chat_scroll counts lines up from the bottom.
    let inner_height = log_area.height.saturating_sub(2);
    let inner_width = log_area.width.saturating_sub(2).max(1) as usize;
    let wrapped: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    let offset = scroll_offset(wrapped, inner_height, app.chat_scroll);

    let focused = app.focus == Focus::Chat;
    let log = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.pane_border(focused))
                .title(" Conversation "),
        )
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(log, log_area);

    render_input(f, app, input_area);
}

/// Top line to show, given `from_bottom` lines scrolled up from the newest.
fn scroll_offset(wrapped: usize, height: u16, from_bottom: u16) -> u16 {
    let max_scroll = u16::try_from(wrapped)
        .unwrap_or(u16::MAX)
        .saturating_sub(height);
    max_scroll.saturating_sub(from_bottom.min(max_scroll))
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let editing = app.input_mode == InputMode::TextInput && app.prompt == Some(Prompt::Question);
    let pending = app.session.status() == QueryStatus::Pending;

    let title = if pending {
        " Question (waiting for answer) "
    } else if editing {
        " Question (Enter to send) "
    } else {
        " Question (i to type) "
    };
    let text_style = if editing {
        Style::default().fg(theme.text)
    } else {
        Style::default().fg(theme.dim)
    };

    // Horizontal scroll so the cursor stays visible on long questions
    let inner_width = area.width.saturating_sub(2) as usize;
    let text = app.question.text();
    let cursor_col = text[..app.question.cursor()].chars().count();
    let skip = cursor_col.saturating_sub(inner_width.saturating_sub(1));
    let visible: String = text.chars().skip(skip).collect();

    let input = Paragraph::new(Line::from(Span::styled(visible, text_style))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.pane_border(editing))
            .title(title),
    );
    f.render_widget(input, area);

    if editing {
        let x = area.x + 1 + (cursor_col - skip) as u16;
        f.set_cursor_position(Position::new(x, area.y + 1));
    }
}
