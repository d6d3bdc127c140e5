use crate::app::App;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// Render the tail of the activity log.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let rows = area.height.saturating_sub(1) as usize;

    let lines: Vec<Line> = app
        .activity
        .recent(rows)
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!(" {} ", entry.at.format("%H:%M:%S")),
                    Style::default().fg(theme.dim),
                ),
                Span::styled(
                    entry.message.clone(),
                    Style::default().fg(theme.level_color(entry.level)),
                ),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(theme.border_style())
            .title(" Activity "),
    );
    f.render_widget(paragraph, area);
}
