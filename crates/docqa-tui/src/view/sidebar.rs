use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use docqa_core::Origin;

use crate::app::{App, Focus};
use crate::view::{spinner_char, truncate};

/// Render the documents list, most recently added first.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Documents;
    let active_id = app.session.registry().active_id();
    let name_width = area.width.saturating_sub(6) as usize;

    let mut items: Vec<ListItem> = app
        .session
        .registry()
        .list()
        .map(|doc| {
            let is_active = Some(doc.id()) == active_id;
            let marker = if is_active { "\u{25B6} " } else { "  " };
            let origin = match doc.origin() {
                Origin::Local => "",
                Origin::Remote { .. } => " \u{2601}",
            };
            let style = if is_active {
                Style::default()
                    .fg(theme.active)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(truncate(doc.name(), name_width), style),
                Span::styled(origin, Style::default().fg(theme.dim)),
            ]))
        })
        .collect();

    if app.loading_local > 0 {
        items.push(ListItem::new(Line::from(Span::styled(
            format!("{} opening {}\u{2026}", spinner_char(app.tick), app.loading_local),
            Style::default().fg(theme.spinner),
        ))));
    }
    if items.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            "  a: add a PDF",
            Style::default().fg(theme.dim),
        ))));
    }

    let title = format!(" Documents ({}) ", app.session.registry().len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.pane_border(focused))
                .title(title),
        )
        .highlight_style(theme.highlight_style());

    let mut state = ListState::default();
    if focused && !app.session.registry().is_empty() {
        state.select(Some(app.doc_cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}
