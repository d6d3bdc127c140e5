use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let popup = centered_rect(64, 34, f.area());

    let lines = vec![
        Line::from(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(theme.header_fg)
                .bg(theme.header_bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section_header("Navigation", theme),
        key_line("j / \u{2193}", "Move down / scroll chat down", theme),
        key_line("k / \u{2191}", "Move up / scroll chat up", theme),
        key_line("Ctrl+d / PgDn", "Page down", theme),
        key_line("Ctrl+u / PgUp", "Page up", theme),
        key_line("g / G", "Top / bottom", theme),
        key_line("Tab", "Switch documents / chat pane", theme),
        key_line("Enter", "Select document / start typing", theme),
        key_line("Esc", "Dismiss error / go back", theme),
        Line::from(""),
        section_header("Documents", theme),
        key_line("a / o", "Pick PDFs from disk", theme),
        key_line("/", "Fetch an uploaded PDF by name", theme),
        Line::from(""),
        section_header("Conversation", theme),
        key_line("i", "Type a question", theme),
        key_line("n", "New chat (keeps documents)", theme),
        key_line("y", "Copy last answer (OSC 52)", theme),
        key_line("e", "Export transcript", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("t", "Cycle theme", theme),
        key_line("Ctrl+s", "Save settings", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q", "Quit", theme),
        key_line("Ctrl+c", "Force quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<16}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
