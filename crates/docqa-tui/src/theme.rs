use ratatui::style::{Color, Modifier, Style};

use docqa_core::{QueryStatus, Role};

/// Color theme for the TUI.
pub struct Theme {
    pub question: Color,
    pub answer: Color,
    pub sources: Color,
    pub error: Color,
    pub ok: Color,
    pub warn: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub border_focused: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    pub fn by_name(name: &str) -> Self {
        match name {
            "modern" => Self::modern(),
            _ => Self::hacker(),
        }
    }

    /// Hacker-green terminal theme.
    pub fn hacker() -> Self {
        Self {
            question: Color::Cyan,
            answer: Color::Rgb(0, 210, 0),
            sources: Color::DarkGray,
            error: Color::Red,
            ok: Color::Rgb(0, 210, 0),
            warn: Color::Yellow,

            header_fg: Color::Black,
            header_bg: Color::Rgb(0, 210, 0),
            border: Color::DarkGray,
            border_focused: Color::Rgb(0, 210, 0),
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::Rgb(30, 50, 30),
            active: Color::Cyan,
            spinner: Color::Cyan,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
        }
    }

    /// Modern theme: white text, electric blue accents, dark blue header.
    pub fn modern() -> Self {
        Self {
            question: Color::Rgb(60, 140, 255),
            answer: Color::White,
            sources: Color::Rgb(120, 120, 140),
            error: Color::Rgb(255, 80, 80),
            ok: Color::Rgb(0, 200, 80),
            warn: Color::Rgb(255, 200, 0),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            border_focused: Color::Rgb(60, 140, 255),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 80),
            active: Color::Rgb(60, 140, 255),
            spinner: Color::Rgb(60, 140, 255),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    pub fn role_color(&self, role: Role) -> Color {
        match role {
            Role::Question => self.question,
            Role::Answer => self.answer,
        }
    }

    pub fn status_color(&self, status: QueryStatus) -> Color {
        match status {
            QueryStatus::Idle => self.dim,
            QueryStatus::Pending => self.spinner,
            QueryStatus::Succeeded => self.ok,
            QueryStatus::Failed => self.error,
        }
    }

    pub fn level_color(&self, level: tracing::Level) -> Color {
        match level {
            tracing::Level::ERROR => self.error,
            tracing::Level::WARN => self.warn,
            tracing::Level::INFO => self.text,
            _ => self.dim,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Border for a pane, brighter when it has focus.
    pub fn pane_border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            self.border_style()
        }
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
