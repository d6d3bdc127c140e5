//! Transcript export for the current conversation.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::conversation::{Role, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Json,
    Text,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[Self::Markdown, Self::Json, Self::Text]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Json => "JSON",
            Self::Text => "Plain text",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

#[derive(Serialize)]
struct JsonTranscript<'a> {
    document: &'a str,
    exported_at: String,
    turns: &'a [Turn],
}

/// Render `turns` about `document` in `format`.
pub fn render(
    document: &str,
    turns: &[Turn],
    format: ExportFormat,
    exported_at: DateTime<Local>,
) -> String {
    match format {
        ExportFormat::Markdown => render_markdown(document, turns, exported_at),
        ExportFormat::Json => render_json(document, turns, exported_at),
        ExportFormat::Text => render_text(document, turns),
    }
}

/// Write the transcript to `path`, timestamped now.
pub fn export_transcript(
    document: &str,
    turns: &[Turn],
    format: ExportFormat,
    path: &Path,
) -> std::io::Result<()> {
    let content = render(document, turns, format, Local::now());
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    tracing::debug!(path = %path.display(), turns = turns.len(), "transcript exported");
    Ok(())
}

/// Default file name: `<stem>-chat-<YYYYmmdd-HHMMSS>.<ext>`.
pub fn default_file_name(document: &str, format: ExportFormat, at: DateTime<Local>) -> String {
    let stem = Path::new(document)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    format!(
        "{stem}-chat-{}.{}",
        at.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

fn render_markdown(document: &str, turns: &[Turn], at: DateTime<Local>) -> String {
    let mut out = format!(
        "# Conversation: {document}\n\n_Exported {}_\n\n",
        at.format("%Y-%m-%d %H:%M")
    );
    for turn in turns {
        match turn.role {
            Role::Question => {
                out.push_str("**Q:** ");
                out.push_str(&turn.text);
                out.push_str("\n\n");
            }
            Role::Answer => {
                for line in turn.text.lines() {
                    out.push_str("> ");
                    out.push_str(line);
                    out.push('\n');
                }
                if let Some(sources) = turn.sources.as_deref().filter(|s| !s.is_empty()) {
                    out.push_str(">\n> _Sources:_ ");
                    out.push_str(sources);
                    out.push('\n');
                }
                out.push('\n');
            }
        }
    }
    out
}

fn render_json(document: &str, turns: &[Turn], at: DateTime<Local>) -> String {
    let doc = JsonTranscript {
        document,
        exported_at: at.to_rfc3339(),
        turns,
    };
    // Serializing plain strings cannot fail.
    serde_json::to_string_pretty(&doc).unwrap_or_default()
}

fn render_text(document: &str, turns: &[Turn]) -> String {
    let mut out = format!("{document}\n{}\n\n", "=".repeat(document.chars().count()));
    for turn in turns {
        let prefix = match turn.role {
            Role::Question => "You",
            Role::Answer => "Answer",
        };
        out.push_str(&format!("{prefix}: {}\n", turn.text));
        if let Some(sources) = &turn.sources {
            out.push_str(&format!("  sources: {sources}\n"));
        }
        out.push('\n');
    }
    out
}
