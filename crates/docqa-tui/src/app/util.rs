use std::io::Write;

/// Copy text to the system clipboard via OSC 52 escape sequence.
/// Works in Ghostty, iTerm2, kitty, WezTerm, and most modern terminals.
pub(super) fn osc52_copy(text: &str) {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    // Write directly to stdout, bypassing the terminal backend buffer
    let _ = std::io::stdout().write_all(format!("\x1b]52;c;{}\x07", encoded).as_bytes());
    let _ = std::io::stdout().flush();
}

/// Message shown when a non-PDF file is picked.
pub(super) fn pdf_rejection(name: &str) -> String {
    docqa_core::gateway::validate_pdf_name(name)
        .err()
        .map(|e| e.to_string())
        .unwrap_or_else(|| format!("{name} could not be opened"))
}
