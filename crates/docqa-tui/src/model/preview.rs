/// Best-effort text preview of a PDF for the viewer pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPreview {
    pub pages: usize,
    /// Text of the first page that has any, trimmed to a readable size.
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Loading,
    Ready(PdfPreview),
    Unavailable(String),
}

const MAX_EXCERPT_CHARS: usize = 4000;
const MAX_PAGES_SCANNED: usize = 3;

/// Parse `bytes` with lopdf and pull out the page count and some text.
///
/// Never used to reject a document: callers show "preview unavailable" on error.
pub fn extract(bytes: &[u8]) -> Result<PdfPreview, String> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| format!("not a readable PDF: {e}"))?;
    let pages = doc.get_pages();

    let mut excerpt = String::new();
    for &page_num in pages.keys().take(MAX_PAGES_SCANNED) {
        match doc.extract_text(&[page_num]) {
            Ok(text) if !text.trim().is_empty() => {
                excerpt = text;
                break;
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(page = page_num, error = %e, "no text on page"),
        }
    }

    Ok(PdfPreview {
        pages: pages.len(),
        excerpt: tidy(&excerpt),
    })
}

/// Collapse runs of blank lines and cap the length.
fn tidy(text: &str) -> String {
    let mut out = String::new();
    let mut blank = false;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !blank && !out.is_empty() {
                out.push('\n');
            }
            blank = true;
            continue;
        }
        blank = false;
        out.push_str(line);
        out.push('\n');
    }
    if out.chars().count() > MAX_EXCERPT_CHARS {
        out = out.chars().take(MAX_EXCERPT_CHARS).collect();
        out.push('\u{2026}');
    }
    out.trim_end().to_string()
}
