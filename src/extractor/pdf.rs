use std::path::Path;

/// First `max_pages` of textual content, each prefixed with a page marker.
/// `pdf-extract` does not expose per-page boundaries directly, so pages are
/// approximated by splitting on form-feed characters, which the library
/// emits between pages.
pub async fn extract(path: &Path, max_pages: usize) -> Option<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let text = pdf_extract::extract_text(&path).ok()?;
        let pages: Vec<&str> = text.split('\x0c').collect();
        let mut out = String::new();
        for (i, page) in pages.iter().take(max_pages).enumerate() {
            out.push_str(&format!("--- page {} ---\n", i + 1));
            out.push_str(page.trim());
            out.push('\n');
        }
        if out.trim().is_empty() {
            None
        } else {
            Some(out)
        }
    })
    .await
    .ok()
    .flatten()
}
