use std::path::Path;

/// Concatenated paragraph text from a Word-processing archive.
pub async fn extract(path: &Path) -> Option<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path).ok()?;
        let docx = docx_rs::read_docx(&bytes).ok()?;
        let mut out = String::new();
        for child in &docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                for run_child in &p.children {
                    if let docx_rs::ParagraphChild::Run(run) = run_child {
                        for rc in &run.children {
                            if let docx_rs::RunChild::Text(t) = rc {
                                out.push_str(&t.text);
                            }
                        }
                    }
                }
                out.push('\n');
            }
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
