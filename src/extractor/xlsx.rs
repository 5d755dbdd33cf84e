use calamine::{open_workbook_auto, Reader};
use std::path::Path;

const MAX_SHEETS: usize = 5;
const MAX_BODY_ROWS: usize = 10;

/// For each of at most five sheets, the column names and up to ten body rows,
/// formatted for readability.
pub async fn extract(path: &Path) -> Option<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut workbook = open_workbook_auto(&path).ok()?;
        let sheet_names: Vec<String> = workbook.sheet_names().iter().take(MAX_SHEETS).cloned().collect();

        let mut out = String::new();
        for name in &sheet_names {
            let range = match workbook.worksheet_range(name) {
                Ok(r) => r,
                Err(_) => continue,
            };
            let mut rows = range.rows();
            out.push_str(&format!("--- sheet {} ---\n", name));
            if let Some(header) = rows.next() {
                let cols: Vec<String> = header.iter().map(|c| c.to_string()).collect();
                out.push_str(&cols.join(" | "));
                out.push('\n');
            }
            for row in rows.take(MAX_BODY_ROWS) {
                let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                out.push_str(&cells.join(" | "));
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
