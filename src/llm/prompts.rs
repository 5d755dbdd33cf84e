use crate::models::{Category, FileRecord};

const EXCERPT_CAP_IN_PROMPT: usize = 2 * 1024;

fn category_list() -> String {
    Category::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
}

fn capped_excerpt(record: &FileRecord) -> &str {
    match &record.content_excerpt {
        Some(s) => {
            let mut end = s.len().min(EXCERPT_CAP_IN_PROMPT);
            while end > 0 && !s.is_char_boundary(end) {
                end -= 1;
            }
            &s[..end]
        }
        None => "",
    }
}

/// A classification prompt containing filename, extension, size, mtime, a
/// capped content excerpt, the closed category set, and the strict response
/// schema. Instructs the model to fall back to the inbox category when its
/// own confidence would be below the minimum.
pub fn build_classification_prompt(record: &FileRecord, min_confidence: u8) -> String {
    format!(
        r#"You are a file classification assistant. Classify the file below into exactly one of these categories: {categories}.

Filename: {filename}
Extension: {extension}
Size (bytes): {size}
Modified: {mtime}
Content excerpt:
---
{excerpt}
---

Respond with a single JSON object, and nothing else, matching exactly this schema:
{{"category": string, "subcategory": string, "subject": string, "year": integer, "suggested_name": string, "confidence": integer 0-100, "rationale": string}}

If your confidence would be below {min_confidence}, set "category" to "90_Inbox_Organizar" and explain why in "rationale"."#,
        categories = category_list(),
        filename = record.filename(),
        extension = record.extension,
        size = record.size,
        mtime = record.mtime.format("%Y-%m-%d %H:%M:%S"),
        excerpt = capped_excerpt(record),
        min_confidence = min_confidence,
    )
}

/// Reissued on a soft error: restates the schema and the specific
/// validation failure, reusing the same filename/excerpt.
pub fn build_correction_prompt(record: &FileRecord, min_confidence: u8, validation_error: &str) -> String {
    format!(
        "{}\n\nYour previous response was invalid: {}. Respond again with ONLY the corrected JSON object matching the schema above.",
        build_classification_prompt(record, min_confidence),
        validation_error
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    #[test]
    fn prompt_contains_all_six_categories() {
        let record = FileRecord {
            path: PathBuf::from("report.pdf"),
            size: 1024,
            mtime: Utc::now(),
            ctime: Utc::now(),
            sha256: None,
            extension: ".pdf".into(),
            mime: None,
            content_excerpt: Some("quarterly revenue figures".into()),
        };
        let prompt = build_classification_prompt(&record, 85);
        for c in Category::ALL {
            assert!(prompt.contains(c.as_str()));
        }
        assert!(prompt.contains("report.pdf"));
    }
}
