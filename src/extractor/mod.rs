//! Type-dispatched text/metadata extraction. Given a FileRecord, returns a
//! new FileRecord with `mime` populated and, when the type is understood,
//! `content_excerpt` populated. Source files are never modified.
//!
//! Dispatch is a table mapping normalized extension sets to extraction
//! functions, not a class hierarchy — each format is a capability that is
//! either present or absent, and a missing one degrades to `None` rather
//! than failing.

mod audio;
mod docx;
mod image;
mod pdf;
mod pptx;
mod text;
mod video;
mod xlsx;

use crate::models::FileRecord;
use std::path::Path;

const DEFAULT_EXCERPT_CAP: usize = 8 * 1024;
const DEFAULT_PDF_PAGES: usize = 5;
const TRUNCATED_SENTINEL: &str = "[TRUNCATED]";

#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractStats {
    pub files_processed: u64,
    pub extraction_errors: u64,
    pub excerpt_bytes: u64,
}

const TEXTUAL_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".csv", ".tsv", ".json", ".yaml", ".yml", ".xml", ".html", ".log", ".ini", ".sql",
    ".rs", ".py", ".js", ".ts", ".go", ".java", ".c", ".h", ".cpp", ".hpp", ".rb", ".toml", ".cfg",
];

pub struct Extractor {
    pub max_excerpt_bytes: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor {
            max_excerpt_bytes: DEFAULT_EXCERPT_CAP,
        }
    }
}

impl Extractor {
    pub fn with_max_excerpt_bytes(mut self, n: usize) -> Self {
        self.max_excerpt_bytes = n;
        self
    }

    /// Truncate `s` to at most `self.max_excerpt_bytes` bytes, respecting
    /// UTF-8 character boundaries, appending a sentinel when truncated.
    fn cap_excerpt(&self, s: String) -> String {
        if s.len() <= self.max_excerpt_bytes {
            return s;
        }
        let mut end = self.max_excerpt_bytes;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}{}", &s[..end], TRUNCATED_SENTINEL)
    }

    pub async fn extract(&self, record: &FileRecord, stats: &mut ExtractStats) -> FileRecord {
        let mime = mime_guess::from_path(&record.path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let ext = record.extension.as_str();
        let path = record.path.clone();

        let excerpt_result: Option<String> = if TEXTUAL_EXTENSIONS.contains(&ext) {
            text::extract(&path).await
        } else if ext == ".pdf" {
            pdf::extract(&path, DEFAULT_PDF_PAGES).await
        } else if ext == ".docx" {
            docx::extract(&path).await
        } else if ext == ".pptx" {
            pptx::extract(&path).await
        } else if matches!(ext, ".xlsx" | ".xls" | ".ods") {
            xlsx::extract(&path).await
        } else if is_image_ext(ext) {
            image::extract(&path).await
        } else if is_audio_ext(ext) {
            audio::extract(&path).await
        } else if is_video_ext(ext) {
            video::extract(&path).await
        } else {
            None
        };

        stats.files_processed += 1;
        let excerpt = excerpt_result.map(|s| {
            let capped = self.cap_excerpt(s);
            stats.excerpt_bytes += capped.len() as u64;
            capped
        });

        record.with_extraction(Some(mime), excerpt)
    }
}

fn is_image_ext(ext: &str) -> bool {
    matches!(ext, ".jpg" | ".jpeg" | ".png" | ".gif" | ".bmp" | ".webp" | ".tiff")
}

fn is_audio_ext(ext: &str) -> bool {
    matches!(ext, ".mp3" | ".flac" | ".wav" | ".m4a" | ".ogg" | ".aac")
}

fn is_video_ext(ext: &str) -> bool {
    matches!(ext, ".mp4" | ".mkv" | ".mov" | ".avi" | ".webm")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_excerpt_at_utf8_boundary() {
        let ex = Extractor::default().with_max_excerpt_bytes(3);
        // 'é' is two bytes in UTF-8; boundary must not split it
        let capped = ex.cap_excerpt("éé".to_string());
        assert!(capped.starts_with('é'));
        assert!(capped.ends_with(TRUNCATED_SENTINEL));
    }

    #[tokio::test]
    async fn unknown_extension_yields_null_excerpt() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("file.xyz");
        std::fs::write(&p, b"binary junk").unwrap();
        let record = FileRecord {
            path: p,
            size: 11,
            mtime: chrono::Utc::now(),
            ctime: chrono::Utc::now(),
            sha256: None,
            extension: ".xyz".to_string(),
            mime: None,
            content_excerpt: None,
        };
        let mut stats = ExtractStats::default();
        let out = Extractor::default().extract(&record, &mut stats).await;
        assert!(out.content_excerpt.is_none());
        assert!(out.mime.is_some());
    }
}
