//! Recursive traversal; size/path/extension filters; per-file hash; emits
//! `FileRecord`. Pure observation — no file is ever opened for write.

use crate::models::FileRecord;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

const EXCLUDED_DIR_NAMES: &[&str] = &[
    ".git", ".svn", ".hg", ".bzr",
    ".vscode", ".idea",
    "__pycache__", ".pytest_cache", ".mypy_cache", ".tox", ".nox", "node_modules", ".npm", ".yarn",
    "venv", ".venv", "env", ".env",
    "build", "dist", ".eggs",
    "$RECYCLE.BIN", "System Volume Information", "WindowsApps", ".Trash", ".cache", ".dropbox", ".dropbox.cache",
    ".ssh", ".gnupg", ".aws", ".azure", ".terraform",
];

const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".exe", ".dll", ".sys", ".msi", ".com", ".scr",
    ".bat", ".cmd", ".ps1", ".sh", ".bash",
    ".lnk", ".inf", ".reg", ".ini",
    ".tmp", ".temp", ".bak", ".swp", ".swo", ".lock", ".db-journal", ".db-wal", ".db-shm",
];

const HASH_CHUNK_SIZE: usize = 8 * 1024;
const DEFAULT_MIN_SIZE_BYTES: u64 = 1024;

#[derive(Debug, Default, Clone, Copy)]
pub struct ScanStats {
    pub files_scanned: u64,
    pub files_excluded: u64,
    pub dirs_excluded: u64,
    pub bytes_scanned: u64,
}

pub struct Scanner {
    min_size_bytes: u64,
}

impl Default for Scanner {
    fn default() -> Self {
        Scanner {
            min_size_bytes: DEFAULT_MIN_SIZE_BYTES,
        }
    }
}

impl Scanner {
    pub fn with_min_size_bytes(mut self, bytes: u64) -> Self {
        self.min_size_bytes = bytes;
        self
    }

    fn path_excluded(path: &Path) -> bool {
        path.components().any(|c| {
            let s = c.as_os_str().to_string_lossy();
            EXCLUDED_DIR_NAMES.iter().any(|d| d.eq_ignore_ascii_case(&s))
        })
    }

    fn extension_excluded(ext: &str) -> bool {
        EXCLUDED_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    fn normalized_extension(path: &Path) -> String {
        path.extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }

    fn hash_file(path: &Path) -> Option<String> {
        let mut file = std::fs::File::open(path).ok()?;
        let mut hasher = Sha256::new();
        let mut buf = [0u8; HASH_CHUNK_SIZE];
        loop {
            let n = file.read(&mut buf).ok()?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Some(hex::encode(hasher.finalize()))
    }

    /// Given a root directory, lazily yields FileRecords for every file that
    /// passes exclusion filters. `jwalk::WalkDir`'s iterator is itself a
    /// streaming iterator as long as it is not collected up front, so memory
    /// here stays bounded to one entry (and, downstream, one excerpt) at a
    /// time.
    pub fn scan(
        &self,
        root: &Path,
    ) -> crate::error::Result<(impl Iterator<Item = FileRecord> + '_, ScanStatsHandle)> {
        if !root.exists() {
            return Err(crate::error::OrganizerError::MissingRoot(root.to_path_buf()));
        }

        let stats = ScanStatsHandle::default();
        let stats_for_iter = stats.clone();
        let stats_for_prune = stats.clone();
        let min_size = self.min_size_bytes;

        let walker = jwalk::WalkDir::new(root)
            .skip_hidden(false)
            .follow_links(false)
            .process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|entry_result| {
                    if let Ok(entry) = entry_result {
                        if entry.file_type().is_dir() && Self::path_excluded(&entry.path()) {
                            stats_for_prune.inc_dirs_excluded();
                            return false;
                        }
                    }
                    true
                });
            });

        let iter = walker.into_iter().filter_map(move |entry_result| {
            let entry = match entry_result {
                Ok(e) => e,
                Err(_) => {
                    stats_for_iter.inc_files_excluded();
                    return None;
                }
            };

            if !entry.file_type().is_file() {
                return None;
            }

            let path = entry.path();
            if Self::path_excluded(&path) {
                stats_for_iter.inc_files_excluded();
                return None;
            }

            let ext = Self::normalized_extension(&path);
            if Self::extension_excluded(&ext) {
                stats_for_iter.inc_files_excluded();
                return None;
            }

            let meta = match std::fs::metadata(&path) {
                Ok(m) => m,
                Err(_) => {
                    stats_for_iter.inc_files_excluded();
                    return None;
                }
            };

            let size = meta.len();
            if size < min_size {
                stats_for_iter.inc_files_excluded();
                return None;
            }

            let mtime: DateTime<Utc> = meta.modified().map(DateTime::from).unwrap_or_else(|_| Utc::now());
            let ctime: DateTime<Utc> = meta.created().map(DateTime::from).unwrap_or(mtime);
            let sha256 = Self::hash_file(&path);

            stats_for_iter.inc_files_scanned(size);

            Some(FileRecord {
                path,
                size,
                mtime,
                ctime,
                sha256,
                extension: ext,
                mime: None,
                content_excerpt: None,
            })
        });

        Ok((iter, stats))
    }
}

/// Shared counters updated as the lazy scan iterator is driven.
#[derive(Clone, Default)]
pub struct ScanStatsHandle(std::sync::Arc<std::sync::Mutex<ScanStats>>);

impl ScanStatsHandle {
    fn inc_files_scanned(&self, bytes: u64) {
        let mut s = self.0.lock().unwrap();
        s.files_scanned += 1;
        s.bytes_scanned += bytes;
    }

    fn inc_files_excluded(&self) {
        self.0.lock().unwrap().files_excluded += 1;
    }

    fn inc_dirs_excluded(&self) {
        self.0.lock().unwrap().dirs_excluded += 1;
    }

    pub fn snapshot(&self) -> ScanStats {
        *self.0.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn excludes_vcs_dirs_and_small_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), vec![0u8; 4096]).unwrap();
        fs::write(dir.path().join("tiny.txt"), b"hi").unwrap();
        fs::write(dir.path().join("real.txt"), vec![b'a'; 2048]).unwrap();

        let scanner = Scanner::default();
        let (iter, stats) = scanner.scan(dir.path()).unwrap();
        let records: Vec<_> = iter.collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename(), "real.txt");
        let snapshot = stats.snapshot();
        assert!(snapshot.files_excluded >= 1);
        assert_eq!(snapshot.dirs_excluded, 1);
    }

    #[test]
    fn missing_root_is_fatal() {
        let scanner = Scanner::default();
        let err = scanner.scan(Path::new("/does/not/exist/anywhere")).unwrap_err();
        matches!(err, crate::error::OrganizerError::MissingRoot(_));
    }

    #[test]
    fn computes_sha256_for_readable_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), vec![b'a'; 2048]).unwrap();
        let scanner = Scanner::default();
        let (iter, _stats) = scanner.scan(dir.path()).unwrap();
        let records: Vec<_> = iter.collect();
        assert!(records[0].sha256.is_some());
    }
}
