//! Per-action filesystem operation; dry-run/apply split; per-item result;
//! manifest emission.

use crate::models::{Action, ExecutionResult, ExecutionStatus, PlanItem};
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    DryRun,
    Apply,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExecutorStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub moves: usize,
    pub copies: usize,
    pub renames: usize,
    pub skips: usize,
}

pub struct Executor;

impl Executor {
    /// Applies each item in order and returns an ExecutionResult per item.
    /// In dry-run mode every item is reported `dry-run` and the filesystem
    /// is untouched. A failed item never aborts the run.
    pub fn execute_plan(items: &[PlanItem], mode: Mode, stats: &mut ExecutorStats) -> Vec<ExecutionResult> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            stats.total += 1;
            let result = match mode {
                Mode::DryRun => ExecutionResult {
                    status: ExecutionStatus::DryRun,
                    plan_item: item.clone(),
                    error: None,
                    timestamp: Utc::now(),
                },
                Mode::Apply => Self::execute_one(item),
            };

            match result.status {
                ExecutionStatus::Success => stats.successful += 1,
                ExecutionStatus::Failed => stats.failed += 1,
                ExecutionStatus::Skipped => stats.skips += 1,
                ExecutionStatus::DryRun => {}
            }
            match item.action {
                Action::Move => stats.moves += 1,
                Action::Copy => stats.copies += 1,
                Action::Rename => stats.renames += 1,
                Action::Skip => {}
            }

            results.push(result);
        }
        results
    }

    fn execute_one(item: &PlanItem) -> ExecutionResult {
        let timestamp = Utc::now();

        let outcome = match item.action {
            Action::Skip => Ok(ExecutionStatus::Skipped),
            Action::Move | Action::Rename => Self::perform_move(item),
            Action::Copy => Self::perform_copy(item),
        };

        match outcome {
            Ok(status) => ExecutionResult {
                status,
                plan_item: item.clone(),
                error: None,
                timestamp,
            },
            Err(e) => ExecutionResult {
                status: ExecutionStatus::Failed,
                plan_item: item.clone(),
                error: Some(e),
                timestamp,
            },
        }
    }

    /// Source must exist; destination parents are created as needed. Tries
    /// `fs::rename` first, falling back to copy+delete-source across
    /// filesystems (the delete here removes the *source copy*, which is
    /// exactly what a MOVE means — it is not the forbidden delete-as-action
    /// at the plan level). Never silently redirects to a different
    /// destination on failure.
    fn perform_move(item: &PlanItem) -> Result<ExecutionStatus, String> {
        let dst = item.dst.as_ref().ok_or("MOVE/RENAME item has no destination")?;

        if !item.src.exists() {
            return Err(format!("source does not exist: {}", item.src.display()));
        }
        if dst.exists() {
            return Err(format!("destination already exists: {}", dst.display()));
        }

        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent).map_err(|e| format!("failed to create destination directory: {e}"))?;
        }

        match std::fs::rename(&item.src, dst) {
            Ok(()) => {}
            Err(_) => {
                std::fs::copy(&item.src, dst).map_err(|e| format!("cross-filesystem copy failed: {e}"))?;
                std::fs::remove_file(&item.src).map_err(|e| format!("failed to remove source after copy: {e}"))?;
            }
        }

        if item.src.exists() {
            return Err("source still present after move".to_string());
        }
        if !dst.exists() {
            return Err("destination missing after move".to_string());
        }

        Ok(ExecutionStatus::Success)
    }

    /// Source must exist; destination parents are created as needed.
    /// Metadata is preserved where the platform's `fs::copy` allows.
    fn perform_copy(item: &PlanItem) -> Result<ExecutionStatus, String> {
        let dst = item.dst.as_ref().ok_or("COPY item has no destination")?;

        if !item.src.exists() {
            return Err(format!("source does not exist: {}", item.src.display()));
        }
        if dst.exists() {
            return Err(format!("destination already exists: {}", dst.display()));
        }

        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent).map_err(|e| format!("failed to create destination directory: {e}"))?;
        }

        std::fs::copy(&item.src, dst).map_err(|e| format!("copy failed: {e}"))?;

        if !item.src.exists() {
            return Err("source missing after copy".to_string());
        }
        if !dst.exists() {
            return Err("destination missing after copy".to_string());
        }

        Ok(ExecutionStatus::Success)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestItem {
    pub action: Action,
    pub src: PathBuf,
    pub dst: Option<PathBuf>,
    pub status: ExecutionStatus,
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub executed_at: chrono::DateTime<Utc>,
    pub dry_run: bool,
    pub base_path: PathBuf,
    pub stats: ManifestStats,
    pub items: Vec<ManifestItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl Manifest {
    pub fn from_results(results: &[ExecutionResult], base_path: PathBuf, stats: &ExecutorStats) -> Self {
        Manifest {
            executed_at: Utc::now(),
            dry_run: false,
            base_path,
            stats: ManifestStats {
                total: stats.total,
                successful: stats.successful,
                failed: stats.failed,
            },
            items: results
                .iter()
                .map(|r| ManifestItem {
                    action: r.plan_item.action,
                    src: r.plan_item.src.clone(),
                    dst: r.plan_item.dst.clone(),
                    status: r.status,
                    error: r.error.clone(),
                    timestamp: r.timestamp,
                })
                .collect(),
        }
    }

    /// Writes the manifest, the sole audit record for an apply run, to
    /// `log_dir`, named by UTC timestamp. The directory is locked for the
    /// duration of the write since the Executor is the single actor on it.
    pub fn write(&self, log_dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(log_dir)?;
        let lock_path = log_dir.join(".manifest.lock");
        let lock_file = std::fs::OpenOptions::new().create(true).write(true).open(&lock_path)?;
        lock_file.lock_exclusive()?;

        let filename = format!("manifest_{}.json", self.executed_at.format("%Y%m%dT%H%M%S%.3fZ"));
        let path = log_dir.join(filename);
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(&path)?;
        file.write_all(json.as_bytes())?;

        fs2::FileExt::unlock(&lock_file)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, PlanItem};
    use tempfile::tempdir;

    fn move_item(src: PathBuf, dst: PathBuf) -> PlanItem {
        PlanItem {
            action: Action::Move,
            src,
            dst: Some(dst),
            reason: "test".into(),
            confidence: 90,
            rule_id: None,
            llm_used: false,
        }
    }

    #[test]
    fn dry_run_leaves_filesystem_untouched() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        std::fs::write(&src, b"hello").unwrap();
        let dst = dir.path().join("out/a.txt");

        let mut stats = ExecutorStats::default();
        let results = Executor::execute_plan(&[move_item(src.clone(), dst.clone())], Mode::DryRun, &mut stats);

        assert_eq!(results[0].status, ExecutionStatus::DryRun);
        assert!(src.exists());
        assert!(!dst.exists());
    }

    #[test]
    fn apply_move_succeeds_and_removes_source() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        std::fs::write(&src, b"hello").unwrap();
        let dst = dir.path().join("out/a.txt");

        let mut stats = ExecutorStats::default();
        let results = Executor::execute_plan(&[move_item(src.clone(), dst.clone())], Mode::Apply, &mut stats);

        assert_eq!(results[0].status, ExecutionStatus::Success);
        assert!(!src.exists());
        assert!(dst.exists());
    }

    #[test]
    fn apply_move_with_missing_source_fails_and_continues() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let dst = dir.path().join("out/missing.txt");

        let mut stats = ExecutorStats::default();
        let results = Executor::execute_plan(&[move_item(missing, dst)], Mode::Apply, &mut stats);

        assert_eq!(results[0].status, ExecutionStatus::Failed);
        assert!(results[0].error.is_some());
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn apply_never_overwrites_existing_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        std::fs::write(&src, b"hello").unwrap();
        let dst = dir.path().join("b.txt");
        std::fs::write(&dst, b"already here").unwrap();

        let mut stats = ExecutorStats::default();
        let results = Executor::execute_plan(&[move_item(src.clone(), dst.clone())], Mode::Apply, &mut stats);

        assert_eq!(results[0].status, ExecutionStatus::Failed);
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "already here");
        assert!(src.exists());
    }

    #[test]
    fn manifest_round_trips_through_json() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        std::fs::write(&src, b"hello").unwrap();
        let dst = dir.path().join("out/a.txt");

        let mut stats = ExecutorStats::default();
        let results = Executor::execute_plan(&[move_item(src, dst)], Mode::Apply, &mut stats);
        let manifest = Manifest::from_results(&results, dir.path().to_path_buf(), &stats);
        let written_path = manifest.write(dir.path()).unwrap();

        let read_back = std::fs::read_to_string(written_path).unwrap();
        let parsed: Manifest = serde_json::from_str(&read_back).unwrap();
        assert_eq!(parsed.stats.successful, 1);
    }
}
