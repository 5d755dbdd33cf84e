//! Destination path synthesis; filename sanitation; collision-free
//! versioning; JSON + human-readable plan artifacts.

use crate::config::{Config, DefaultAction};
use crate::models::{Action, Classification, FileRecord, PlanItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const MAX_FILENAME_LEN: usize = 200;
const MAX_VERSION_ATTEMPTS: u32 = 1000;

/// Replace each character in `<>:"/\|?*` with `_`, collapse runs of `_`, and
/// truncate to `MAX_FILENAME_LEN` characters preserving the extension.
/// Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if "<>:\"/\\|?*".contains(c) { '_' } else { c })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    let mut prev_underscore = false;
    for c in replaced.chars() {
        if c == '_' {
            if !prev_underscore {
                collapsed.push(c);
            }
            prev_underscore = true;
        } else {
            collapsed.push(c);
            prev_underscore = false;
        }
    }

    truncate_preserving_extension(&collapsed, MAX_FILENAME_LEN)
}

fn truncate_preserving_extension(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }
    let (stem, ext) = split_ext(name);
    let ext_len = ext.chars().count();
    let budget = max_len.saturating_sub(ext_len);
    let truncated_stem: String = stem.chars().take(budget).collect();
    format!("{}{}", truncated_stem, ext)
}

fn split_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// If the computed destination already exists, append `_v2`, `_v3`, ...
/// An existing `_vN` suffix increments from N+1. After `MAX_VERSION_ATTEMPTS`
/// attempts, falls back to a timestamp suffix. Must be called at plan time.
pub fn resolve_conflict(dst: &Path, existing: &HashSet<PathBuf>, check_fs: bool) -> PathBuf {
    let exists = |p: &Path| existing.contains(p) || (check_fs && p.exists());

    if !exists(dst) {
        return dst.to_path_buf();
    }

    let parent = dst.parent().unwrap_or_else(|| Path::new(""));
    let filename = dst.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let (stem, ext) = split_ext(&filename);

    let (base_stem, mut next_version) = match parse_version_suffix(stem) {
        Some((base, v)) => (base, v + 1),
        None => (stem.to_string(), 2),
    };

    for _ in 0..MAX_VERSION_ATTEMPTS {
        let candidate = parent.join(format!("{}_v{}{}", base_stem, next_version, ext));
        if !exists(&candidate) {
            return candidate;
        }
        next_version += 1;
    }

    let timestamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    parent.join(format!("{}_{}{}", base_stem, timestamp, ext))
}

fn parse_version_suffix(stem: &str) -> Option<(String, u32)> {
    let idx = stem.rfind("_v")?;
    let (base, suffix) = stem.split_at(idx);
    let version: u32 = suffix[2..].parse().ok()?;
    Some((base.to_string(), version))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlanStats {
    pub total_items: usize,
    pub moves: usize,
    pub copies: usize,
    pub renames: usize,
    pub skips: usize,
}

pub struct Planner<'a> {
    config: &'a Config,
}

impl<'a> Planner<'a> {
    pub fn new(config: &'a Config) -> Self {
        Planner { config }
    }

    fn destination_action(&self) -> Action {
        match self.config.default_action {
            DefaultAction::Move => Action::Move,
            DefaultAction::Copy => Action::Copy,
        }
    }

    fn build_filename(classification: &Classification, record: &FileRecord) -> String {
        match &classification.suggested_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!(
                "{}-01-01__{}__{}{}",
                classification.year,
                classification.category.as_str(),
                classification.subject,
                record.extension
            ),
        }
    }

    fn build_path(&self, base: &Path, classification: &Classification, filename: &str) -> PathBuf {
        let mut path = base.join(classification.category.as_str());
        if !classification.subcategory.is_empty() {
            path = path.join(&classification.subcategory);
        }
        path.join(classification.year.to_string()).join(filename)
    }

    /// Pairs `(FileRecord, Classification-or-null)` with a base output
    /// directory into an ordered list of PlanItems. Null classification
    /// always yields SKIP.
    pub fn plan(&self, pairs: &[(FileRecord, Option<Classification>)], base: &Path, stats: &mut PlanStats) -> Vec<PlanItem> {
        let mut used_destinations: HashSet<PathBuf> = HashSet::new();
        let mut items = Vec::with_capacity(pairs.len());

        for (record, classification) in pairs {
            stats.total_items += 1;

            let item = match classification {
                None => {
                    stats.skips += 1;
                    PlanItem::skip(record.path.clone(), "No classification available")
                }
                Some(classification) => {
                    let filename = sanitize_filename(&Self::build_filename(classification, record));
                    let raw_dst = self.build_path(base, classification, &filename);
                    let dst = resolve_conflict(&raw_dst, &used_destinations, true);
                    used_destinations.insert(dst.clone());

                    let action = self.destination_action();
                    match action {
                        Action::Move => stats.moves += 1,
                        Action::Copy => stats.copies += 1,
                        Action::Rename => stats.renames += 1,
                        Action::Skip => stats.skips += 1,
                    }

                    PlanItem {
                        action,
                        src: record.path.clone(),
                        dst: Some(dst),
                        reason: classification.rationale.clone(),
                        confidence: classification.confidence,
                        rule_id: None,
                        llm_used: false,
                    }
                }
            };

            items.push(item);
        }

        items
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanArtifact {
    pub generated_at: DateTime<Utc>,
    pub base_path: PathBuf,
    pub default_action: DefaultAction,
    pub stats: PlanStatsJson,
    pub items: Vec<PlanItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanStatsJson {
    pub total_items: usize,
    pub moves: usize,
    pub copies: usize,
    pub renames: usize,
    pub skips: usize,
}

impl From<PlanStats> for PlanStatsJson {
    fn from(s: PlanStats) -> Self {
        PlanStatsJson {
            total_items: s.total_items,
            moves: s.moves,
            copies: s.copies,
            renames: s.renames,
            skips: s.skips,
        }
    }
}

/// A summary document for reviewer eyes: counts and per-item
/// source/destination/confidence/reason.
pub fn render_human_readable(artifact: &PlanArtifact) -> String {
    let mut out = String::new();
    out.push_str(&format!("Plan generated at {}\n", artifact.generated_at));
    out.push_str(&format!("Base path: {}\n", artifact.base_path.display()));
    out.push_str(&format!(
        "Items: {} (moves={}, copies={}, renames={}, skips={})\n\n",
        artifact.stats.total_items, artifact.stats.moves, artifact.stats.copies, artifact.stats.renames, artifact.stats.skips
    ));

    for item in &artifact.items {
        out.push_str(&format!(
            "[{:?}] {} -> {} (confidence={}, reason={})\n",
            item.action,
            item.src.display(),
            item.dst.as_ref().map(|d| d.display().to_string()).unwrap_or_else(|| "-".to_string()),
            item.confidence,
            item.reason
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_forbidden_characters_and_collapses_underscores() {
        let sanitized = sanitize_filename("a<b>c:d\"e/f\\g|h?i*j.txt");
        assert!(!sanitized.contains(['<', '>', ':', '"', '/', '\\', '|', '?', '*']));
        assert!(!sanitized.contains("__"));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize_filename("weird<>name///here.pdf");
        let twice = sanitize_filename(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn sanitize_truncates_preserving_extension() {
        let long_name = format!("{}.pdf", "a".repeat(300));
        let sanitized = sanitize_filename(&long_name);
        assert!(sanitized.chars().count() <= MAX_FILENAME_LEN);
        assert!(sanitized.ends_with(".pdf"));
    }

    #[test]
    fn resolve_conflict_appends_v2_then_v3() {
        let dst = PathBuf::from("/base/file.jpg");
        let mut existing = HashSet::new();
        existing.insert(dst.clone());
        let v2 = resolve_conflict(&dst, &existing, false);
        assert_eq!(v2, PathBuf::from("/base/file_v2.jpg"));

        existing.insert(v2.clone());
        let v3 = resolve_conflict(&dst, &existing, false);
        assert_eq!(v3, PathBuf::from("/base/file_v3.jpg"));
    }

    #[test]
    fn resolve_conflict_returns_unmodified_path_when_free() {
        let dst = PathBuf::from("/base/free.jpg");
        let existing = HashSet::new();
        assert_eq!(resolve_conflict(&dst, &existing, false), dst);
    }
}
