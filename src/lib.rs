pub mod config;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod llm;
pub mod models;
pub mod planner;
pub mod rules;
pub mod scanner;
pub mod telemetry;

use chrono::Utc;
use config::{Backend, Config};
use error::{OrganizerError, Result};
use executor::{Executor, ExecutorStats, Manifest, Mode};
use extractor::{ExtractStats, Extractor};
use llm::client::LlmClient;
use llm::hardware::{self, Tier, TierPreset};
use llm::{LlmClassifier, LlmStats};
use models::{Classification, FileRecord, Rule};
use planner::{PlanArtifact, PlanStats, Planner};
use rules::{RuleEngine, RuleStats};
use scanner::{ScanStats, Scanner};
use std::path::{Path, PathBuf};

/// `scan(root)` → collected FileRecords plus statistics. The underlying
/// Scanner iterator is lazy; this entry point drains it for callers that
/// want the whole inventory up front (§6 describes the operation as
/// returning "a lazy stream"; a caller wanting that can use `Scanner`
/// directly instead of this convenience wrapper).
pub async fn scan(root: &Path) -> Result<(Vec<FileRecord>, ScanStats)> {
    let scanner = Scanner::default();
    let (iter, stats_handle) = scanner.scan(root)?;
    let records: Vec<FileRecord> = iter.collect();
    let stats = stats_handle.snapshot();
    tracing::info!(files = records.len(), "scan complete");
    Ok((records, stats))
}

#[derive(Debug, Default)]
pub struct PlanRunStats {
    pub scan: ScanStats,
    pub extract: ExtractStats,
    pub rules: RuleStats,
    pub llm: LlmStats,
    pub plan: PlanStats,
}

/// `plan(root, backend_config, output_dir)` → writes a machine-readable plan
/// and a human-readable preview; returns the stored plan path.
pub async fn plan(root: &Path, config: &Config, rules: Vec<Rule>, output_dir: &Path) -> Result<PathBuf> {
    let (records, scan_stats) = scan(root).await?;

    let extractor = Extractor::default().with_max_excerpt_bytes(config.max_excerpt_bytes);
    let mut extract_stats = ExtractStats::default();
    let mut extracted = Vec::with_capacity(records.len());
    for record in &records {
        extracted.push(extractor.extract(record, &mut extract_stats).await);
    }

    let rule_engine = RuleEngine::new(rules);
    let mut rule_stats = RuleStats::default();
    let mut pairs: Vec<(FileRecord, Option<Classification>)> = Vec::with_capacity(extracted.len());
    let mut unclassified: Vec<FileRecord> = Vec::new();

    for record in extracted {
        match rule_engine.classify(&record, &mut rule_stats) {
            Some(classification) => pairs.push((record, Some(classification))),
            None => unclassified.push(record),
        }
    }

    let mut llm_stats = LlmStats::default();
    if matches!(config.backend, Backend::Llm { .. }) && !unclassified.is_empty() {
        let client = LlmClient::new(config.endpoint_url.clone(), config.model.clone(), config.timeout_s);
        let classifier = LlmClassifier::new(client, config.max_retries, config.min_confidence, config.max_concurrent);

        for chunk in unclassified.chunks(config.batch_size.max(1)) {
            let results = classifier.classify_batch(chunk, &mut llm_stats).await;
            for (record, classification) in chunk.iter().cloned().zip(results) {
                pairs.push((record, classification));
            }
        }
    } else {
        for record in unclassified {
            pairs.push((record, None));
        }
    }

    let mut plan_stats = PlanStats::default();
    let planner = Planner::new(config);
    let items = planner.plan(&pairs, output_dir, &mut plan_stats);

    let artifact = PlanArtifact {
        generated_at: Utc::now(),
        base_path: output_dir.to_path_buf(),
        default_action: config.default_action,
        stats: plan_stats.into(),
        items,
    };

    std::fs::create_dir_all(output_dir)?;
    let plan_path = output_dir.join(format!("plan_{}.json", artifact.generated_at.format("%Y%m%dT%H%M%S%.3fZ")));
    std::fs::write(&plan_path, serde_json::to_string_pretty(&artifact)?)?;

    let preview_path = plan_path.with_extension("txt");
    std::fs::write(&preview_path, planner::render_human_readable(&artifact))?;

    tracing::info!(
        total = artifact.stats.total_items,
        scanned = scan_stats.files_scanned,
        extracted = extract_stats.files_processed,
        rule_classified = rule_stats.total_classified,
        llm_successful = llm_stats.successful,
        "plan written to {}",
        plan_path.display()
    );

    Ok(plan_path)
}

pub enum ExecuteOutcome {
    Applied { manifest_path: PathBuf, stats: ExecutorStats },
    DryRun { stats: ExecutorStats },
}

/// `execute(plan_path, apply?, log_dir)` → executes; returns the manifest
/// path (apply) or a dry-run summary.
pub async fn execute(plan_path: &Path, apply: bool, log_dir: &Path) -> Result<ExecuteOutcome> {
    let raw = std::fs::read_to_string(plan_path)
        .map_err(|_| OrganizerError::UnreadablePlan(plan_path.to_path_buf()))?;
    let artifact: PlanArtifact =
        serde_json::from_str(&raw).map_err(|_| OrganizerError::UnreadablePlan(plan_path.to_path_buf()))?;

    let mode = if apply { Mode::Apply } else { Mode::DryRun };
    let mut stats = ExecutorStats::default();
    let results = Executor::execute_plan(&artifact.items, mode, &mut stats);

    if apply {
        let manifest = Manifest::from_results(&results, artifact.base_path.clone(), &stats);
        let manifest_path = manifest.write(log_dir)?;
        tracing::info!(successful = stats.successful, failed = stats.failed, "apply run complete");
        Ok(ExecuteOutcome::Applied { manifest_path, stats })
    } else {
        tracing::info!(total = stats.total, "dry-run complete");
        Ok(ExecuteOutcome::DryRun { stats })
    }
}

#[derive(Debug, serde::Serialize)]
pub struct InfoSnapshot {
    pub backend: Backend,
    pub model: String,
    pub hardware_tier: String,
    pub endpoint_reachable: bool,
}

/// `info()` → configuration snapshot: chosen backend, chosen model, detected
/// hardware tier, endpoint reachability.
pub async fn info(config: &Config) -> InfoSnapshot {
    let tier_preset: TierPreset = hardware::auto_configure();
    let tier = hardware::tier_for_vram(hardware::detect_vram_gb());

    let endpoint_reachable = match &config.backend {
        Backend::RuleOnly => false,
        Backend::Llm { .. } => {
            let client = LlmClient::new(config.endpoint_url.clone(), config.model.clone(), config.timeout_s);
            client.health_check().await
        }
    };

    InfoSnapshot {
        backend: config.backend.clone(),
        model: if config.model.is_empty() { tier_preset.default_model.to_string() } else { config.model.clone() },
        hardware_tier: tier_name(tier),
        endpoint_reachable,
    }
}

fn tier_name(tier: Tier) -> String {
    match tier {
        Tier::UltraHigh => "ultra-high",
        Tier::High => "high",
        Tier::UpperMid => "upper-mid",
        Tier::Mid => "mid",
        Tier::Low => "low",
        Tier::Cpu => "cpu",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Category;
    use tempfile::tempdir;

    #[tokio::test]
    async fn scan_then_plan_then_dry_run_execute_end_to_end() {
        let root = tempdir().unwrap();
        std::fs::write(root.path().join("vacation.jpg"), vec![0u8; 2048]).unwrap();

        let rule = Rule {
            rule_id: "images".into(),
            pattern: "*.{jpg,jpeg,png,gif}".into(),
            category: Category::Pessoal,
            subcategory: "Midia/Imagens".into(),
            confidence: 100,
            description: String::new(),
            keywords: vec![],
            min_size_mb: None,
            max_size_mb: None,
        };

        let mut config = Config::default();
        config.backend = Backend::RuleOnly;

        let output = tempdir().unwrap();
        let plan_path = plan(root.path(), &config, vec![rule], output.path()).await.unwrap();
        assert!(plan_path.exists());

        let outcome = execute(&plan_path, false, output.path()).await.unwrap();
        match outcome {
            ExecuteOutcome::DryRun { stats } => assert_eq!(stats.total, 1),
            _ => panic!("expected dry run outcome"),
        }

        // filesystem untouched by dry-run
        assert!(root.path().join("vacation.jpg").exists());
    }
}
