//! The five immutable record types threading through the pipeline.
//! Enrichment is always a new value; nothing here is ever mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The closed, six-member category set. Any other string is a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "01_Trabalho")]
    Trabalho,
    #[serde(rename = "02_Financas")]
    Financas,
    #[serde(rename = "03_Estudos")]
    Estudos,
    #[serde(rename = "04_Livros")]
    Livros,
    #[serde(rename = "05_Pessoal")]
    Pessoal,
    #[serde(rename = "90_Inbox_Organizar")]
    InboxOrganizar,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Trabalho,
        Category::Financas,
        Category::Estudos,
        Category::Livros,
        Category::Pessoal,
        Category::InboxOrganizar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Trabalho => "01_Trabalho",
            Category::Financas => "02_Financas",
            Category::Estudos => "03_Estudos",
            Category::Livros => "04_Livros",
            Category::Pessoal => "05_Pessoal",
            Category::InboxOrganizar => "90_Inbox_Organizar",
        }
    }

    /// The fallback/"inbox" category for uncertain material.
    pub fn inbox() -> Category {
        Category::InboxOrganizar
    }

    pub fn from_str_opt(s: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered file. Present and readable at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub mtime: DateTime<Utc>,
    pub ctime: DateTime<Utc>,
    /// Lowercase hex SHA-256 digest, or `None` if the file could not be read.
    pub sha256: Option<String>,
    /// Normalized to lowercase including the leading dot, or empty.
    pub extension: String,
    /// Set by the Extractor; `None` before extraction.
    pub mime: Option<String>,
    /// Set by the Extractor. `None` is distinct from an empty string.
    pub content_excerpt: Option<String>,
}

impl FileRecord {
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// New value with `mime`/`content_excerpt` populated. Never mutates `self`.
    pub fn with_extraction(&self, mime: Option<String>, content_excerpt: Option<String>) -> FileRecord {
        FileRecord {
            mime,
            content_excerpt,
            ..self.clone()
        }
    }
}

/// Semantic labelling of a file, produced by the Rule Engine or LLM Classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    /// Free-form short string; empty allowed.
    pub subcategory: String,
    /// Free-form, ≤ 50 characters recommended.
    pub subject: String,
    /// [1900, 2100].
    pub year: i32,
    pub suggested_name: Option<String>,
    /// [0, 100].
    pub confidence: u8,
    pub rationale: String,
}

impl Classification {
    pub fn is_valid(&self) -> bool {
        (0..=100).contains(&self.confidence) && (1900..=2100).contains(&self.year)
    }
}

/// One entry in the rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: String,
    /// `*.<ext>` or `*.{<ext>,<ext>,...}`, case-insensitive.
    pub pattern: String,
    pub category: Category,
    pub subcategory: String,
    pub confidence: u8,
    pub description: String,
    /// If non-empty, the excerpt-or-filename must contain at least one (case-insensitive substring).
    pub keywords: Vec<String>,
    pub min_size_mb: Option<f64>,
    pub max_size_mb: Option<f64>,
}

/// The closed action set. DELETE is not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Move,
    Copy,
    Rename,
    Skip,
}

/// One filesystem intention produced by the Planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanItem {
    pub action: Action,
    pub src: PathBuf,
    /// Required for non-SKIP; `None` for SKIP.
    pub dst: Option<PathBuf>,
    pub reason: String,
    /// Mirrors the Classification score; 0 for SKIP.
    pub confidence: u8,
    /// Set when classified by the Rule Engine; `None` when by the LLM.
    pub rule_id: Option<String>,
    pub llm_used: bool,
}

impl PlanItem {
    pub fn skip(src: PathBuf, reason: impl Into<String>) -> PlanItem {
        PlanItem {
            action: Action::Skip,
            src,
            dst: None,
            reason: reason.into(),
            confidence: 0,
            rule_id: None,
            llm_used: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Skipped,
    #[serde(rename = "dry-run")]
    DryRun,
}

/// Outcome of executing one PlanItem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub plan_item: PlanItem,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for c in Category::ALL {
            assert_eq!(Category::from_str_opt(c.as_str()), Some(c));
        }
        assert_eq!(Category::from_str_opt("not_a_category"), None);
    }

    #[test]
    fn classification_validity_bounds() {
        let mut c = Classification {
            category: Category::Pessoal,
            subcategory: String::new(),
            subject: "x".into(),
            year: 2024,
            suggested_name: None,
            confidence: 100,
            rationale: "r".into(),
        };
        assert!(c.is_valid());
        c.year = 1899;
        assert!(!c.is_valid());
        c.year = 2024;
        c.confidence = 255u8.min(200) as u8; // stays in range for u8, check year instead
        c.year = 2101;
        assert!(!c.is_valid());
    }

    #[test]
    fn action_serializes_as_uppercase() {
        let s = serde_json::to_string(&Action::Move).unwrap();
        assert_eq!(s, "\"MOVE\"");
    }
}
