//! Ordered pattern/keyword/size rules; first-match wins.

use crate::models::{Classification, FileRecord, Rule};
use chrono::Datelike;

const DEFAULT_THRESHOLD: u8 = 85;

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleStats {
    pub total_classified: u64,
    pub total_unmatched: u64,
}

pub struct RuleEngine {
    rules: Vec<Rule>,
    threshold: u8,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleEngine {
            rules,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    fn pattern_matches(pattern: &str, extension: &str) -> bool {
        let pattern = pattern.to_lowercase();
        let extension = extension.to_lowercase();
        let inner = pattern.strip_prefix("*.").unwrap_or(&pattern);

        if let Some(list) = inner.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            list.split(',')
                .map(|e| format!(".{}", e.trim()))
                .any(|e| e == extension)
        } else {
            format!(".{}", inner) == extension
        }
    }

    fn keywords_match(keywords: &[String], excerpt: &Option<String>, filename: &str) -> bool {
        if keywords.is_empty() {
            return true;
        }
        let haystack = format!(
            "{}{}",
            excerpt.as_deref().unwrap_or_default(),
            filename
        )
        .to_lowercase();
        keywords.iter().any(|k| haystack.contains(&k.to_lowercase()))
    }

    fn size_in_bounds(rule: &Rule, size_bytes: u64) -> bool {
        let size_mb = size_bytes as f64 / 1_048_576.0;
        if let Some(min) = rule.min_size_mb {
            if size_mb < min {
                return false;
            }
        }
        if let Some(max) = rule.max_size_mb {
            if size_mb > max {
                return false;
            }
        }
        true
    }

    /// Returns a Classification when the first matching rule's confidence
    /// meets the engine threshold, else `None`.
    pub fn classify(&self, record: &FileRecord, stats: &mut RuleStats) -> Option<Classification> {
        for rule in &self.rules {
            if !Self::pattern_matches(&rule.pattern, &record.extension) {
                continue;
            }
            if !Self::size_in_bounds(rule, record.size) {
                continue;
            }
            if !Self::keywords_match(&rule.keywords, &record.content_excerpt, &record.filename()) {
                continue;
            }
            if rule.confidence < self.threshold {
                continue;
            }

            let year = record.mtime.year();
            let subject = if !rule.description.is_empty() {
                rule.description.clone()
            } else {
                truncate_chars(&record.stem(), 50)
            };
            let suggested_name = format!(
                "{}__{}__{}{}",
                record.mtime.format("%Y-%m-%d"),
                rule.category.as_str(),
                subject,
                record.extension
            );

            stats.total_classified += 1;
            return Some(Classification {
                category: rule.category,
                subcategory: rule.subcategory.clone(),
                subject,
                year,
                suggested_name: Some(suggested_name),
                confidence: rule.confidence,
                rationale: format!("matched rule {}", rule.rule_id),
            });
        }

        stats.total_unmatched += 1;
        None
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::Utc;
    use std::path::PathBuf;

    fn file_record(ext: &str, size: u64, excerpt: Option<&str>) -> FileRecord {
        FileRecord {
            path: PathBuf::from(format!("vacation{}", ext)),
            size,
            mtime: Utc::now(),
            ctime: Utc::now(),
            sha256: None,
            extension: ext.to_string(),
            mime: None,
            content_excerpt: excerpt.map(|s| s.to_string()),
        }
    }

    #[test]
    fn image_rule_matches_brace_extension_list() {
        let rule = Rule {
            rule_id: "img".into(),
            pattern: "*.{jpg,jpeg,png,gif}".into(),
            category: Category::Pessoal,
            subcategory: "Midia/Imagens".into(),
            confidence: 100,
            description: String::new(),
            keywords: vec![],
            min_size_mb: None,
            max_size_mb: None,
        };
        let engine = RuleEngine::new(vec![rule]);
        let mut stats = RuleStats::default();
        let record = file_record(".jpg", 2048, None);
        let classification = engine.classify(&record, &mut stats).unwrap();
        assert_eq!(classification.category, Category::Pessoal);
        assert_eq!(classification.confidence, 100);
        assert_eq!(stats.total_classified, 1);
    }

    #[test]
    fn keyword_rule_requires_substring_match() {
        let rule = Rule {
            rule_id: "invoice".into(),
            pattern: "*.pdf".into(),
            category: Category::Financas,
            subcategory: String::new(),
            confidence: 90,
            description: String::new(),
            keywords: vec!["fatura".into(), "invoice".into()],
            min_size_mb: None,
            max_size_mb: None,
        };
        let engine = RuleEngine::new(vec![rule]);
        let mut stats = RuleStats::default();

        let matching = file_record(".pdf", 2048, Some("Esta é a sua FATURA de janeiro"));
        assert!(engine.classify(&matching, &mut stats).is_some());

        let non_matching = file_record(".pdf", 2048, Some("random text"));
        assert!(engine.classify(&non_matching, &mut stats).is_none());
    }

    #[test]
    fn below_threshold_rule_is_skipped_in_favor_of_next() {
        let low = Rule {
            rule_id: "low".into(),
            pattern: "*.pdf".into(),
            category: Category::Estudos,
            subcategory: String::new(),
            confidence: 50,
            description: String::new(),
            keywords: vec![],
            min_size_mb: None,
            max_size_mb: None,
        };
        let high = Rule {
            rule_id: "high".into(),
            pattern: "*.pdf".into(),
            category: Category::Livros,
            subcategory: String::new(),
            confidence: 90,
            description: String::new(),
            keywords: vec![],
            min_size_mb: None,
            max_size_mb: None,
        };
        let engine = RuleEngine::new(vec![low, high]).with_threshold(85);
        let mut stats = RuleStats::default();
        let record = file_record(".pdf", 2048, None);
        let classification = engine.classify(&record, &mut stats).unwrap();
        assert_eq!(classification.category, Category::Livros);
    }
}
