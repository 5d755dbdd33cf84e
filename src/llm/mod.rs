pub mod client;
pub mod hardware;
pub mod json_parser;
pub mod prompts;

use crate::models::{Category, Classification, FileRecord};
use client::LlmClient;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Default, Clone, Copy)]
pub struct LlmStats {
    pub successful: u64,
    pub low_confidence: u64,
    pub failed: u64,
    pub retries: u64,
}

pub struct LlmClassifier {
    client: Arc<LlmClient>,
    max_retries: u32,
    min_confidence: u8,
    max_concurrent: usize,
}

#[derive(Debug, serde::Deserialize)]
struct RawClassification {
    category: String,
    #[serde(default)]
    subcategory: String,
    #[serde(default)]
    subject: String,
    year: i32,
    #[serde(default)]
    suggested_name: Option<String>,
    confidence: u8,
    #[serde(default)]
    rationale: String,
}

fn validate(raw: &serde_json::Value) -> Result<RawClassification, String> {
    let parsed: RawClassification =
        serde_json::from_value(raw.clone()).map_err(|e| format!("missing or malformed field: {e}"))?;

    if Category::from_str_opt(&parsed.category).is_none() {
        return Err(format!("category '{}' is not one of the closed set", parsed.category));
    }
    if !(0..=100).contains(&parsed.confidence) {
        return Err(format!("confidence {} out of range [0, 100]", parsed.confidence));
    }
    if !(1900..=2100).contains(&parsed.year) {
        return Err(format!("year {} out of range [1900, 2100]", parsed.year));
    }
    Ok(parsed)
}

impl LlmClassifier {
    pub fn new(client: LlmClient, max_retries: u32, min_confidence: u8, max_concurrent: usize) -> Self {
        LlmClassifier {
            client: Arc::new(client),
            max_retries,
            min_confidence,
            max_concurrent,
        }
    }

    /// Issues the initial prompt, then up to `max_retries` correction
    /// prompts on soft error (empty response, unparseable JSON, schema
    /// violation). On exhaustion the file is treated as unclassified, which
    /// this crate resolves as a low-confidence inbox Classification rather
    /// than `None` (see the design ledger for the rationale).
    async fn classify_one(&self, record: &FileRecord, stats: &mut LlmStats) -> Option<Classification> {
        let mut last_error: Option<String> = None;

        for attempt in 0..=self.max_retries {
            let prompt = match &last_error {
                None => prompts::build_classification_prompt(record, self.min_confidence),
                Some(err) => prompts::build_correction_prompt(record, self.min_confidence, err),
            };

            if attempt > 0 {
                stats.retries += 1;
            }

            let response = match self.client.generate(&prompt, 0.2).await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            };

            if response.trim().is_empty() {
                last_error = Some("empty response".to_string());
                continue;
            }

            let parsed_json = match json_parser::extract_json_object(&response) {
                Some(v) => v,
                None => {
                    last_error = Some("no JSON object found in response".to_string());
                    continue;
                }
            };

            match validate(&parsed_json) {
                Ok(raw) => {
                    let category = Category::from_str_opt(&raw.category).unwrap();
                    let classification = Classification {
                        category,
                        subcategory: raw.subcategory,
                        subject: raw.subject,
                        year: raw.year,
                        suggested_name: raw.suggested_name,
                        confidence: raw.confidence,
                        rationale: raw.rationale,
                    };

                    if classification.confidence < self.min_confidence {
                        stats.low_confidence += 1;
                        return Some(Classification {
                            category: Category::inbox(),
                            confidence: 0,
                            rationale: format!(
                                "LLM confidence {} below minimum {}; routed to inbox for review",
                                classification.confidence, self.min_confidence
                            ),
                            ..classification
                        });
                    }

                    stats.successful += 1;
                    return Some(classification);
                }
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        stats.failed += 1;
        Some(Classification {
            category: Category::inbox(),
            subcategory: String::new(),
            subject: record.stem(),
            year: record.mtime.format("%Y").to_string().parse().unwrap_or(1970),
            suggested_name: None,
            confidence: 0,
            rationale: format!(
                "classification exhausted {} retries: {}",
                self.max_retries,
                last_error.unwrap_or_else(|| "unknown error".to_string())
            ),
        })
    }

    /// Accepts a batch of FileRecords and produces per-record results in
    /// input order. Outstanding concurrent requests are capped at
    /// `max_concurrent`; per-record failures never abort the batch.
    pub async fn classify_batch(
        &self,
        records: &[FileRecord],
        stats: &mut LlmStats,
    ) -> Vec<Option<Classification>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent.max(1)));
        let mut handles = Vec::with_capacity(records.len());

        for record in records {
            let record = record.clone();
            let semaphore = semaphore.clone();
            let client = self.client.clone();
            let max_retries = self.max_retries;
            let min_confidence = self.min_confidence;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let classifier = LlmClassifier {
                    client,
                    max_retries,
                    min_confidence,
                    max_concurrent: 1,
                };
                let mut local_stats = LlmStats::default();
                let result = classifier.classify_one(&record, &mut local_stats).await;
                (result, local_stats)
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok((result, local_stats)) => {
                    stats.successful += local_stats.successful;
                    stats.low_confidence += local_stats.low_confidence;
                    stats.failed += local_stats.failed;
                    stats.retries += local_stats.retries;
                    results.push(result);
                }
                Err(_) => {
                    stats.failed += 1;
                    results.push(None);
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_unknown_category() {
        let raw = serde_json::json!({
            "category": "99_Nope",
            "subcategory": "",
            "subject": "x",
            "year": 2024,
            "confidence": 90,
            "rationale": "r"
        });
        assert!(validate(&raw).is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_confidence() {
        let raw = serde_json::json!({
            "category": "05_Pessoal",
            "subcategory": "",
            "subject": "x",
            "year": 2024,
            "confidence": 150,
            "rationale": "r"
        });
        assert!(validate(&raw).is_err());
    }

    #[test]
    fn validate_accepts_well_formed_object() {
        let raw = serde_json::json!({
            "category": "05_Pessoal",
            "subcategory": "Midia",
            "subject": "vacation",
            "year": 2024,
            "suggested_name": "2024-01-01__05_Pessoal__vacation.jpg",
            "confidence": 95,
            "rationale": "clear personal photo"
        });
        assert!(validate(&raw).is_ok());
    }
}
