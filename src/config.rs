//! A single immutable configuration record, passed by shared reference down
//! the pipeline. Never mutated in place; avoids process-wide mutable state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultAction {
    Move,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Rule Engine only; unclassified records are never submitted to an LLM.
    RuleOnly,
    /// A named local inference endpoint.
    Llm { name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    pub backend: Backend,
    pub model: String,
    pub endpoint_url: String,
    pub timeout_s: u64,
    pub batch_size: usize,
    pub max_concurrent: usize,
    pub min_confidence: u8,
    pub max_retries: u32,
    pub default_action: DefaultAction,
    pub min_file_size_bytes: u64,
    pub max_excerpt_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::Llm {
                name: "ollama".to_string(),
            },
            model: "qwen2.5:14b".to_string(),
            endpoint_url: "http://localhost:11434".to_string(),
            timeout_s: 60,
            batch_size: 8,
            max_concurrent: 4,
            min_confidence: 85,
            max_retries: 3,
            default_action: DefaultAction::Move,
            min_file_size_bytes: 1024,
            max_excerpt_bytes: 8192,
        }
    }
}
