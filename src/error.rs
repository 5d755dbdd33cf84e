use std::path::PathBuf;

/// Fatal, crate-boundary errors. Anything a caller must abort on (§7: "Fatal
/// configuration errors"). Per-file and LLM soft errors never surface here —
/// they fold into statistics and best-effort fields instead.
#[derive(Debug, thiserror::Error)]
pub enum OrganizerError {
    #[error("root directory does not exist or is not readable: {0}")]
    MissingRoot(PathBuf),

    #[error("plan file is missing or unreadable: {0}")]
    UnreadablePlan(PathBuf),

    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("endpoint error: {0}")]
    Endpoint(String),
}

pub type Result<T> = std::result::Result<T, OrganizerError>;
