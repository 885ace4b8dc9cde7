//! 库层错误类型
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlrunError {
    #[error("SQL file not found: {0}")]
    NotFound(PathBuf),

    #[error("SQL file is empty: {0}")]
    Empty(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project id is not set; pass --project-id or export GCP_PROJECT_ID='your-project-id'")]
    MissingProject,

    #[error("API key is not set; pass --api-key or export GEMINI_API_KEY='your-api-key'")]
    MissingApiKey,

    #[error("query failed: {0}")]
    Query(String),

    #[error("text generation failed: {0}")]
    Generation(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl From<csv::Error> for SqlrunError {
    fn from(e: csv::Error) -> Self {
        SqlrunError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for SqlrunError {
    fn from(e: serde_json::Error) -> Self {
        SqlrunError::Export(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SqlrunError>;
