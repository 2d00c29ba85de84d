use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("Model client is not configured: {0}")]
    ClientNotInitialized(String),

    #[error("Failed to read document {path}: {source}")]
    ReadDocument {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode document: {0}")]
    DocumentDecode(String),

    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("Model call failed: {0}")]
    ModelCall(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StatementError>;
