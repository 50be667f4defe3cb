use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuideError>;

#[derive(Error, Debug)]
pub enum GuideError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus schema error: {0}")]
    Schema(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chat;
pub mod commands;
pub mod config;
pub mod context;
pub mod corpus;
pub mod embeddings;
pub mod indexer;
pub mod store;

pub(crate) fn describe_transport_error(error: &ureq::Error) -> String {
    match error {
        ureq::Error::StatusCode(code) => format!("HTTP status {code}"),
        ureq::Error::ConnectionFailed => "Connection failed".to_string(),
        ureq::Error::HostNotFound => "Host not found".to_string(),
        ureq::Error::Timeout(_) => "Request timed out".to_string(),
        ureq::Error::Io(e) => format!("IO error: {e}"),
        other => format!("Transport error: {other}"),
    }
}
