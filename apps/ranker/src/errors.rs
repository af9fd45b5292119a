use std::path::PathBuf;

use thiserror::Error;

/// Application-level error type.
/// Only input and configuration failures abort a run; everything else is
/// logged at the point of failure and converted to an empty result.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input error: cannot read {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input error: {path} is not a valid candidate list: {source}")]
    InputFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: cannot write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
