use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read record {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse record JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("child index {index} is out of range ({len} components)")]
    ChildOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
