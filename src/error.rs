use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerateError>;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid animation: {0}")]
    InvalidAnimation(String),

    #[error("glTF validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("no animation clip named {0:?}")]
    MissingClip(String),
}
