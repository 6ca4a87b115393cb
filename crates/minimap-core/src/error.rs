use std::path::PathBuf;
use thiserror::Error;

/// Failures the generator must surface instead of papering over.
#[derive(Debug, Error)]
pub enum MinimapError {
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("unknown asset category '{0}'")]
    UnknownCategory(String),

    #[error("required directory not found: {0:?}")]
    MissingDirectory(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A without-replacement draw asked for more than the pool holds.
    #[error("pool '{pool}' exhausted: requested {requested}, only {available} available")]
    PoolExhausted {
        pool: String,
        requested: usize,
        available: usize,
    },

    #[error("missing asset '{key}' at {path:?}")]
    MissingAsset { key: String, path: PathBuf },

    #[error("class dictionary is empty")]
    EmptyDictionary,

    #[error("invalid class file: {0}")]
    InvalidClassFile(String),
}

impl MinimapError {
    pub fn pool_exhausted(pool: impl Into<String>, requested: usize, available: usize) -> Self {
        Self::PoolExhausted {
            pool: pool.into(),
            requested,
            available,
        }
    }
}
