// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskweaveError {
    #[error("Duplicate task: {0}")]
    DuplicateTask(String),

    #[error("Task cannot depend on itself: {0}")]
    SelfDependency(String),

    #[error(
        "Rule '{rule}' must be applied but {predecessor} -> {successor} would create a dependency cycle"
    )]
    CycleViolation {
        predecessor: String,
        successor: String,
        rule: String,
    },

    #[error("Invalid scheduler state: {0}")]
    InvalidState(String),

    #[error("Index {index} out of range for {len} tasks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Task {task} failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskweaveError>;
