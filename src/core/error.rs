//! # Configuration Errors / 配置错误
//!
//! Typed errors raised while loading a matrix source. Any of these aborts the
//! whole invocation before a single hook is spawned.
//!
//! 加载矩阵源时产生的类型化错误。任何一种错误都会在启动任何钩子之前中止整个运行。

use std::path::PathBuf;

/// Errors that can occur while loading or validating a matrix file.
/// 加载或验证矩阵文件时可能发生的错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read matrix file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML matrix: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON matrix: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported matrix format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    /// Entry numbers are 1-based, matching how users count `[[env]]` blocks.
    #[error("matrix entry #{entry} is missing the required key 'runtimeVersion'")]
    MissingRuntimeVersion { entry: usize },

    #[error("matrix entry #{entry}: key '{key}' {reason}")]
    InvalidValue {
        entry: usize,
        key: String,
        reason: String,
    },
}

/// Result type alias for matrix loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
