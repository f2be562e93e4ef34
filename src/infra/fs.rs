//! # File System Operations Module / 文件系统操作模块
//!
//! Small helpers for writing generated files (reports, starter matrices) and
//! resolving user-supplied directories.
//!
//! 用于写入生成文件（报告、初始矩阵）和解析用户提供的目录的小工具。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `contents` to `path`, creating missing parent directories first.
///
/// # Arguments
/// * `path` - Destination file
/// * `contents` - Bytes or text to write
pub fn write_creating_parents(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, contents).with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Gets the absolute path of an existing directory.
///
/// # Returns
/// The canonicalized path, or an error if it does not exist or is not a directory
pub fn resolve_dir(path: &Path) -> Result<PathBuf> {
    let resolved = fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
    if !resolved.is_dir() {
        anyhow::bail!("Not a directory: {}", resolved.display());
    }
    Ok(resolved)
}
