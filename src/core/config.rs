//! # Matrix Configuration / 矩阵配置
//!
//! Loading and validation of the declarative matrix file. A matrix file
//! declares the hook commands, an optional branch filter, and an ordered list
//! of `[[env]]` entries. Each entry is an open key/value map: apart from the
//! reserved `name` and `enabled` keys, every key is exported verbatim to the
//! hooks as an environment variable.
//!
//! 声明式矩阵文件的加载与验证。矩阵文件声明钩子命令、可选的分支过滤器，
//! 以及有序的 `[[env]]` 条目列表。每个条目都是开放的键值映射：除保留键
//! `name` 和 `enabled` 外，每个键都会原样作为环境变量导出给钩子。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::error::{ConfigError, Result};
use crate::core::models::EnvironmentConfiguration;

/// The key every entry must define. / 每个条目必须定义的键。
pub const RUNTIME_VERSION_KEY: &str = "runtimeVersion";
/// Gates the coverage upload for an entry. / 控制条目的覆盖率上传。
pub const COVERAGE_KEY: &str = "coverageEnabled";
/// Optional display label, not exported. / 可选的显示名称，不导出。
pub const NAME_KEY: &str = "name";
/// Toggle for inactive entries, not exported. / 非活动条目的开关，不导出。
pub const ENABLED_KEY: &str = "enabled";

/// A raw `[[env]]` entry as it appears in the source file.
pub type RawEntry = BTreeMap<String, toml::Value>;

/// Commands invoked for every configuration.
/// 为每个配置调用的命令。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HookSettings {
    /// Brings the runtime and pinned libraries into a ready state.
    /// 使运行时和固定版本的库进入就绪状态。
    #[serde(default = "default_install_hook")]
    pub install: String,
    /// Runs the test suite. / 运行测试套件。
    #[serde(default = "default_test_hook")]
    pub test: String,
    /// Uploads coverage data. Only invoked for entries with `coverageEnabled`.
    /// 上传覆盖率数据。仅对启用 `coverageEnabled` 的条目调用。
    #[serde(default = "default_upload_hook")]
    pub upload: String,
    /// Extra attempts for a failed upload before it is recorded as failed.
    /// 上传失败后在记录为失败之前的额外尝试次数。
    #[serde(default)]
    pub upload_retries: u8,
    /// Per-step timeout in seconds. A timed-out step counts as failed.
    /// 每个步骤的超时时间（秒）。超时的步骤视为失败。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            install: default_install_hook(),
            test: default_test_hook(),
            upload: default_upload_hook(),
            upload_retries: 0,
            timeout_secs: None,
        }
    }
}

fn default_install_hook() -> String {
    "./install.sh".to_string()
}

fn default_test_hook() -> String {
    "./test_script.sh".to_string()
}

fn default_upload_hook() -> String {
    "coveralls".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// Restricts the whole matrix to runs on the named branches. An empty list
/// restricts nothing.
/// 将整个矩阵限制为仅在指定分支上运行。空列表不做任何限制。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BranchFilter {
    pub branches: Vec<String>,
}

impl BranchFilter {
    pub fn allows(&self, branch: Option<&str>) -> bool {
        self.branches.is_empty()
            || branch.is_some_and(|b| self.branches.iter().any(|allowed| allowed == b))
    }
}

/// The on-disk shape of a matrix file.
/// 矩阵文件在磁盘上的结构。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatrixFile {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub hooks: HookSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<BranchFilter>,
    #[serde(default)]
    pub env: Vec<RawEntry>,
}

/// One validated entry of the matrix, active or not.
/// 矩阵中一个经过验证的条目，无论是否处于活动状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixEntry {
    pub enabled: bool,
    pub config: EnvironmentConfiguration,
}

/// A fully validated matrix. Immutable once loaded.
/// 经过完整验证的矩阵。加载后不可变。
#[derive(Debug, Clone)]
pub struct Matrix {
    pub language: String,
    pub hooks: HookSettings,
    pub filter: Option<BranchFilter>,
    pub entries: Vec<MatrixEntry>,
}

impl Matrix {
    /// Number of entries marked `enabled = false`.
    pub fn disabled_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.enabled).count()
    }
}

/// Supported source formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    Toml,
    Json,
}

impl MatrixFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") | None => Ok(MatrixFormat::Toml),
            Some("json") => Ok(MatrixFormat::Json),
            Some(other) => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Reads and validates the matrix file at `path`.
///
/// 读取并验证 `path` 处的矩阵文件。
pub fn load_matrix(path: &Path) -> Result<Matrix> {
    let format = MatrixFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_matrix(&content, format)
}

/// Parses and validates a matrix source held in memory.
///
/// Every entry is checked before anything is returned, so a single malformed
/// entry rejects the whole matrix.
///
/// 解析并验证内存中的矩阵源。
/// 在返回之前会检查每个条目，因此单个格式错误的条目会导致整个矩阵被拒绝。
pub fn parse_matrix(content: &str, format: MatrixFormat) -> Result<Matrix> {
    let file: MatrixFile = match format {
        MatrixFormat::Toml => toml::from_str(content)?,
        MatrixFormat::Json => serde_json::from_str(content)?,
    };
    file.validate()
}

impl MatrixFile {
    /// Converts the raw file into a validated [`Matrix`].
    pub fn validate(self) -> Result<Matrix> {
        let entries = self
            .env
            .into_iter()
            .enumerate()
            .map(|(index, raw)| build_entry(index, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Matrix {
            language: self.language,
            hooks: self.hooks,
            filter: self.filter,
            entries,
        })
    }
}

fn build_entry(index: usize, raw: RawEntry) -> Result<MatrixEntry> {
    let entry = index + 1;
    let mut name = None;
    let mut enabled = true;
    let mut vars = BTreeMap::new();

    for (key, value) in raw {
        match key.as_str() {
            NAME_KEY => match value {
                toml::Value::String(s) => name = Some(s),
                _ => return Err(invalid(entry, &key, "must be a string")),
            },
            ENABLED_KEY => match value {
                toml::Value::Boolean(b) => enabled = b,
                _ => return Err(invalid(entry, &key, "must be a boolean")),
            },
            _ => {
                if key.is_empty() || key.contains('=') || key.contains('\0') {
                    return Err(invalid(
                        entry,
                        &key,
                        "is not a valid environment variable name",
                    ));
                }
                let value = scalar_to_string(entry, &key, value)?;
                vars.insert(key, value);
            }
        }
    }

    match vars.get(RUNTIME_VERSION_KEY) {
        Some(version) if !version.trim().is_empty() => {}
        _ => return Err(ConfigError::MissingRuntimeVersion { entry }),
    }

    if let Some(flag) = vars.get_mut(COVERAGE_KEY) {
        let normalized = flag.trim().to_ascii_lowercase();
        if normalized != "true" && normalized != "false" {
            return Err(invalid(entry, COVERAGE_KEY, "must be a boolean"));
        }
        *flag = normalized;
    }

    Ok(MatrixEntry {
        enabled,
        config: EnvironmentConfiguration::new(index, name, vars),
    })
}

fn scalar_to_string(entry: usize, key: &str, value: toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        // `3.10` would come back as "3.1".
        toml::Value::Float(_) => Err(invalid(
            entry,
            key,
            "is a number with a fractional part and must be quoted",
        )),
        _ => Err(invalid(entry, key, "must be a string, boolean or integer")),
    }
}

fn invalid(entry: usize, key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        entry,
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
