//! # CI Matrix Library / CI Matrix 库
//!
//! This library provides the core functionality for the `ci-matrix` tool, a
//! configuration-driven CI matrix orchestrator. It expands a declarative
//! environment matrix into independent configurations, runs an install hook
//! and a test hook for each of them, optionally uploads coverage on a
//! best-effort basis, and folds everything into a single exit code.
//!
//! 此库为 `ci-matrix` 工具提供核心功能，这是一个配置驱动的 CI 矩阵编排器。
//! 它将声明式环境矩阵展开为相互独立的配置，为每个配置运行安装钩子和测试钩子，
//! 以尽力而为的方式可选地上传覆盖率，并将所有结果汇总为单个退出码。
//!
//! ## Modules / 模块
//!
//! - `core` - Matrix loading, data models, planning and the run pipeline
//! - `infra` - Hook process execution and file system helpers
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 矩阵加载、数据模型、执行计划和运行流水线
//! - `infra` - 钩子进程执行和文件系统辅助工具
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::execution;
pub use crate::core::models;

/// Picks the best available locale for `requested`.
///
/// It attempts to match the full locale (e.g., "zh-CN"), then just the
/// language code (e.g., "en"), and finally falls back to "en".
pub fn resolve_locale(requested: &str) -> String {
    let available_locales = rust_i18n::available_locales!();

    if available_locales.iter().any(|l| *l == requested) {
        return requested.to_string();
    }
    requested
        .split(['-', '_'])
        .next()
        .filter(|lang_code| available_locales.iter().any(|l| l == lang_code))
        .unwrap_or("en")
        .to_string()
}

/// Detects the system locale and makes it the process-wide default.
pub fn init() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let lang = resolve_locale(&locale);
    rust_i18n::set_locale(&lang);
    lang
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
