//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the matrix
//! runner: environment configurations, per-step outcomes and per-configuration
//! run results, plus the aggregate exit-code rule.
//!
//! 此模块定义了整个矩阵运行器中使用的核心数据结构：环境配置、每个步骤的结果
//! 以及每个配置的运行结果，还有汇总退出码规则。

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::core::config::{COVERAGE_KEY, RUNTIME_VERSION_KEY};
use crate::infra::t;

/// One concrete combination of runtime and library versions and flags.
///
/// The variable set is open: whatever keys the matrix entry declares are
/// handed to the hooks as environment variables, unchanged.
///
/// 运行时版本、库版本和标志的一个具体组合。
/// 变量集合是开放的：矩阵条目声明的任何键都会原样作为环境变量传递给钩子。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentConfiguration {
    /// Position in the full matrix, disabled entries included.
    /// 在完整矩阵中的位置，包括被禁用的条目。
    pub index: usize,
    /// Display label. / 显示名称。
    pub name: String,
    vars: BTreeMap<String, String>,
}

impl EnvironmentConfiguration {
    /// Creates a configuration. Without an explicit name, one is derived from
    /// the variables, e.g. `NUMPY_VERSION=1.8.2 runtimeVersion=2.7`.
    pub fn new(index: usize, name: Option<String>, vars: BTreeMap<String, String>) -> Self {
        let name = name.unwrap_or_else(|| {
            vars.iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ")
        });
        Self { index, name, vars }
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn runtime_version(&self) -> &str {
        self.get(RUNTIME_VERSION_KEY).unwrap_or_default()
    }

    pub fn coverage_enabled(&self) -> bool {
        self.get(COVERAGE_KEY) == Some("true")
    }
}

/// How a single hook invocation ended.
/// 单次钩子调用的结束方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepOutcome {
    Passed,
    /// Non-zero exit, or the hook could not be spawned (`exit_code: None`).
    /// 非零退出，或钩子无法启动（`exit_code: None`）。
    Failed { exit_code: Option<i32> },
    /// The step exceeded its timeout and was killed.
    /// 步骤超出超时时间并被终止。
    TimedOut,
    /// The run was interrupted (Ctrl-C) while the step was in flight.
    /// 步骤执行过程中运行被中断（Ctrl-C）。
    Cancelled,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Passed)
    }

    pub fn label(&self, locale: &str) -> String {
        match self {
            StepOutcome::Passed => t!("step.passed", locale = locale).to_string(),
            StepOutcome::Failed {
                exit_code: Some(code),
            } => t!("step.failed_code", locale = locale, code = code).to_string(),
            StepOutcome::Failed { exit_code: None } => {
                t!("step.failed", locale = locale).to_string()
            }
            StepOutcome::TimedOut => t!("step.timed_out", locale = locale).to_string(),
            StepOutcome::Cancelled => t!("step.cancelled", locale = locale).to_string(),
        }
    }
}

/// What one completed step left behind.
/// 一个已完成步骤留下的记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub outcome: StepOutcome,
    /// Total time across all attempts. / 所有尝试的总时间。
    pub duration: Duration,
    /// Combined stdout and stderr of the last attempt.
    /// 最后一次尝试的合并 stdout 和 stderr。
    pub output: String,
    /// 1 means the step ran once.
    pub attempts: u8,
}

/// Status of one pipeline step for one configuration.
/// 某个配置的某个流水线步骤的状态。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StepStatus {
    #[default]
    NotRun,
    Completed(StepReport),
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Completed(report) if report.outcome.is_success())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Completed(report) if !report.outcome.is_success())
    }

    pub fn was_run(&self) -> bool {
        matches!(self, StepStatus::Completed(_))
    }

    pub fn report(&self) -> Option<&StepReport> {
        match self {
            StepStatus::Completed(report) => Some(report),
            StepStatus::NotRun => None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.report().map(|r| r.duration).unwrap_or_default()
    }

    /// Short label for reports. / 用于报告的简短标签。
    pub fn label(&self, locale: &str) -> String {
        match self {
            StepStatus::NotRun => t!("step.not_run", locale = locale).to_string(),
            StepStatus::Completed(report) => report.outcome.label(locale),
        }
    }
}

/// Which step made a configuration fail.
/// 哪个步骤导致了配置失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    InstallFailed,
    TestFailed,
}

/// The fatal outcome of a configuration. Upload status never feeds into it.
/// 配置的致命结果。上传状态永远不会影响它。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Passed,
    Failed(FailureReason),
}

/// The terminal record of one configuration's pipeline.
/// 一个配置流水线的最终记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub config: EnvironmentConfiguration,
    pub install: StepStatus,
    pub test: StepStatus,
    /// Best-effort; recorded for observability only.
    /// 尽力而为；仅为可观察性而记录。
    pub upload: StepStatus,
}

impl RunResult {
    pub fn new(config: EnvironmentConfiguration) -> Self {
        Self {
            config,
            install: StepStatus::NotRun,
            test: StepStatus::NotRun,
            upload: StepStatus::NotRun,
        }
    }

    pub fn verdict(&self) -> Verdict {
        if !self.install.is_success() {
            Verdict::Failed(FailureReason::InstallFailed)
        } else if !self.test.is_success() {
            Verdict::Failed(FailureReason::TestFailed)
        } else {
            Verdict::Passed
        }
    }

    pub fn is_success(&self) -> bool {
        self.verdict() == Verdict::Passed
    }

    /// The upload ran and did not succeed. Never affects the verdict.
    /// 上传已运行但未成功。永远不会影响最终结论。
    pub fn upload_failed(&self) -> bool {
        self.upload.is_failure()
    }

    pub fn total_duration(&self) -> Duration {
        self.install.duration() + self.test.duration() + self.upload.duration()
    }

    /// The report of the step that decided a failed verdict.
    pub fn failing_step(&self) -> Option<&StepReport> {
        match self.verdict() {
            Verdict::Passed => None,
            Verdict::Failed(FailureReason::InstallFailed) => self.install.report(),
            Verdict::Failed(FailureReason::TestFailed) => self.test.report(),
        }
    }

    /// Gets the status of the result as a string for display.
    /// 以字符串形式获取结果的状态以供显示。
    pub fn status_str(&self, locale: &str) -> String {
        match self.verdict() {
            Verdict::Passed if self.upload_failed() => {
                t!("report.status_passed_upload_failed", locale = locale).to_string()
            }
            Verdict::Passed => t!("report.status_passed", locale = locale).to_string(),
            Verdict::Failed(FailureReason::InstallFailed) => {
                t!("report.status_install_failed", locale = locale).to_string()
            }
            Verdict::Failed(FailureReason::TestFailed) => {
                t!("report.status_test_failed", locale = locale).to_string()
            }
        }
    }

    /// Gets the appropriate CSS class for the result.
    pub fn status_class(&self) -> &'static str {
        match self.verdict() {
            Verdict::Passed if self.upload_failed() => "status-upload-failed",
            Verdict::Passed => "status-passed",
            Verdict::Failed(_) => "status-failed",
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.config.name, self.verdict())
    }
}

/// Zero iff every configuration's install and test steps succeeded.
/// Upload failures are ignored; an empty result set is vacuously successful.
///
/// 当且仅当每个配置的安装和测试步骤都成功时返回零。
/// 忽略上传失败；空结果集视为成功。
pub fn aggregate_exit_code(results: &[RunResult]) -> i32 {
    if results.iter().all(RunResult::is_success) {
        0
    } else {
        1
    }
}
