//! # Matrix Execution Engine Module / 矩阵执行引擎模块
//!
//! This module runs the per-configuration pipeline (install, then test, then
//! an optional best-effort coverage upload) and fans it out over the whole
//! matrix with a bounded number of concurrent workers.
//!
//! 此模块运行每个配置的流水线（先安装，再测试，然后是可选的、尽力而为的
//! 覆盖率上传），并以有限数量的并发工作者将其扩展到整个矩阵。

use colored::*;
use futures::{StreamExt, stream};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::HookSettings,
        models::{EnvironmentConfiguration, RunResult, StepOutcome, StepReport, StepStatus},
    },
    infra::{
        command::{self, CommandLine, Completion},
        t,
    },
};

/// Everything a pipeline needs besides the configuration itself.
/// 除配置本身之外流水线所需的一切。
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub hooks: HookSettings,
    /// Working directory of every hook. / 每个钩子的工作目录。
    pub work_dir: PathBuf,
    /// Overrides `hooks.timeout_secs` when set.
    /// 设置后覆盖 `hooks.timeout_secs`。
    pub timeout_override: Option<Duration>,
    pub locale: String,
}

impl RunSettings {
    pub fn new(hooks: HookSettings, work_dir: PathBuf) -> Self {
        Self {
            hooks,
            work_dir,
            timeout_override: None,
            locale: "en".to_string(),
        }
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.timeout_override
            .or_else(|| self.hooks.timeout_secs.map(Duration::from_secs))
    }
}

/// The three hooks of a pipeline. / 流水线的三个钩子。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Install,
    Test,
    Upload,
}

impl Step {
    pub fn label(&self, locale: &str) -> String {
        match self {
            Step::Install => t!("step.install", locale = locale).to_string(),
            Step::Test => t!("step.test", locale = locale).to_string(),
            Step::Upload => t!("step.upload", locale = locale).to_string(),
        }
    }

    fn hook<'a>(&self, hooks: &'a HookSettings) -> &'a str {
        match self {
            Step::Install => &hooks.install,
            Step::Test => &hooks.test,
            Step::Upload => &hooks.upload,
        }
    }
}

/// Runs every configuration and returns the results in input order.
///
/// Configurations share nothing, so up to `jobs` of them run at once. A
/// failure in one never stops its siblings.
///
/// 运行每个配置并按输入顺序返回结果。
/// 配置之间不共享任何内容，因此最多可同时运行 `jobs` 个。
/// 一个配置的失败永远不会停止其他配置。
pub async fn run_all(
    configs: Vec<EnvironmentConfiguration>,
    settings: Arc<RunSettings>,
    jobs: usize,
    stop_token: CancellationToken,
) -> Vec<RunResult> {
    stream::iter(configs.into_iter().map(|config| {
        let settings = Arc::clone(&settings);
        let stop_token = stop_token.clone();
        let fallback = config.clone();

        async move {
            let handle = tokio::spawn(async move {
                run_configuration(config, &settings, &stop_token).await
            });
            match handle.await {
                Ok(result) => result,
                Err(e) => crashed_result(fallback, e),
            }
        }
    }))
    .buffered(jobs.max(1))
    .collect()
    .await
}

/// A worker task that panicked or was aborted still owes its configuration a
/// result: recorded as a failed install with the join error as output.
fn crashed_result(config: EnvironmentConfiguration, error: tokio::task::JoinError) -> RunResult {
    let mut result = RunResult::new(config);
    result.install = StepStatus::Completed(StepReport {
        outcome: StepOutcome::Failed { exit_code: None },
        duration: Duration::ZERO,
        output: format!("Critical error during execution: {error}"),
        attempts: 1,
    });
    result
}

/// Runs the pipeline of one configuration.
///
/// 1. install; a failure ends the pipeline
/// 2. test; only after a successful install
/// 3. upload; only if coverage is enabled and the test passed. Its failure is
///    reported but never turns the result into a failure.
///
/// 运行一个配置的流水线：安装失败则结束；安装成功后才运行测试；
/// 仅当启用覆盖率且测试通过时才上传，上传失败只报告，不会使结果变为失败。
pub async fn run_configuration(
    config: EnvironmentConfiguration,
    settings: &RunSettings,
    stop_token: &CancellationToken,
) -> RunResult {
    let locale = settings.locale.as_str();
    let mut result = RunResult::new(config);

    println!(
        "{}",
        t!("run.config_started", locale = locale, name = &result.config.name).blue()
    );

    let install = run_step(Step::Install, &result.config, settings, stop_token, 1).await;
    result.install = StepStatus::Completed(install);
    if !result.install.is_success() {
        println!(
            "{}",
            t!("run.install_failed", locale = locale, name = &result.config.name).red()
        );
        return result;
    }

    let test = run_step(Step::Test, &result.config, settings, stop_token, 1).await;
    result.test = StepStatus::Completed(test);
    if !result.test.is_success() {
        println!(
            "{}",
            t!("run.test_failed", locale = locale, name = &result.config.name).red()
        );
        return result;
    }

    if result.config.coverage_enabled() {
        let attempts = settings.hooks.upload_retries.saturating_add(1);
        let upload = run_step(Step::Upload, &result.config, settings, stop_token, attempts).await;
        result.upload = StepStatus::Completed(upload);
        if result.upload_failed() {
            println!(
                "{}",
                t!("run.upload_failed_ignored", locale = locale, name = &result.config.name)
                    .yellow()
            );
        }
    }

    println!(
        "{}",
        t!(
            "run.config_passed",
            locale = locale,
            name = &result.config.name,
            duration = format!("{:.2?}", result.total_duration())
        )
        .green()
    );
    result
}

/// Runs one hook with the configuration exported as environment variables,
/// retrying failed or timed-out attempts up to `max_attempts` in total.
///
/// 以配置导出的环境变量运行一个钩子，失败或超时的尝试最多重试到总计 `max_attempts` 次。
pub async fn run_step(
    step: Step,
    config: &EnvironmentConfiguration,
    settings: &RunSettings,
    stop_token: &CancellationToken,
    max_attempts: u8,
) -> StepReport {
    let locale = settings.locale.as_str();
    let max_attempts = max_attempts.max(1);
    let started = Instant::now();
    let mut attempt = 1;

    loop {
        let (outcome, output) = run_hook_once(step, config, settings, stop_token).await;

        let retryable = matches!(outcome, StepOutcome::Failed { .. } | StepOutcome::TimedOut);
        if !retryable || attempt >= max_attempts {
            println!(
                "{}",
                t!(
                    "run.step_finished",
                    locale = locale,
                    name = &config.name,
                    step = step.label(locale),
                    status = outcome.label(locale)
                )
                .dimmed()
            );
            return StepReport {
                outcome,
                duration: started.elapsed(),
                output,
                attempts: attempt,
            };
        }

        println!(
            "{}",
            t!(
                "run.step_retrying",
                locale = locale,
                name = &config.name,
                step = step.label(locale),
                attempt = attempt,
                retries = max_attempts - 1
            )
            .yellow()
        );
        attempt += 1;
    }
}

async fn run_hook_once(
    step: Step,
    config: &EnvironmentConfiguration,
    settings: &RunSettings,
    stop_token: &CancellationToken,
) -> (StepOutcome, String) {
    let hook = step.hook(&settings.hooks);
    let command_line = match CommandLine::parse(hook, config.vars()) {
        Ok(line) => line,
        Err(e) => return (StepOutcome::Failed { exit_code: None }, format!("{e:#}")),
    };

    let mut cmd = command_line.to_command();
    cmd.current_dir(&settings.work_dir)
        .envs(config.vars())
        .env("MATRIX_INDEX", config.index.to_string())
        .env("MATRIX_NAME", &config.name);

    let (completion, output) =
        command::spawn_and_capture(cmd, settings.step_timeout(), stop_token).await;
    let output = format!(
        "{} {}\n{}",
        t!("run.command_prefix", locale = &settings.locale),
        command_line.display,
        output
    );

    let outcome = match completion {
        Ok(Completion::Exited(status)) if status.success() => StepOutcome::Passed,
        Ok(Completion::Exited(status)) => StepOutcome::Failed {
            exit_code: status.code(),
        },
        Ok(Completion::TimedOut) => StepOutcome::TimedOut,
        Ok(Completion::Cancelled) => StepOutcome::Cancelled,
        Err(e) => {
            return (
                StepOutcome::Failed { exit_code: None },
                format!(
                    "{output}{}\n",
                    t!(
                        "run.spawn_failed",
                        locale = &settings.locale,
                        command = &command_line.display,
                        error = e
                    )
                ),
            );
        }
    };
    (outcome, output)
}
