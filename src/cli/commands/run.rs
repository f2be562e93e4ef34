//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: load the matrix, plan which
//! configurations run in this invocation, execute them, report, and turn the
//! results into the process exit code.
//!
//! 此模块实现 `run` 命令：加载矩阵，规划本次调用中运行哪些配置，执行它们，
//! 生成报告，并将结果转换为进程退出码。

use anyhow::{Context, Result};
use colored::*;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{self, Matrix},
        execution::{RunSettings, run_all},
        models::aggregate_exit_code,
        planner::{self, PlanOptions},
    },
    infra::{fs::resolve_dir, t},
    reporting::{
        console::{print_failure_details, print_summary},
        html::generate_html_report,
        json::generate_json_report,
    },
};

/// Arguments of the `run` command.
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Path to the matrix file / 矩阵文件路径
    pub config: PathBuf,
    /// Number of configurations run at once / 同时运行的配置数量
    pub jobs: Option<usize>,
    /// Working directory of the hooks / 钩子的工作目录
    pub work_dir: PathBuf,
    /// Branch the invocation runs for / 本次调用针对的分支
    pub branch: Option<String>,
    pub include_disabled: bool,
    /// Overrides the per-step timeout of the matrix file / 覆盖矩阵文件中的每步超时
    pub timeout_secs: Option<u64>,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Language chosen on the command line; wins over the matrix file.
    /// 命令行上选择的语言；优先于矩阵文件中的设置。
    pub lang_override: Option<String>,
}

impl RunArgs {
    pub fn new(config: PathBuf) -> Self {
        Self {
            config,
            jobs: None,
            work_dir: PathBuf::from("."),
            branch: None,
            include_disabled: false,
            timeout_secs: None,
            total_runners: None,
            runner_index: None,
            html: None,
            json: None,
            lang_override: None,
        }
    }
}

/// Executes the run command.
///
/// # Returns
/// The aggregate exit code of the matrix (`0` or `1`), or an error for fatal
/// setup problems such as an invalid matrix file. No hook runs in that case.
pub async fn execute(args: RunArgs) -> Result<u8> {
    let (matrix, config_path) = setup_and_parse_config(&args.config)?;
    let locale = args
        .lang_override
        .clone()
        .unwrap_or_else(|| crate::resolve_locale(&matrix.language));
    rust_i18n::set_locale(&locale);

    let work_dir = resolve_dir(&args.work_dir).with_context(|| {
        t!("work_dir_not_found", locale = &locale, path = args.work_dir.display()).to_string()
    })?;

    println!(
        "{}",
        t!("loading_matrix", locale = &locale, path = config_path.display())
    );
    println!(
        "{}",
        t!("work_dir_detected", locale = &locale, path = work_dir.display())
    );

    let plan = planner::plan_execution(
        &matrix,
        &PlanOptions {
            branch: args.branch.clone(),
            include_disabled: args.include_disabled,
            total_runners: args.total_runners,
            runner_index: args.runner_index,
        },
    )?;

    if plan.skipped_by_branch {
        let allowed = matrix
            .filter
            .as_ref()
            .map(|f| f.branches.join(", "))
            .unwrap_or_default();
        println!(
            "{}",
            t!(
                "skipped_by_branch",
                locale = &locale,
                branch = args.branch.as_deref().unwrap_or("-"),
                allowed = allowed
            )
            .yellow()
        );
        return Ok(0);
    }

    if plan.disabled_count > 0 {
        println!(
            "{}",
            t!("disabled_entries_skipped", locale = &locale, count = plan.disabled_count).cyan()
        );
    }

    if let (Some(total), Some(index)) = (args.total_runners, args.runner_index) {
        println!(
            "{}",
            t!(
                "running_as_split_runner",
                locale = &locale,
                index = index + 1,
                total = total,
                count = plan.configs_to_run.len()
            )
            .bold()
        );
    } else {
        println!(
            "{}",
            t!(
                "running_as_single_runner",
                locale = &locale,
                count = plan.configs_to_run.len()
            )
            .bold()
        );
    }

    if plan.configs_to_run.is_empty() {
        println!("{}", t!("no_configs_to_run", locale = &locale).green());
    }

    let stop_token = setup_signal_handler(&locale);
    let settings = Arc::new(build_settings(&matrix, &args, work_dir, &locale));
    let jobs = args.jobs.unwrap_or(num_cpus::get() / 2 + 1);

    let results = run_all(plan.configs_to_run, settings, jobs, stop_token).await;

    print_summary(&results, &locale);

    if let Some(report_path) = &args.html {
        println!(
            "\n{}",
            t!("generating_html_report", locale = &locale, path = report_path.display())
        );
        if let Err(e) = generate_html_report(&results, report_path, &locale) {
            eprintln!("{} {:#}", t!("report_failed", locale = &locale).red(), e);
        }
    }
    if let Some(report_path) = &args.json {
        println!(
            "\n{}",
            t!("generating_json_report", locale = &locale, path = report_path.display())
        );
        if let Err(e) = generate_json_report(&results, report_path) {
            eprintln!("{} {:#}", t!("report_failed", locale = &locale).red(), e);
        }
    }

    let exit_code = aggregate_exit_code(&results);
    if exit_code == 0 {
        println!("\n{}", t!("all_configs_passed", locale = &locale).green().bold());
    } else {
        print_failure_details(&results, &locale);
        println!("\n{}", t!("matrix_failed", locale = &locale).red().bold());
    }

    Ok(u8::try_from(exit_code).unwrap_or(1))
}

fn build_settings(matrix: &Matrix, args: &RunArgs, work_dir: PathBuf, locale: &str) -> RunSettings {
    let mut settings = RunSettings::new(matrix.hooks.clone(), work_dir);
    settings.timeout_override = args.timeout_secs.map(Duration::from_secs);
    settings.locale = locale.to_string();
    settings
}

/// Reads and validates the matrix file. Fails before any hook is spawned.
fn setup_and_parse_config(config_path_arg: &Path) -> Result<(Matrix, PathBuf)> {
    // The matrix may choose the language, so errors here use the startup locale.
    let config_path = std::fs::canonicalize(config_path_arg).with_context(|| {
        t!("config_read_failed_path", path = config_path_arg.display()).to_string()
    })?;

    let matrix = config::load_matrix(&config_path)
        .with_context(|| t!("config_parse_failed", path = config_path.display()).to_string())?;

    Ok((matrix, config_path))
}

/// Sets up a Ctrl-C handler that cancels every in-flight hook.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal", locale = &locale).yellow());
            token_clone.cancel();
        }
    });

    token
}
