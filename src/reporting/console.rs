//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints run results to the console: a colored one-line-per-
//! configuration summary, and the captured output of every failing step.
//!
//! 此模块将运行结果打印到控制台：每个配置一行的彩色摘要，
//! 以及每个失败步骤的捕获输出。

use colored::*;

use crate::core::models::{FailureReason, RunResult, Verdict};
use crate::infra::t;

/// Prints a formatted summary of run results to the console.
///
/// 在控制台打印格式化的运行结果摘要。
///
/// # Output Format / 输出格式
/// ```text
/// --- Matrix Summary ---
///   - Status                 | Configuration                            | Install  | Test     | Upload   | Duration
///   - Passed                 | runtimeVersion=2.7 coverageEnabled=true  | passed   | passed   | failed   |   12.30s
///   - Install Failed         | runtimeVersion=3.5                       | exit 1   | not run  | not run  |    0.45s
/// ```
pub fn print_summary(results: &[RunResult], locale: &str) {
    println!("\n{}", t!("summary_banner", locale = locale).bold());

    for result in results {
        let status_str = result.status_str(locale);
        let status_colored = match result.verdict() {
            Verdict::Passed if result.upload_failed() => status_str.yellow(),
            Verdict::Passed => status_str.green(),
            Verdict::Failed(_) => status_str.red(),
        };

        println!(
            "  - {:<22} | {:<40} | {:<10} | {:<10} | {:<10} | {:>8.2}s",
            status_colored,
            result.config.name,
            result.install.label(locale),
            result.test.label(locale),
            result.upload.label(locale),
            result.total_duration().as_secs_f64()
        );
    }

    let passed = results.iter().filter(|r| r.is_success()).count();
    let upload_failures = results.iter().filter(|r| r.upload_failed()).count();
    println!(
        "\n{}",
        t!(
            "summary_counts",
            locale = locale,
            total = results.len(),
            passed = passed,
            failed = results.len() - passed
        )
    );
    if upload_failures > 0 {
        println!(
            "{}",
            t!("summary_upload_failures", locale = locale, count = upload_failures).yellow()
        );
    }
}

/// Prints the output of the step that failed each failing configuration.
/// Upload failures are not listed here; they never fail a configuration.
///
/// 打印导致每个失败配置失败的步骤的输出。
/// 上传失败不在此列出；它们永远不会使配置失败。
pub fn print_failure_details(results: &[RunResult], locale: &str) {
    let failures: Vec<_> = results.iter().filter(|r| !r.is_success()).collect();
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            failures.len(),
            result.status_str(locale).red(),
            result.config.name.cyan()
        );

        let log_header = match result.verdict() {
            Verdict::Failed(FailureReason::InstallFailed) => t!("install_log", locale = locale),
            _ => t!("test_log", locale = locale),
        };
        println!("\n--- {} ---\n", log_header.yellow());
        match result.failing_step() {
            Some(report) => println!("{}", report.output.trim_end()),
            None => println!("{}", t!("no_output", locale = locale)),
        }
        println!("\n{}", "-".repeat(80));
    }
}
