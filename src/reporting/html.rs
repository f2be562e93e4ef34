//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders a self-contained HTML page with summary statistics,
//! one row per configuration, and collapsible step output for failures.
//!
//! 此模块生成一个独立的 HTML 页面，包含汇总统计、每个配置一行，
//! 以及失败时可折叠的步骤输出。

use anyhow::Result;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::Path;

use crate::core::models::{RunResult, StepStatus};
use crate::infra::{fs::write_creating_parents, t};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", sans-serif; margin: 2em; color: #222; }
.summary-container { display: flex; gap: 2em; margin-bottom: 2em; }
.summary-item { display: flex; flex-direction: column; align-items: center; }
.count { font-size: 2em; font-weight: bold; }
.passed-text { color: #2e7d32; } .failed-text { color: #c62828; } .warning-text { color: #ef6c00; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #ddd; padding: 0.5em; text-align: left; vertical-align: top; }
.status-cell { display: inline-block; padding: 0.2em 0.6em; border-radius: 4px; color: #fff; }
.status-passed { background: #2e7d32; } .status-failed { background: #c62828; } .status-upload-failed { background: #ef6c00; }
.vars { font-family: monospace; font-size: 0.85em; color: #555; }
.duration-cell { text-align: right; }
pre.output-content { background: #f6f8fa; padding: 1em; overflow-x: auto; white-space: pre-wrap; }
"#;

/// Generates an HTML report from run results and writes it to `output_path`.
///
/// 从运行结果生成 HTML 报告并写入 `output_path`。
///
/// # Errors / 错误
/// Returns an error if the file (or its parent directory) cannot be written.
/// 如果无法写入文件（或其父目录），则返回错误。
pub fn generate_html_report(results: &[RunResult], output_path: &Path, locale: &str) -> Result<()> {
    let markup = render_html_report(results, locale);
    write_creating_parents(output_path, markup.into_string())
}

/// Renders the report without touching the file system.
pub fn render_html_report(results: &[RunResult], locale: &str) -> Markup {
    let total = results.len();
    let passed = results.iter().filter(|r| r.is_success()).count();
    let upload_failed = results.iter().filter(|r| r.upload_failed()).count();

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale)) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", locale = locale)) }
                div.summary-container {
                    (summary_item(total, "", &t!("html_report.summary.total", locale = locale)))
                    (summary_item(passed, "passed-text", &t!("html_report.summary.passed", locale = locale)))
                    (summary_item(total - passed, "failed-text", &t!("html_report.summary.failed", locale = locale)))
                    (summary_item(upload_failed, "warning-text", &t!("html_report.summary.upload_failed", locale = locale)))
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.table.configuration", locale = locale)) }
                            th { (t!("html_report.table.status", locale = locale)) }
                            th { (t!("step.install", locale = locale)) }
                            th { (t!("step.test", locale = locale)) }
                            th { (t!("step.upload", locale = locale)) }
                            th.duration-cell { (t!("html_report.table.duration", locale = locale)) }
                        }
                    }
                    tbody {
                        @for result in results {
                            (result_row(result, locale))
                        }
                    }
                }
            }
        }
    }
}

fn summary_item(count: usize, class: &str, label: &str) -> Markup {
    html! {
        div.summary-item {
            span class={ "count " (class) } { (count) }
            span.label { (label) }
        }
    }
}

fn result_row(result: &RunResult, locale: &str) -> Markup {
    let vars = result
        .config
        .vars()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ");

    html! {
        tr {
            td {
                div { (result.config.name) }
                div.vars { (vars) }
            }
            td {
                div class={ "status-cell " (result.status_class()) } { (result.status_str(locale)) }
            }
            td { (step_cell(&result.install, locale)) }
            td { (step_cell(&result.test, locale)) }
            td { (step_cell(&result.upload, locale)) }
            td.duration-cell { (format!("{:.2}s", result.total_duration().as_secs_f64())) }
        }
    }
}

/// A step label, with the captured output folded underneath when it failed.
fn step_cell(status: &StepStatus, locale: &str) -> Markup {
    html! {
        @match status.report() {
            Some(report) if status.is_failure() => {
                details {
                    summary { (status.label(locale)) }
                    pre.output-content { (report.output) }
                }
            }
            _ => { (status.label(locale)) }
        }
    }
}
