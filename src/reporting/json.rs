//! # JSON Reporting Module / JSON 报告模块
//!
//! A machine-readable report for downstream CI tooling.
//!
//! 供下游 CI 工具使用的机器可读报告。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::models::{RunResult, StepOutcome, StepStatus, Verdict, aggregate_exit_code};
use crate::infra::fs::write_creating_parents;

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub exit_code: i32,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub upload_failures: usize,
    pub configurations: Vec<JsonConfiguration<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonConfiguration<'a> {
    pub index: usize,
    pub name: &'a str,
    pub vars: &'a BTreeMap<String, String>,
    pub verdict: Verdict,
    pub install: JsonStep<'a>,
    pub test: JsonStep<'a>,
    pub upload: JsonStep<'a>,
}

#[derive(Debug, Serialize)]
pub struct JsonStep<'a> {
    pub ran: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<StepOutcome>,
    pub duration_secs: f64,
    pub attempts: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<&'a str>,
}

impl<'a> From<&'a StepStatus> for JsonStep<'a> {
    fn from(status: &'a StepStatus) -> Self {
        match status.report() {
            Some(report) => JsonStep {
                ran: true,
                outcome: Some(report.outcome),
                duration_secs: report.duration.as_secs_f64(),
                attempts: report.attempts,
                // Passing steps are noise in a machine report.
                output: (!report.outcome.is_success()).then_some(report.output.as_str()),
            },
            None => JsonStep {
                ran: false,
                outcome: None,
                duration_secs: 0.0,
                attempts: 0,
                output: None,
            },
        }
    }
}

/// Builds the report structure for `results`.
pub fn build_json_report(results: &[RunResult]) -> JsonReport<'_> {
    let passed = results.iter().filter(|r| r.is_success()).count();
    JsonReport {
        generated_at: Utc::now(),
        exit_code: aggregate_exit_code(results),
        total: results.len(),
        passed,
        failed: results.len() - passed,
        upload_failures: results.iter().filter(|r| r.upload_failed()).count(),
        configurations: results
            .iter()
            .map(|r| JsonConfiguration {
                index: r.config.index,
                name: &r.config.name,
                vars: r.config.vars(),
                verdict: r.verdict(),
                install: (&r.install).into(),
                test: (&r.test).into(),
                upload: (&r.upload).into(),
            })
            .collect(),
    }
}

/// Writes the JSON report for `results` to `output_path`.
pub fn generate_json_report(results: &[RunResult], output_path: &Path) -> Result<()> {
    let report = build_json_report(results);
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")?;
    write_creating_parents(output_path, json)
}
