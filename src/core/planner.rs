//! # Execution Planner Module / 执行计划模块
//!
//! This module decides which configurations of a loaded matrix actually run
//! in this invocation: the branch filter, disabled entries, and splitting the
//! matrix across several CI runners. Matrix order is always preserved.
//!
//! 此模块决定已加载矩阵中的哪些配置在本次调用中实际运行：分支过滤、
//! 被禁用的条目，以及将矩阵拆分到多个 CI 运行器。矩阵顺序始终保持不变。

use anyhow::{Result, bail};

use crate::core::config::Matrix;
use crate::core::models::EnvironmentConfiguration;

/// Invocation context that shapes the plan.
/// 影响执行计划的调用上下文。
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// The branch or ref the invocation runs for, if known.
    /// 本次调用所针对的分支或引用（如果已知）。
    pub branch: Option<String>,
    /// Run entries marked `enabled = false` too.
    /// 同时运行标记为 `enabled = false` 的条目。
    pub include_disabled: bool,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
}

/// Represents a complete execution plan for a matrix.
/// 表示矩阵的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Configurations to run, in matrix order.
    /// 要运行的配置，按矩阵顺序排列。
    pub configs_to_run: Vec<EnvironmentConfiguration>,
    /// True when the branch filter rejected this invocation.
    /// 当分支过滤器拒绝本次调用时为真。
    pub skipped_by_branch: bool,
    /// Entries left out because they are disabled.
    /// 因被禁用而排除的条目数。
    pub disabled_count: usize,
    /// Whether the configurations are split across multiple runners.
    /// 配置是否分布在多个运行器上。
    pub is_distributed: bool,
}

/// Creates an execution plan for the given matrix.
///
/// # Arguments
/// * `matrix` - The validated matrix
/// * `options` - Branch context, disabled-entry policy and runner split
///
/// # Returns
/// An `ExecutionPlan`, or an error when the runner split is inconsistent.
pub fn plan_execution(matrix: &Matrix, options: &PlanOptions) -> Result<ExecutionPlan> {
    let is_distributed = match (options.total_runners, options.runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 || index >= total {
                bail!("Runner index must be less than total runners.");
            }
            true
        }
        (None, None) => false,
        _ => bail!("Both --total-runners and --runner-index must be provided."),
    };

    if let Some(filter) = &matrix.filter {
        if !filter.allows(options.branch.as_deref()) {
            return Ok(ExecutionPlan {
                configs_to_run: Vec::new(),
                skipped_by_branch: true,
                disabled_count: 0,
                is_distributed,
            });
        }
    }

    let (active, disabled): (Vec<_>, Vec<_>) = matrix
        .entries
        .iter()
        .partition(|entry| entry.enabled || options.include_disabled);

    let configs_to_run = active
        .into_iter()
        .enumerate()
        .filter(|(position, _)| match (options.total_runners, options.runner_index) {
            (Some(total), Some(index)) => position % total == index,
            _ => true,
        })
        .map(|(_, entry)| entry.config.clone())
        .collect();

    Ok(ExecutionPlan {
        configs_to_run,
        skipped_by_branch: false,
        disabled_count: disabled.len(),
        is_distributed,
    })
}
