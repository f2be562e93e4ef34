//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the matrix runner:
//! matrix loading, data models, planning and the execution pipeline.
//!
//! 此模块包含矩阵运行器的核心功能：
//! 矩阵加载、数据模型、执行计划和执行流水线。

pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod planner;

// Re-exports
pub use config::{Matrix, load_matrix};
pub use error::ConfigError;
pub use execution::{run_all, run_configuration};
pub use models::{RunResult, aggregate_exit_code};
