//! # Reporting Module / 报告模块
//!
//! This module handles the generation and display of run reports in multiple
//! formats: a colored console summary, an HTML page and a JSON document.
//!
//! 此模块处理多种格式的运行报告的生成和显示：
//! 彩色控制台摘要、HTML 页面和 JSON 文档。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary};
pub use html::generate_html_report;
pub use json::generate_json_report;
