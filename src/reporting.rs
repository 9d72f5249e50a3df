//! # Reporting Module / 报告模块
//!
//! This module prints colorful, formatted summaries of a benchmark run and of
//! the report generated from it to the console.
//!
//! 此模块在控制台打印基准测试运行及其生成报告的彩色格式化摘要。

pub mod console;

// Re-export common reporting functions
pub use console::{print_report_summary, print_run_summary};
