//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the benchmark runner:
//! data models, configuration, the result mailbox and writer, the command
//! sequencer, shutdown coordination and the report builder.
//!
//! 此模块包含基准测试运行器的核心功能：
//! 数据模型、配置、结果邮箱与写入器、命令序列器、关闭协调以及报告生成。

pub mod config;
pub mod error;
pub mod mailbox;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod sequencer;
pub mod shutdown;
pub mod writer;

// Re-exports
pub use config::AppConfig;
pub use error::RunError;
pub use models::{BenchmarkReport, RunSummary};
pub use pipeline::run_pipeline;
