//! # OSU Runner Library / OSU Runner 库
//!
//! This library drives the OSU MPI micro-benchmarks (latency, unidirectional
//! bandwidth, bidirectional bandwidth) across the hosts of a hostfile, collects
//! their raw output and turns it into a JSON report and a metrics feed.
//!
//! 此库在 hostfile 中的主机上运行 OSU MPI 微基准测试（延迟、单向带宽、双向带宽），
//! 收集其原始输出，并将其转换为 JSON 报告和指标文件。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration and the benchmark pipeline
//! - `infra` - Child process execution, file system helpers and logging
//! - `reporting` - Console summaries
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、配置和基准测试流水线
//! - `infra` - 子进程执行、文件系统工具和日志
//! - `reporting` - 控制台摘要
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::models;
pub use crate::core::pipeline::run_pipeline;
