//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: validate the configuration, run
//! the benchmark pipeline and print the summaries.
//!
//! 此模块实现 `run` 命令：校验配置、运行基准测试流水线并打印摘要。

use anyhow::{Context, Result};
use colored::*;

use crate::{
    core::{config::AppConfig, pipeline::run_pipeline},
    infra::{Logger, command::ShellProbe},
    reporting::{print_report_summary, print_run_summary},
};

/// Executes the run command with a fully merged configuration.
///
/// # Returns
/// `Err` only for fatal problems (invalid configuration, missing launcher,
/// uncreatable result directory). Failed benchmarks are reported, not fatal.
pub async fn execute(config: AppConfig) -> Result<()> {
    config
        .validate()
        .context("Failed to init, wrong configuration, exiting..")?;

    println!("\n{}\n", config.banner().bold());

    let logger = Logger::new(config.log_level, Some(&config.log_file));
    logger.trace("Logging service is started..");

    let outcome = run_pipeline(&config, ShellProbe, logger.clone())
        .await
        .context("Exiting the testrun due to failed to run tests")?;

    print_run_summary(&outcome.summary, &outcome.writer);
    print_report_summary(&outcome.report, outcome.report_path.as_deref());

    if outcome.summary.completed() == 0 {
        println!(
            "\n{}",
            "No benchmark produced results; the report is empty.".yellow().bold()
        );
    } else {
        println!("\n{}", "Benchmark run finished.".green().bold());
    }
    Ok(())
}
