//! # Report Command Module / 报告命令模块
//!
//! Rebuilds `osu-report.json` and the metrics block from the result directory
//! of an earlier run, e.g. after the runner was interrupted.
//!
//! 根据之前运行的结果目录重新生成 `osu-report.json` 和指标块。

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::{
    core::{config::AppConfig, metrics::MetricsWriter, report::ReportBuilder},
    infra::Logger,
    reporting::print_report_summary,
};

pub fn execute(config: AppConfig, result_dir: PathBuf) -> Result<()> {
    if !result_dir.is_dir() {
        anyhow::bail!("Result directory not found: {}", result_dir.display());
    }

    let logger = Logger::new(config.log_level, Some(&config.log_file));
    let metrics = MetricsWriter::new(
        config.metrics.clone(),
        config.host_name.clone(),
        config.region.clone(),
        logger.clone(),
    );

    let built = ReportBuilder::new(logger, metrics)
        .build(&result_dir)
        .with_context(|| format!("Failed to build report for {}", result_dir.display()))?;

    print_report_summary(&built.report, built.json_path.as_deref());
    Ok(())
}
