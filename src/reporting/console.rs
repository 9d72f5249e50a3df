//! # Console Reporting Module / 控制台报告模块
//!
//! Prints colorful summaries of a run: one line per benchmark with its outcome
//! and duration, followed by the series counts of the generated report.
//!
//! 在控制台打印运行的彩色摘要：每个基准测试一行，显示结果和耗时，随后显示报告中各序列的条目数。

use colored::*;
use std::path::Path;

use crate::core::models::{
    BenchmarkKind, BenchmarkOutcome, BenchmarkReport, RunSummary, WriterStats,
};

/// Prints the per-benchmark outcome table of a run.
///
/// # Arguments / 参数
/// * `summary` - Outcomes in catalog order / 按目录顺序排列的结果
/// * `writer` - Counters reported by the result writer / 结果写入器的计数
pub fn print_run_summary(summary: &RunSummary, writer: &WriterStats) {
    println!("\n{}", "Benchmark Summary".bold());
    println!("{}", "-".repeat(80));

    for (benchmark, outcome) in &summary.outcomes {
        let duration_str = outcome
            .duration()
            .map(|d| format!("{:.2}s", d.as_secs_f64()))
            .unwrap_or_else(|| "-".to_string());

        let (status, detail) = match outcome {
            BenchmarkOutcome::Completed { destination, .. } => {
                ("COMPLETED".green(), destination.display().to_string())
            }
            BenchmarkOutcome::Skipped => ("SKIPPED".yellow(), "not found on this host".to_string()),
            BenchmarkOutcome::Failed { reason, .. } => ("FAILED".red(), reason.clone()),
        };

        println!(
            "  - {:<18} | {:<20} | {:>10} | {}",
            status,
            benchmark.base_name(),
            duration_str,
            detail.dimmed()
        );
    }

    println!("{}", "-".repeat(80));
    println!(
        "  {} completed, {} skipped, {} failed; {} result file(s) written, {} write failure(s)",
        summary.completed().to_string().green(),
        summary.skipped().to_string().yellow(),
        summary.failed().to_string().red(),
        writer.written,
        writer.failed
    );
}

/// Prints where the report went and how many samples each series holds.
/// Empty series are highlighted since they usually mean a benchmark did not run.
///
/// # Arguments / 参数
/// * `report_path` - The JSON file, `None` if it could not be written / JSON 文件，写入失败时为 `None`
pub fn print_report_summary(report: &BenchmarkReport, report_path: Option<&Path>) {
    match report_path {
        Some(path) => println!("\n{} {}", "Report written to".cyan(), path.display()),
        None => println!("\n{}", "Report could not be written, see the log".red().bold()),
    }
    println!("  timestamp: {}", report.timestamp.to_rfc3339());

    for kind in [
        BenchmarkKind::Latency,
        BenchmarkKind::Bandwidth,
        BenchmarkKind::BiBandwidth,
    ] {
        let count = report.series_len(kind);
        let count_str = if count == 0 {
            "no data".red()
        } else {
            format!("{count} samples").green()
        };
        println!("  {:<26} {}", format!("{kind}:"), count_str);
    }
}
