//! # Report Builder Module / 报告生成模块
//!
//! Turns the text files of a finished run into a `BenchmarkReport`, writes it
//! as indented JSON next to the results and feeds the metrics file.
//!
//! Benchmark output looks like this; `#` lines are headers, data lines carry a
//! packet size and a measurement:
//!
//! ```text
//! # OSU MPI Bandwidth Test v5.6.2
//! # Size      Bandwidth (MB/s)
//! 1                       6.09
//! 2                      15.37
//! ```
//!
//! 将一次已完成运行的文本文件转换为 `BenchmarkReport`，以缩进 JSON 写入结果目录，
//! 并写入指标文件。

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::RUN_TIMESTAMP_PARSE_FORMAT;
use crate::core::error::RunError;
use crate::core::metrics::MetricsWriter;
use crate::core::models::{BenchmarkKind, BenchmarkReport, RawRecord};
use crate::infra::{Logger, fs as infra_fs};

pub const REPORT_FILE_NAME: &str = "osu-report.json";

/// Parses one line of benchmark output.
///
/// Comment lines and lines with fewer than two fields yield `None`. A field
/// that does not parse as a number becomes zero rather than dropping the line.
///
/// 解析基准测试输出的一行。注释行和字段少于两个的行返回 `None`；
/// 无法解析的数值字段按零处理。
pub fn parse_record_line(line: &str) -> Option<RawRecord> {
    if line.starts_with('#') {
        return None;
    }
    let mut fields = line.split_whitespace();
    let (Some(size), Some(value)) = (fields.next(), fields.next()) else {
        return None;
    };
    Some(RawRecord {
        packet_size: size.parse().unwrap_or(0),
        value: value.parse().unwrap_or(0.0),
    })
}

/// Parses every data line of a benchmark output, in order.
pub fn parse_records(text: &str) -> Vec<RawRecord> {
    text.lines().filter_map(parse_record_line).collect()
}

/// Finds the run timestamp in `result_dir`'s path.
///
/// Result directories look like `<base>/<timestamp>/<pid>/`, so the segments
/// are tried from the end and the first one that parses wins.
///
/// 从 `result_dir` 路径中提取运行时间戳，从末尾开始逐段尝试解析。
pub fn run_timestamp(result_dir: &Path) -> Option<DateTime<Utc>> {
    result_dir.components().rev().find_map(|component| {
        let segment = component.as_os_str().to_str()?;
        DateTime::parse_from_str(segment, RUN_TIMESTAMP_PARSE_FORMAT)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    })
}

/// The report of one result directory and where it ended up.
/// A `None` path means that output could not be written.
#[derive(Debug, Clone)]
pub struct BuiltReport {
    pub report: BenchmarkReport,
    pub json_path: Option<PathBuf>,
    pub metrics_path: Option<PathBuf>,
}

/// Builds the JSON report and metrics feed for one result directory.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    logger: Logger,
    metrics: MetricsWriter,
}

impl ReportBuilder {
    pub fn new(logger: Logger, metrics: MetricsWriter) -> Self {
        Self { logger, metrics }
    }

    /// Collects the report, writes `<result_dir>/osu-report.json` and appends
    /// the metrics block. A JSON failure is logged and the metrics block is
    /// still written.
    ///
    /// # Errors
    /// Only when `result_dir` cannot be listed.
    ///
    /// 收集报告、写入 JSON 文件并追加指标块。JSON 写入失败只记录日志，指标块仍会写入。
    pub fn build(&self, result_dir: &Path) -> Result<BuiltReport, RunError> {
        let report = self.collect(result_dir)?;

        let json_path = match self.write_json(&report, result_dir) {
            Ok(path) => {
                self.logger
                    .info(format!("Report written to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                self.logger
                    .error(format!("Failed to write to json file: {e}"));
                None
            }
        };

        let metrics_path = match self.metrics.emit(&report) {
            Ok(path) => {
                self.logger
                    .info(format!("Metrics appended to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                self.logger.error(e);
                None
            }
        };

        Ok(BuiltReport {
            report,
            json_path,
            metrics_path,
        })
    }

    /// Reads and classifies every result file of `result_dir`.
    pub fn collect(&self, result_dir: &Path) -> Result<BenchmarkReport, RunError> {
        let files = infra_fs::list_files(result_dir).map_err(|e| {
            self.logger.error(format!(
                "Failed to get all the results files in {}",
                result_dir.display()
            ));
            RunError::io("Failed to list result directory", result_dir, e)
        })?;

        let timestamp = run_timestamp(result_dir).unwrap_or_else(|| {
            self.logger.warning(format!(
                "No run timestamp in {}, using the Unix epoch",
                result_dir.display()
            ));
            DateTime::<Utc>::default()
        });
        let mut report = BenchmarkReport::new(timestamp);

        for path in files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(kind) = BenchmarkKind::classify(name) else {
                continue;
            };
            match self.read_records(&path) {
                Ok(records) => {
                    self.logger.info(format!(
                        "Processing of {kind} results is complete ({} records)",
                        records.len()
                    ));
                    report.set_series(kind, records);
                }
                Err(e) => self.logger.error(e),
            }
        }
        Ok(report)
    }

    fn read_records(&self, path: &Path) -> Result<Vec<RawRecord>, RunError> {
        let bytes = fs::read(path).map_err(|e| RunError::io("Failed to open file", path, e))?;
        Ok(parse_records(&String::from_utf8_lossy(&bytes)))
    }

    /// Serializes `report` as indented JSON into `result_dir`.
    pub fn write_json(&self, report: &BenchmarkReport, result_dir: &Path) -> Result<PathBuf, RunError> {
        let json = serde_json::to_string_pretty(report)?;
        let path = result_dir.join(REPORT_FILE_NAME);
        fs::write(&path, json).map_err(|e| RunError::io("Failed to write report", &path, e))?;
        Ok(path)
    }
}
