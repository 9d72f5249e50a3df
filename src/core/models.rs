//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures that flow through the benchmark
//! pipeline: the benchmark catalog entries, the envelopes carried by the result
//! mailbox, the records parsed from benchmark output and the final report.
//!
//! 此模块定义了在基准测试流水线中流转的数据结构：基准测试目录条目、
//! 结果邮箱传递的信封、从输出中解析出的记录以及最终报告。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The three kinds of measurement the benchmark catalog produces.
/// 基准测试目录产生的三种测量类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BenchmarkKind {
    /// Point-to-point latency (`osu_latency`).
    Latency,
    /// Unidirectional bandwidth (`osu_bw`).
    Bandwidth,
    /// Bidirectional bandwidth (`osu_bibw`).
    BiBandwidth,
}

impl BenchmarkKind {
    /// Classifies a result file by its name.
    ///
    /// `latency` is checked first, then `bibw`, then `bw`, so a name containing
    /// `bibw` is never unidirectional. Names matching nothing are ignored (`None`).
    ///
    /// 根据文件名对结果文件进行分类。包含 `bibw` 的名称始终被视为双向带宽。
    pub fn classify(file_name: &str) -> Option<Self> {
        if file_name.contains("latency") {
            Some(BenchmarkKind::Latency)
        } else if file_name.contains("bibw") {
            Some(BenchmarkKind::BiBandwidth)
        } else if file_name.contains("bw") {
            Some(BenchmarkKind::Bandwidth)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BenchmarkKind::Latency => "latency",
            BenchmarkKind::Bandwidth => "unidirectional bandwidth",
            BenchmarkKind::BiBandwidth => "bidirectional bandwidth",
        }
    }
}

impl fmt::Display for BenchmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One external benchmark program from the catalog, identified by its path.
/// 目录中的一个外部基准测试程序，由其路径标识。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkCommand {
    path: PathBuf,
}

impl BenchmarkCommand {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The program's base name, e.g. `osu_bw` for `/usr/.../pt2pt/osu_bw`.
    pub fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Where this benchmark's output lands inside `result_dir`.
    pub fn result_file(&self, result_dir: &Path) -> PathBuf {
        result_dir.join(format!("{}.txt", self.base_name()))
    }
}

impl fmt::Display for BenchmarkCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Captured benchmark output paired with the file it must be written to.
/// Created once by the sequencer and consumed exactly once by the writer.
///
/// 捕获的基准测试输出及其目标文件路径。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEnvelope {
    payload: String,
    destination: PathBuf,
}

impl ResultEnvelope {
    pub fn new(payload: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            payload: payload.into(),
            destination: destination.into(),
        }
    }

    /// Builds the envelope for `command`'s output, placing it under `result_dir`.
    pub fn for_benchmark(command: &BenchmarkCommand, result_dir: &Path, payload: String) -> Self {
        Self::new(payload, command.result_file(result_dir))
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// A `(packet size, value)` pair parsed from one data line of benchmark output.
/// 从基准测试输出的一行数据中解析出的 `(包大小, 值)` 对。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    pub packet_size: i64,
    pub value: f64,
}

/// A bandwidth measurement in MB/s as it appears in the JSON report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandwidthSample {
    pub bw: f64,
    pub pktsize: i64,
}

impl From<RawRecord> for BandwidthSample {
    fn from(record: RawRecord) -> Self {
        Self {
            bw: record.value,
            pktsize: record.packet_size,
        }
    }
}

/// A latency measurement in microseconds as it appears in the JSON report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySample {
    pub latency: f64,
    pub pktsize: i64,
}

impl From<RawRecord> for LatencySample {
    fn from(record: RawRecord) -> Self {
        Self {
            latency: record.value,
            pktsize: record.packet_size,
        }
    }
}

/// The aggregated, timestamped result of one full run.
/// Series for benchmarks that did not produce output are empty.
///
/// 一次完整运行的聚合结果（带时间戳）。未产生输出的基准测试对应的序列为空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "OsuBW", default)]
    pub bandwidth: Vec<BandwidthSample>,
    #[serde(rename = "OsuBiBW", default)]
    pub bi_bandwidth: Vec<BandwidthSample>,
    #[serde(rename = "OsuLatency", default)]
    pub latency: Vec<LatencySample>,
}

impl BenchmarkReport {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            bandwidth: Vec::new(),
            bi_bandwidth: Vec::new(),
            latency: Vec::new(),
        }
    }

    /// Stores `records` as the series for `kind`, replacing any previous series.
    pub fn set_series(&mut self, kind: BenchmarkKind, records: Vec<RawRecord>) {
        match kind {
            BenchmarkKind::Latency => {
                self.latency = records.into_iter().map(LatencySample::from).collect()
            }
            BenchmarkKind::Bandwidth => {
                self.bandwidth = records.into_iter().map(BandwidthSample::from).collect()
            }
            BenchmarkKind::BiBandwidth => {
                self.bi_bandwidth = records.into_iter().map(BandwidthSample::from).collect()
            }
        }
    }

    pub fn series_len(&self, kind: BenchmarkKind) -> usize {
        match kind {
            BenchmarkKind::Latency => self.latency.len(),
            BenchmarkKind::Bandwidth => self.bandwidth.len(),
            BenchmarkKind::BiBandwidth => self.bi_bandwidth.len(),
        }
    }
}

/// What happened to a single catalog entry during a run.
/// 单个目录条目在运行期间的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkOutcome {
    /// The benchmark ran and its output was handed to the result writer.
    Completed {
        destination: PathBuf,
        duration: Duration,
    },
    /// The benchmark program is not present on this host.
    Skipped,
    /// The benchmark could not be started or exited unsuccessfully.
    Failed { reason: String, duration: Duration },
}

impl BenchmarkOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, BenchmarkOutcome::Completed { .. })
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            BenchmarkOutcome::Completed { duration, .. }
            | BenchmarkOutcome::Failed { duration, .. } => Some(*duration),
            BenchmarkOutcome::Skipped => None,
        }
    }
}

/// Per-benchmark outcomes of one pass over the catalog, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(BenchmarkCommand, BenchmarkOutcome)>,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_completed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, BenchmarkOutcome::Skipped))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, BenchmarkOutcome::Failed { .. }))
            .count()
    }
}

/// Counters reported by the result writer when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: usize,
    pub failed: usize,
}
