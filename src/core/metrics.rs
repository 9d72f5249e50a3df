//! # Metrics Feed Module / 指标输出模块
//!
//! Formats benchmark series into the line-oriented metrics block consumed by
//! the host's metrics agent, and appends it to an hour-bucketed file:
//!
//! ```text
//! --------------------------------------------
//! StartTime=<unix>
//! Host=<host>
//! Marketplace=<region>
//! Program=ec2-osu-benchmark-bw
//! Time=0
//! Metrics=<host>|<pktsize>|UniDirBWinMB=<value>,...
//! EOE
//! ```
//!
//! 将基准测试序列格式化为指标代理读取的按行格式，并追加到按小时滚动的文件中。

use chrono::{DateTime, Local, Timelike, Utc};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::PathBuf;

use crate::core::config::MetricsConfig;
use crate::core::error::RunError;
use crate::core::models::{BandwidthSample, BenchmarkReport};
use crate::infra::Logger;

pub const METRICS_SEPARATOR: &str = "--------------------------------------------";
pub const METRICS_PROGRAM: &str = "ec2-osu-benchmark-bw";
pub const UNIDIRECTIONAL_BW_METRIC: &str = "UniDirBWinMB";

/// Renders one metrics block for a bandwidth series.
///
/// Every entry is followed by a comma, the block ends with `EOE`.
pub fn format_bandwidth_block(
    start: DateTime<Utc>,
    host: &str,
    region: &str,
    metric_name: &str,
    samples: &[BandwidthSample],
) -> String {
    let mut block = format!(
        "{METRICS_SEPARATOR}\nStartTime={}\nHost={host}\nMarketplace={region}\nProgram={METRICS_PROGRAM}\nTime=0\nMetrics=",
        start.timestamp()
    );
    for sample in samples {
        let _ = write!(block, "{host}|{}|{metric_name}={:.6},", sample.pktsize, sample.bw);
    }
    block.push_str("\nEOE\n");
    block
}

/// `<prefix><YYYY-MM-DD>-<hour>`, so the file rolls over every hour.
pub fn metrics_file_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{prefix}{}-{}", now.format("%Y-%m-%d"), now.hour())
}

/// Appends metrics blocks to the hour-bucketed metrics file.
/// 将指标块追加到按小时滚动的指标文件。
#[derive(Debug, Clone)]
pub struct MetricsWriter {
    config: MetricsConfig,
    host_name: String,
    region: String,
    logger: Logger,
}

impl MetricsWriter {
    pub fn new(config: MetricsConfig, host_name: String, region: String, logger: Logger) -> Self {
        Self {
            config,
            host_name,
            region,
            logger,
        }
    }

    /// Creates the metrics directory. A failure is only logged; the append
    /// that follows reports its own error.
    pub fn setup_dir(&self) {
        if let Err(e) = fs::create_dir_all(&self.config.dir) {
            self.logger.error(format!(
                "Failed to create/open metrics dir : {}, metrics push may fail err : {e}",
                self.config.dir.display()
            ));
        }
    }

    /// The file a block written at `now` goes to.
    pub fn file_path(&self, now: DateTime<Local>) -> PathBuf {
        self.config
            .dir
            .join(metrics_file_name(&self.config.file_prefix, now))
    }

    /// Emits the unidirectional bandwidth series of `report`.
    ///
    /// Latency and bidirectional bandwidth are not part of the metrics feed.
    ///
    /// # Returns
    /// The metrics file the block was appended to.
    pub fn emit(&self, report: &BenchmarkReport) -> Result<PathBuf, RunError> {
        let block = format_bandwidth_block(
            report.timestamp,
            &self.host_name,
            &self.region,
            UNIDIRECTIONAL_BW_METRIC,
            &report.bandwidth,
        );
        self.append(&block, Local::now())
    }

    /// Appends `block` to the file for `now`; never truncates.
    pub fn append(&self, block: &str, now: DateTime<Local>) -> Result<PathBuf, RunError> {
        self.setup_dir();
        let path = self.file_path(now);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| RunError::io("Failed to create/open metrics file", &path, e))?;
        file.write_all(block.as_bytes())
            .map_err(|e| RunError::io("Failed to write results to metrics file", &path, e))?;
        Ok(path)
    }
}
