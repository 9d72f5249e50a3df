//! # Configuration Module / 配置模块
//!
//! Run configuration for the benchmark pipeline. Values come from the built-in
//! defaults, an optional TOML file and finally the command line, in that order.
//!
//! 基准测试流水线的运行配置。取值依次来自内置默认值、可选的 TOML 文件以及命令行。

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::RunError;
use crate::core::models::BenchmarkCommand;
use crate::infra::log::LogLevel;

pub const DEFAULT_PATH: &str = "/tmp/";
pub const DEFAULT_LOG_FILE: &str = "/tmp/osu-test.log";
pub const DEFAULT_MPI_COUNT: u32 = 2;
pub const DEFAULT_MPI_HOSTFILE: &str = "/tmp/hostfile";
pub const DEFAULT_LAUNCHER: &str = "mpirun";
pub const DEFAULT_METRICS_DIR: &str = "/tmp/osu-metrics/";
pub const DEFAULT_METRICS_FILE_PREFIX: &str = "osu-benchmark-metrics.";

/// Expecting at most this many results in flight at a time.
pub const RESULT_MAILBOX_CAPACITY: usize = 2000;

/// Layout of the timestamp segment in a result directory path, e.g.
/// `2023-01-02T03:04:05.000000+00:00`.
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// Accepts any number of fractional digits, including none.
pub const RUN_TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// The benchmark catalog, run in this order.
/// NOTE: the programs must live at these paths unless overridden in the config file.
pub const OSU_BENCHMARKS: [&str; 3] = [
    "/usr/local/libexec/osu-micro-benchmarks/mpi/pt2pt/osu_latency",
    "/usr/local/libexec/osu-micro-benchmarks/mpi/pt2pt/osu_bw",
    "/usr/local/libexec/osu-micro-benchmarks/mpi/pt2pt/osu_bibw",
];

/// Where the metrics feed is appended.
/// 指标文件的写入位置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_metrics_file_prefix")]
    pub file_prefix: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            dir: default_metrics_dir(),
            file_prefix: default_metrics_file_prefix(),
        }
    }
}

/// The complete configuration of one benchmark run.
///
/// Every field is optional in the TOML file; missing fields take the defaults
/// below.
///
/// 一次基准测试运行的完整配置。TOML 文件中的每个字段都是可选的。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Number of MPI processes/cores to run each benchmark with.
    /// 运行每个基准测试所用的 MPI 进程/核心数。
    pub mpi_count: u32,
    /// Hostfile listing every host taking part in the run.
    /// 列出参与运行的所有主机的 hostfile。
    pub hostfile: PathBuf,
    pub log_level: LogLevel,
    pub log_file: PathBuf,
    /// Base directory under which `<timestamp>/<pid>/` result directories are created.
    pub output_base: PathBuf,
    /// The MPI launcher. Its absence on the host is fatal.
    pub launcher: String,
    pub benchmarks: Vec<BenchmarkCommand>,
    pub mailbox_capacity: usize,
    pub host_name: String,
    pub region: String,
    pub metrics: MetricsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mpi_count: DEFAULT_MPI_COUNT,
            hostfile: PathBuf::from(DEFAULT_MPI_HOSTFILE),
            log_level: LogLevel::Trace,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            output_base: PathBuf::from(DEFAULT_PATH),
            launcher: DEFAULT_LAUNCHER.to_string(),
            benchmarks: OSU_BENCHMARKS.into_iter().map(BenchmarkCommand::new).collect(),
            mailbox_capacity: RESULT_MAILBOX_CAPACITY,
            host_name: env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "unknown".to_string()),
            metrics: MetricsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads a configuration file, filling in defaults for missing fields.
    /// 加载配置文件，为缺失的字段填充默认值。
    pub fn from_file(path: &Path) -> Result<Self, RunError> {
        let content =
            fs::read_to_string(path).map_err(|e| RunError::io("Failed to read config file", path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, RunError> {
        let mut config: AppConfig = toml::from_str(content)
            .map_err(|e| RunError::InvalidConfig(format!("failed to parse config file: {e}")))?;
        config.expand_paths()?;
        Ok(config)
    }

    /// Expands `~` and environment variables in every path-like field.
    pub fn expand_paths(&mut self) -> Result<(), RunError> {
        self.hostfile = expand_path(&self.hostfile)?;
        self.log_file = expand_path(&self.log_file)?;
        self.output_base = expand_path(&self.output_base)?;
        self.metrics.dir = expand_path(&self.metrics.dir)?;
        self.benchmarks = self
            .benchmarks
            .iter()
            .map(|cmd| expand_path(cmd.path()).map(BenchmarkCommand::new))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    /// Checks the settings a run cannot proceed without.
    /// 检查运行所必需的设置。
    pub fn validate(&self) -> Result<(), RunError> {
        if !self.hostfile.exists() {
            return Err(RunError::InvalidConfig(format!(
                "Hostfile is not present, cannot run tests: {}",
                self.hostfile.display()
            )));
        }
        if self.mpi_count == 0 {
            return Err(RunError::InvalidConfig(
                "process count must be at least 1".to_string(),
            ));
        }
        if self.mailbox_capacity == 0 {
            return Err(RunError::InvalidConfig(
                "mailbox capacity must be at least 1".to_string(),
            ));
        }
        if self.benchmarks.is_empty() {
            return Err(RunError::InvalidConfig(
                "benchmark catalog is empty".to_string(),
            ));
        }
        if self.launcher.trim().is_empty() {
            return Err(RunError::InvalidConfig("launcher is empty".to_string()));
        }
        Ok(())
    }

    /// The one-line banner printed before a run starts.
    pub fn banner(&self) -> String {
        format!(
            "*** Running test with cores/processes : {} , hostfile : {} LogFile : {}, LogLevel {} ***",
            self.mpi_count,
            self.hostfile.display(),
            self.log_file.display(),
            self.log_level
        )
    }
}

fn expand_path(path: &Path) -> Result<PathBuf, RunError> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map_err(|e| RunError::InvalidConfig(format!("failed to expand path {raw}: {e}")))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn default_metrics_dir() -> PathBuf {
    PathBuf::from(DEFAULT_METRICS_DIR)
}

fn default_metrics_file_prefix() -> String {
    DEFAULT_METRICS_FILE_PREFIX.to_string()
}
