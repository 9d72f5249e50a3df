//! # Logging Module / 日志模块
//!
//! An explicitly constructed logging handle. Each component receives a clone of
//! a `Logger` when it is built instead of reaching for a process-wide instance.
//! The handle owns its own `tracing` dispatcher, so two loggers with different
//! levels or sinks can live side by side in one process.
//!
//! 显式构造的日志句柄。每个组件在构建时获得一个 `Logger` 的克隆，
//! 而不是使用进程级的全局实例。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Log levels, numbered the way the command line accepts them.
/// 日志级别，编号与命令行接受的值一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LogLevel {
    Trace = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(LogLevel::Trace),
            2 => Ok(LogLevel::Info),
            3 => Ok(LogLevel::Warning),
            4 => Ok(LogLevel::Error),
            other => Err(format!("log level must be between 1 and 4, got {other}")),
        }
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level as u8
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A cheaply clonable, level-filtered logging handle.
///
/// Messages are emitted through the handle's own dispatcher; the global
/// `tracing` default is never touched.
///
/// 一个可廉价克隆、按级别过滤的日志句柄。
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Logs to `log_file` (append mode), or to stdout when no file is given or
    /// the file cannot be opened.
    ///
    /// 写入 `log_file`（追加模式）；若未提供文件或无法打开，则写入标准输出。
    pub fn new(level: LogLevel, log_file: Option<&Path>) -> Self {
        let file = log_file.and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        match file {
            Some(file) => Self::with_writer(level, Mutex::new(file)),
            None => Self::with_writer(level, io::stdout),
        }
    }

    /// Builds a logger on top of any `tracing-subscriber` writer.
    pub fn with_writer<W>(level: LogLevel, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level.as_filter())
            .with_ansi(false)
            .with_target(false)
            .with_writer(writer)
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// A logger that drops everything.
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    pub fn trace(&self, message: impl fmt::Display) {
        tracing::dispatcher::with_default(&self.dispatch, || tracing::trace!("{message}"));
    }

    pub fn info(&self, message: impl fmt::Display) {
        tracing::dispatcher::with_default(&self.dispatch, || tracing::info!("{message}"));
    }

    pub fn warning(&self, message: impl fmt::Display) {
        tracing::dispatcher::with_default(&self.dispatch, || tracing::warn!("{message}"));
    }

    pub fn error(&self, message: impl fmt::Display) {
        tracing::dispatcher::with_default(&self.dispatch, || tracing::error!("{message}"));
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
