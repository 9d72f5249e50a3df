//! # Error Module / 错误模块
//!
//! Typed failures raised by the benchmark pipeline. Only `CommandNotFound`,
//! directory-creation `Io` failures and `InvalidConfig` abort a run; the rest
//! are reported per item and the run carries on.
//!
//! 基准测试流水线产生的类型化错误。

use std::io;
use std::path::{Path, PathBuf};

/// Errors produced by the core components.
/// 核心组件产生的错误。
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A required executable (usually the MPI launcher) is not on this host.
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("{context} ({}): {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The result writer went away while benchmarks were still producing output.
    #[error("Result mailbox is closed, the result writer has exited")]
    MailboxClosed,

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl RunError {
    pub fn io(context: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        RunError::Io {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
