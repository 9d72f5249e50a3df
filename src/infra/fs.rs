//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides the file system helpers used by the pipeline: creating
//! the per-run result directory, appending payloads to files and listing the
//! result files of a finished run.
//!
//! 此模块提供流水线使用的文件系统工具：创建每次运行的结果目录、
//! 向文件追加内容以及列出已完成运行的结果文件。

use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::core::config::RUN_TIMESTAMP_FORMAT;

/// Computes `<base>/<timestamp>/<pid>/` for a run started at `started`.
///
/// # Arguments
/// * `base` - Base output directory
/// * `started` - Wall-clock time the run was initialized
/// * `pid` - Process id of this run
pub fn result_dir_path(base: &Path, started: DateTime<Local>, pid: u32) -> PathBuf {
    base.join(started.format(RUN_TIMESTAMP_FORMAT).to_string())
        .join(pid.to_string())
}

/// Creates the result directory, including any missing parents.
pub fn create_result_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Appends `data` to `path`, creating the file if needed.
/// 将 `data` 追加到 `path`，必要时创建文件。
pub async fn append_to_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.flush().await
}

/// Lists the regular files directly under `dir`, sorted by file name.
///
/// # Returns
/// Full paths of the files; subdirectories are skipped.
///
/// 列出 `dir` 下的普通文件（按文件名排序），跳过子目录。
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
