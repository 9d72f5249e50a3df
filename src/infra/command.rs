//! # Command Execution Module / 命令执行模块
//!
//! Child process plumbing: the capability probe that decides whether a program
//! can be invoked on this host, shell invocation with combined output capture,
//! and the quoting used to assemble shell command lines.
//!
//! 子进程相关工具：判断程序能否在本机调用的能力探测、
//! 合并输出捕获的 shell 调用，以及拼装 shell 命令行所用的转义。

use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Answers whether a named program is invocable on the current host.
///
/// A `false` answer is an ordinary outcome, never an error.
///
/// 回答某个程序能否在当前主机上调用。返回 `false` 是正常结果，而非错误。
pub trait CapabilityProbe: Send + Sync {
    fn exists(&self, name: &str) -> impl Future<Output = bool> + Send;
}

/// Probes with `command -v` through `/bin/sh`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellProbe;

impl CapabilityProbe for ShellProbe {
    async fn exists(&self, name: &str) -> bool {
        let Ok(quoted) = shlex::try_quote(name) else {
            return false;
        };
        Command::new("/bin/sh")
            .arg("-c")
            .arg(format!("command -v {quoted}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Joins `parts` into one shell command line, quoting each part as needed.
/// Returns `None` if a part cannot be quoted (it contains a NUL byte).
///
/// 将 `parts` 拼接为一条 shell 命令行，并按需转义每个部分。
pub fn shell_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    shlex::try_join(parts).ok()
}

/// Runs `command_line` through `sh -c` and captures its combined output.
pub async fn run_shell(command_line: &str) -> (std::io::Result<ExitStatus>, String) {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command_line)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    spawn_and_capture(cmd).await
}

/// Spawns a command and captures its stdout and stderr.
/// The output streams are read concurrently as raw bytes and combined line by
/// line, in the order the lines arrive. Bytes are kept exactly as the program
/// wrote them; invalid UTF-8 is replaced only in the final conversion.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流以原始字节并发读取，并按到达顺序逐行合并；无效的 UTF-8 仅在最后转换时替换。
pub async fn spawn_and_capture(mut cmd: Command) -> (std::io::Result<ExitStatus>, String) {
    let mut child = match cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn() {
        Ok(child) => child,
        // 如果派生失败，返回错误和空输出。
        Err(e) => return (Err(e), String::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(std::io::Error::other("failed to capture child output")),
            String::new(),
        );
    };

    let output = Arc::new(tokio::sync::Mutex::new(Vec::new()));
    let stdout_handle = tokio::spawn(collect_lines(stdout, Arc::clone(&output)));
    let stderr_handle = tokio::spawn(collect_lines(stderr, Arc::clone(&output)));

    let status = child.wait().await;

    // Make sure every line is in before handing the output back.
    // 确保所有输出行都已读取完毕。
    let _ = stdout_handle.await;
    let _ = stderr_handle.await;

    let output = String::from_utf8_lossy(&output.lock().await).into_owned();
    (status, output)
}

/// Appends each line read from `reader` to `output`, terminator included.
/// A final line without a newline is appended as is.
async fn collect_lines<R>(reader: R, output: Arc<tokio::sync::Mutex<Vec<u8>>>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => output.lock().await.extend_from_slice(&line),
        }
    }
}
