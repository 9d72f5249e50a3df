//! # Command Sequencer Module / 命令序列器模块
//!
//! Runs each benchmark of the catalog in turn under the MPI launcher, captures
//! its combined output and hands it to the result mailbox. A benchmark that is
//! missing or fails is logged and skipped; the others still run.
//!
//! 依次在 MPI 启动器下运行目录中的每个基准测试，捕获其合并输出并交给结果邮箱。
//! 缺失或失败的基准测试会被记录并跳过，其余的照常运行。

use chrono::Local;
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::config::AppConfig;
use crate::core::error::RunError;
use crate::core::mailbox::MailboxSender;
use crate::core::models::{BenchmarkCommand, BenchmarkOutcome, ResultEnvelope, RunSummary};
use crate::infra::command::{self, CapabilityProbe};
use crate::infra::{Logger, fs};

/// Launcher flags placed between the launcher and the benchmark program.
pub const LAUNCHER_ROOT_FLAG: &str = "--allow-run-as-root";

/// Immutable settings of one run, fixed at initialization.
/// 一次运行的不可变设置，在初始化时确定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    launcher: String,
    process_count: u32,
    hostfile: PathBuf,
    result_dir: PathBuf,
}

impl RunContext {
    pub fn new(
        launcher: impl Into<String>,
        process_count: u32,
        hostfile: impl Into<PathBuf>,
        result_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            launcher: launcher.into(),
            process_count,
            hostfile: hostfile.into(),
            result_dir: result_dir.into(),
        }
    }

    pub fn process_count(&self) -> u32 {
        self.process_count
    }

    pub fn hostfile(&self) -> &Path {
        &self.hostfile
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// The full shell command line for `benchmark`:
    /// `<launcher> --allow-run-as-root --np <N> --hostfile <path> <benchmark>`.
    ///
    /// 为 `benchmark` 构造完整的 shell 命令行。
    pub fn invocation(&self, benchmark: &BenchmarkCommand) -> Option<String> {
        let np = self.process_count.to_string();
        let hostfile = self.hostfile.to_string_lossy();
        let program = benchmark.path().to_string_lossy();
        command::shell_join([
            self.launcher.as_str(),
            LAUNCHER_ROOT_FLAG,
            "--np",
            np.as_str(),
            "--hostfile",
            hostfile.as_ref(),
            program.as_ref(),
        ])
    }
}

/// Drives the benchmark catalog for one run.
#[derive(Debug)]
pub struct CommandSequencer<P> {
    context: RunContext,
    catalog: Vec<BenchmarkCommand>,
    probe: P,
    logger: Logger,
}

impl<P: CapabilityProbe> CommandSequencer<P> {
    /// Checks for the launcher and creates the result directory.
    ///
    /// # Errors
    /// * `CommandNotFound` - the launcher is not on this host; nothing is created.
    /// * `Io` - the result directory could not be created.
    ///
    /// 检查启动器是否存在并创建结果目录。
    pub async fn initialize(config: &AppConfig, probe: P, logger: Logger) -> Result<Self, RunError> {
        if !probe.exists(&config.launcher).await {
            logger.error(format!("Failed to find '{}' in the system", config.launcher));
            return Err(RunError::CommandNotFound(config.launcher.clone()));
        }

        let result_dir = fs::result_dir_path(&config.output_base, Local::now(), std::process::id());
        fs::create_result_dir(&result_dir).map_err(|e| {
            logger.error(format!(
                "Failed to create result directory {}, err : {e}",
                result_dir.display()
            ));
            RunError::io("Failed to create result directory", &result_dir, e)
        })?;
        logger.trace(format!("Result directory is {}", result_dir.display()));

        let context = RunContext::new(
            config.launcher.clone(),
            config.mpi_count,
            config.hostfile.clone(),
            result_dir,
        );
        Ok(Self {
            context,
            catalog: config.benchmarks.clone(),
            probe,
            logger,
        })
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn catalog(&self) -> &[BenchmarkCommand] {
        &self.catalog
    }

    /// Runs every catalog entry in order, sending each successful output to
    /// `mailbox`. Individual failures only show up in the returned summary.
    ///
    /// # Errors
    /// `MailboxClosed` if the result writer is gone.
    ///
    /// 按顺序运行每个目录条目，并将每个成功的输出发送到 `mailbox`。
    pub async fn run_all(&self, mailbox: &MailboxSender) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::default();
        for benchmark in &self.catalog {
            let outcome = self.run_one(benchmark, mailbox).await?;
            summary.outcomes.push((benchmark.clone(), outcome));
        }
        Ok(summary)
    }

    async fn run_one(
        &self,
        benchmark: &BenchmarkCommand,
        mailbox: &MailboxSender,
    ) -> Result<BenchmarkOutcome, RunError> {
        let program = benchmark.path().to_string_lossy();
        if !self.probe.exists(&program).await {
            self.logger
                .error(format!("Failed to run command {benchmark}, as its not found"));
            println!("{}", format!("Skipping {benchmark}: not found").yellow());
            return Ok(BenchmarkOutcome::Skipped);
        }

        let Some(run_cmd) = self.context.invocation(benchmark) else {
            self.logger
                .error(format!("Cannot build a command line for {benchmark}"));
            return Ok(BenchmarkOutcome::Failed {
                reason: "command line cannot be quoted".to_string(),
                duration: Default::default(),
            });
        };

        self.logger
            .info(format!(" *** Running test command {run_cmd} ***"));
        println!("{}", format!("Running {}", benchmark.base_name()).blue());

        let start = Instant::now();
        let (status, output) = command::run_shell(&run_cmd).await;
        let duration = start.elapsed();

        let failure = match status {
            Ok(status) if status.success() => None,
            Ok(status) => Some(format!("exited with {status}")),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = failure {
            self.logger
                .error(format!("Failed to run test : {run_cmd}, err : {reason}"));
            if !output.trim().is_empty() {
                self.logger.trace(output.trim_end());
            }
            println!(
                "{}",
                format!("{} failed after {:.2?}: {reason}", benchmark.base_name(), duration).red()
            );
            return Ok(BenchmarkOutcome::Failed { reason, duration });
        }

        let envelope = ResultEnvelope::for_benchmark(benchmark, &self.context.result_dir, output);
        let destination = envelope.destination().to_path_buf();
        mailbox.send(envelope).await?;

        println!(
            "{}",
            format!("{} finished in {:.2?}", benchmark.base_name(), duration).green()
        );
        Ok(BenchmarkOutcome::Completed {
            destination,
            duration,
        })
    }
}
