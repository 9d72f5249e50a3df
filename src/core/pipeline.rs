//! # Pipeline Module / 流水线模块
//!
//! Wires the components of one run together:
//!
//! 1. the sequencer checks the launcher and creates the result directory,
//! 2. the result writer is registered with the shutdown coordinator and started,
//! 3. the sequencer runs the catalog while the writer drains the mailbox,
//! 4. the writer is told to stop and joined,
//! 5. only then is the report built over the complete result directory.
//!
//! 将一次运行的各个组件串联起来：结果写入器完全退出之后才会生成报告。

use std::path::PathBuf;

use crate::core::config::AppConfig;
use crate::core::error::RunError;
use crate::core::mailbox::mailbox;
use crate::core::metrics::MetricsWriter;
use crate::core::models::{BenchmarkReport, RunSummary, WriterStats};
use crate::core::report::ReportBuilder;
use crate::core::sequencer::CommandSequencer;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::writer::ResultWriter;
use crate::infra::Logger;
use crate::infra::command::CapabilityProbe;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub result_dir: PathBuf,
    pub summary: RunSummary,
    pub writer: WriterStats,
    pub report: BenchmarkReport,
    /// `None` when the JSON report could not be written.
    pub report_path: Option<PathBuf>,
}

/// Runs the whole benchmark pipeline once.
///
/// # Errors
/// Fatal errors only: the launcher is missing, the result directory cannot be
/// created or listed, or the result writer died mid-run.
///
/// 完整运行一次基准测试流水线。仅在致命错误时返回 `Err`。
pub async fn run_pipeline<P>(config: &AppConfig, probe: P, logger: Logger) -> Result<PipelineOutcome, RunError>
where
    P: CapabilityProbe,
{
    let sequencer = CommandSequencer::initialize(config, probe, logger.clone()).await?;
    let result_dir = sequencer.context().result_dir().to_path_buf();

    let coordinator = ShutdownCoordinator::new();
    let (sender, receiver) = mailbox(config.mailbox_capacity);
    let writer = ResultWriter::new(logger.clone());
    let writer_handle = coordinator.spawn(writer.run(receiver, coordinator.stop_token()));

    let run_result = sequencer.run_all(&sender).await;
    drop(sender);

    coordinator.shutdown().await;
    let writer_stats = match writer_handle.await {
        Ok(stats) => stats,
        Err(e) => {
            logger.error(format!("Result writer task failed: {e}"));
            return Err(RunError::MailboxClosed);
        }
    };
    let summary = run_result?;

    logger.info(format!(
        "All benchmarks done: {} completed, {} skipped, {} failed",
        summary.completed(),
        summary.skipped(),
        summary.failed()
    ));

    let metrics = MetricsWriter::new(
        config.metrics.clone(),
        config.host_name.clone(),
        config.region.clone(),
        logger.clone(),
    );
    let built = ReportBuilder::new(logger, metrics).build(&result_dir)?;

    Ok(PipelineOutcome {
        result_dir,
        summary,
        writer: writer_stats,
        report: built.report,
        report_path: built.json_path,
    })
}
