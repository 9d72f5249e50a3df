//! # Result Writer Module / 结果写入器模块
//!
//! The long-lived background task that drains the result mailbox and persists
//! every envelope to its destination file. It blocks on the mailbox instead of
//! polling, and when the stop token fires it drains whatever is still queued
//! before it exits.
//!
//! 长期运行的后台任务：从结果邮箱中取出信封并写入目标文件。
//! 收到停止信号后，会先处理完仍在排队的信封再退出。

use tokio_util::sync::CancellationToken;

use crate::core::error::RunError;
use crate::core::mailbox::MailboxReceiver;
use crate::core::models::{ResultEnvelope, WriterStats};
use crate::infra::{Logger, fs};

#[derive(Debug, Clone)]
pub struct ResultWriter {
    logger: Logger,
}

impl ResultWriter {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Runs until `stop` is cancelled (or every sender is dropped), then drains
    /// the mailbox. Write failures are logged and counted, never fatal.
    ///
    /// 运行直到 `stop` 被取消（或所有发送端被丢弃），随后清空邮箱。
    /// 写入失败只会被记录和计数，不会中止运行。
    pub async fn run(self, mut mailbox: MailboxReceiver, stop: CancellationToken) -> WriterStats {
        let mut stats = WriterStats::default();
        self.logger.trace("Result writer started");

        loop {
            tokio::select! {
                // Queued envelopes win over the stop signal.
                biased;
                envelope = mailbox.receive() => match envelope {
                    Some(envelope) => self.persist(envelope, &mut stats).await,
                    None => break,
                },
                _ = stop.cancelled() => break,
            }
        }

        while let Some(envelope) = mailbox.try_receive() {
            self.persist(envelope, &mut stats).await;
        }

        self.logger.trace(format!(
            "Result writer exiting, {} written, {} failed",
            stats.written, stats.failed
        ));
        stats
    }

    async fn persist(&self, envelope: ResultEnvelope, stats: &mut WriterStats) {
        match self.write_envelope(&envelope).await {
            Ok(()) => {
                stats.written += 1;
                self.logger.info(format!(
                    "Wrote results to {}",
                    envelope.destination().display()
                ));
            }
            Err(e) => {
                stats.failed += 1;
                self.logger.error(e);
            }
        }
    }

    /// Appends one payload to its destination file.
    pub async fn write_envelope(&self, envelope: &ResultEnvelope) -> Result<(), RunError> {
        fs::append_to_file(envelope.destination(), envelope.payload().as_bytes())
            .await
            .map_err(|e| RunError::io("Failed to write results to file", envelope.destination(), e))
    }
}
