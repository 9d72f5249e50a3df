//! # Result Mailbox Module / 结果邮箱模块
//!
//! A bounded FIFO queue carrying `ResultEnvelope`s from the command sequencer
//! to the single result writer. Sending waits while the mailbox is full, so no
//! envelope is ever dropped.
//!
//! 一个有界 FIFO 队列，将 `ResultEnvelope` 从命令序列器传递给唯一的结果写入器。

use tokio::sync::mpsc;

use crate::core::error::RunError;
use crate::core::models::ResultEnvelope;

/// Creates a mailbox with room for `capacity` envelopes.
///
/// # Panics
/// Panics if `capacity` is zero; `AppConfig::validate` rejects that value.
pub fn mailbox(capacity: usize) -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (MailboxSender { tx }, MailboxReceiver { rx })
}

/// Producer side of the mailbox.
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::Sender<ResultEnvelope>,
}

impl MailboxSender {
    /// Queues an envelope, waiting for a free slot when the mailbox is full.
    /// 投递一个信封；邮箱已满时等待空位。
    pub async fn send(&self, envelope: ResultEnvelope) -> Result<(), RunError> {
        self.tx
            .send(envelope)
            .await
            .map_err(|_| RunError::MailboxClosed)
    }

    /// Free slots left right now.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }
}

/// Consumer side of the mailbox. There is exactly one.
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::Receiver<ResultEnvelope>,
}

impl MailboxReceiver {
    /// Waits for the next envelope. `None` once every sender is gone and the
    /// queue is empty.
    pub async fn receive(&mut self) -> Option<ResultEnvelope> {
        self.rx.recv().await
    }

    /// Takes the next envelope if one is queued, without waiting.
    /// 若有排队的信封则取出，不等待。
    pub fn try_receive(&mut self) -> Option<ResultEnvelope> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
