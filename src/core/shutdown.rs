//! # Shutdown Coordinator Module / 关闭协调器模块
//!
//! Tracks the background tasks of a run and lets the controlling flow stop them
//! and wait until every one has exited. Tasks are registered by spawning them
//! through the coordinator, so a task can never start unregistered.
//!
//! 跟踪一次运行中的后台任务，并允许控制流停止它们并等待全部退出。

use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    tracker: TaskTracker,
    stop: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token background tasks watch for the stop signal.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.child_token()
    }

    /// Registers and starts `task`. The returned handle can be joined to
    /// collect the task's output.
    ///
    /// 注册并启动 `task`。返回的句柄可用于获取任务的输出。
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(task)
    }

    /// Number of registered tasks that have not finished yet.
    pub fn outstanding(&self) -> usize {
        self.tracker.len()
    }

    /// Tells every background task to finish up.
    pub fn signal_stop(&self) {
        self.stop.cancel();
    }

    /// Blocks until every registered task has exited.
    ///
    /// 阻塞直到所有已注册的任务退出。
    pub async fn await_all(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// `signal_stop` followed by `await_all`.
    pub async fn shutdown(&self) {
        self.signal_stop();
        self.await_all().await;
    }
}
