//! # Concurrency Tests using Loom
//!
//! This module uses loom to check the ordering guarantee between the command
//! sequencer, the result writer and the shutdown signal: every envelope queued
//! before the stop signal is persisted before the writer exits. Cancellation
//! reaching the writer's child stop token is checked on the real tokio runtime.

#[cfg(test)]
mod tests {
    use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use loom::sync::{Arc, Mutex};
    use loom::thread;
    use std::collections::VecDeque;

    /// This test models the writer loop with the stop signal racing the
    /// producer.
    ///
    /// The real writer selects over `mailbox.receive()` and `stop.cancelled()`
    /// and drains the mailbox once it leaves the loop. Here the mailbox is a
    /// locked queue and the stop token a flag that is only raised after the
    /// producer has queued everything, just as the pipeline only stops the
    /// writer after the sequencer has returned.
    ///
    /// Whichever way the threads interleave, nothing queued may be lost.
    #[test]
    fn test_writer_drains_everything_queued_before_stop() {
        // loom explores every interleaving; give it a bigger stack.
        const STACK_SIZE: usize = 8 * 1024 * 1024; // 8 MB

        let builder = std::thread::Builder::new()
            .name("loom-test-thread".into())
            .stack_size(STACK_SIZE);

        let handle = builder
            .spawn(|| {
                loom::model(|| {
                    const ENVELOPES: usize = 2;
                    let mailbox = Arc::new(Mutex::new(VecDeque::new()));
                    let stop = Arc::new(AtomicBool::new(false));
                    let written = Arc::new(AtomicUsize::new(0));

                    let writer = {
                        let mailbox = mailbox.clone();
                        let stop = stop.clone();
                        let written = written.clone();
                        thread::spawn(move || {
                            loop {
                                // Queued envelopes win over the stop signal.
                                if let Some(_envelope) = mailbox.lock().unwrap().pop_front() {
                                    written.fetch_add(1, Ordering::SeqCst);
                                    continue;
                                }
                                if stop.load(Ordering::SeqCst) {
                                    break;
                                }
                                thread::yield_now();
                            }
                            // Final drain after the loop.
                            while let Some(_envelope) = mailbox.lock().unwrap().pop_front() {
                                written.fetch_add(1, Ordering::SeqCst);
                            }
                        })
                    };

                    for i in 0..ENVELOPES {
                        mailbox.lock().unwrap().push_back(i);
                    }
                    // The sequencer is done; signal stop.
                    stop.store(true, Ordering::SeqCst);

                    writer.join().unwrap();

                    assert_eq!(written.load(Ordering::SeqCst), ENVELOPES);
                    assert!(mailbox.lock().unwrap().is_empty());
                });
            })
            .unwrap();

        handle.join().unwrap();
    }

    /// The stop token handed to the writer is a child of the coordinator's
    /// token; cancelling the parent from another task must always reach it.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_child_stop_token_observes_parent_cancel() {
        let parent = tokio_util::sync::CancellationToken::new();
        let child = parent.child_token();

        let canceller = {
            let parent = parent.clone();
            tokio::spawn(async move { parent.cancel() })
        };

        tokio::time::timeout(std::time::Duration::from_secs(5), child.cancelled())
            .await
            .expect("child token should see the parent's cancel");
        canceller.await.unwrap();
        assert!(child.is_cancelled());
    }
}
