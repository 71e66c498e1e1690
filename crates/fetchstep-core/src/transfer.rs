//! Transfer executor: runs one candidate's fetch as an independent unit of work.
//!
//! The fetch runs on its own OS thread and reports exactly once through a oneshot
//! channel. The caller waits on that channel while polling the cancel token on a
//! fixed interval; if cancellation wins, the worker is abandoned rather than joined
//! and whatever it leaves in `<target>.part` stays with the cache.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::progress::{report_progress, ProgressTracker};
use crate::request::DownloadTask;
use crate::retry::TransferError;
use crate::state::CancelToken;
use crate::transport::Transport;
use crate::ui::Ui;

/// Terminal result of one executor run.
#[derive(Debug)]
pub enum TransferOutcome {
    Downloaded(PathBuf),
    Failed(TransferError),
    /// Cancellation was observed before the worker reported back.
    Cancelled,
}

/// Spawns transfers and supervises them until completion or cancellation.
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    ui: Arc<dyn Ui>,
    poll_interval: Duration,
    progress_interval: Duration,
}

impl Executor {
    pub fn new(
        transport: Arc<dyn Transport>,
        ui: Arc<dyn Ui>,
        poll_interval: Duration,
        progress_interval: Duration,
    ) -> Self {
        Self {
            transport,
            ui,
            poll_interval,
            progress_interval,
        }
    }

    /// Starts the fetch for `task` on a worker thread and a progress reporter task.
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, task: DownloadTask) -> TransferHandle {
        let (tx, rx) = oneshot::channel();
        let tracker = Arc::new(ProgressTracker::new());

        let transport = Arc::clone(&self.transport);
        let worker_tracker = Arc::clone(&tracker);
        let source = task.source.clone();
        let spawned = std::thread::Builder::new()
            .name("fetchstep-transfer".to_string())
            .spawn(move || {
                let result = transport.fetch(&task, &worker_tracker);
                if tx.send(result).is_err() {
                    tracing::debug!(source = %task.source, "transfer finished after being abandoned");
                }
            });
        if let Err(e) = spawned {
            // The sender went down with the closure; the handle reports WorkerLost.
            tracing::warn!(source = %source, error = %e, "could not start transfer worker");
        }

        let reporter = tokio::spawn(report_progress(
            Arc::clone(&tracker),
            Arc::clone(&self.ui),
            self.progress_interval,
        ));

        TransferHandle {
            completion: rx,
            reporter,
            tracker,
            ui: Arc::clone(&self.ui),
            poll_interval: self.poll_interval,
        }
    }

    /// Runs `task` to an outcome, giving up early if `cancel` is set.
    pub async fn execute(&self, task: DownloadTask, cancel: &CancelToken) -> TransferOutcome {
        self.spawn(task).wait(cancel).await
    }
}

/// A running transfer.
pub struct TransferHandle {
    completion: oneshot::Receiver<Result<PathBuf, TransferError>>,
    reporter: JoinHandle<()>,
    tracker: Arc<ProgressTracker>,
    ui: Arc<dyn Ui>,
    poll_interval: Duration,
}

impl TransferHandle {
    /// Waits for the worker's result, checking `cancel` once per poll interval.
    /// A result that is already available wins over a pending cancellation.
    pub async fn wait(mut self, cancel: &CancelToken) -> TransferOutcome {
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.poll_interval,
            self.poll_interval,
        );
        let outcome = loop {
            tokio::select! {
                biased;
                res = &mut self.completion => {
                    break match res {
                        Ok(Ok(path)) => TransferOutcome::Downloaded(path),
                        Ok(Err(e)) => TransferOutcome::Failed(e),
                        Err(_) => TransferOutcome::Failed(TransferError::WorkerLost),
                    };
                }
                _ = ticker.tick() => {
                    if cancel.is_cancelled() {
                        break TransferOutcome::Cancelled;
                    }
                }
            }
        };

        self.reporter.abort();
        if let TransferOutcome::Downloaded(_) = outcome {
            if let Some(last) = self.tracker.take_unreported() {
                self.ui.progress(&last);
            }
        }
        outcome
    }
}

impl Drop for TransferHandle {
    fn drop(&mut self) {
        self.reporter.abort();
    }
}
