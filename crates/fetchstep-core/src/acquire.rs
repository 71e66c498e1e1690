//! Acquisition orchestrator.
//!
//! Drives one [`AcquisitionRequest`] through
//! `ResolvingPaths → CheckingExisting → Downloading → Succeeded | Halted`:
//!
//! 1. Validate the checksum, then resolve every candidate's target path (locking
//!    cache keys when no explicit target is given).
//! 2. If any candidate's target already matches the checksum, use it without
//!    transferring anything.
//! 3. Otherwise try candidates strictly in order; the first successful transfer wins,
//!    failures move on to the next candidate, cancellation halts immediately.
//!
//! Cache locks are held in [`CacheLease`]s and released when `acquire` returns,
//! whichever way it returns.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{cache_key, Cache, CacheLease};
use crate::checksum::ChecksumType;
use crate::error::AcquireError;
use crate::request::{AcquisitionRequest, DownloadTask};
use crate::state::{CancelToken, StateBag, StepAction};
use crate::transfer::{Executor, TransferOutcome};
use crate::transport::Transport;
use crate::ui::Ui;

/// Timing knobs for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireSettings {
    /// How often a running transfer checks for cancellation.
    pub poll_interval: Duration,
    /// Minimum spacing between progress reports.
    pub progress_interval: Duration,
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            progress_interval: Duration::from_secs(1),
        }
    }
}

pub struct Acquirer {
    request: AcquisitionRequest,
    cache: Arc<dyn Cache>,
    ui: Arc<dyn Ui>,
    executor: Executor,
}

impl Acquirer {
    pub fn new(
        request: AcquisitionRequest,
        cache: Arc<dyn Cache>,
        transport: Arc<dyn Transport>,
        ui: Arc<dyn Ui>,
        settings: AcquireSettings,
    ) -> Self {
        let executor = Executor::new(
            transport,
            Arc::clone(&ui),
            settings.poll_interval,
            settings.progress_interval,
        );
        Self {
            request,
            cache,
            ui,
            executor,
        }
    }

    /// Runs the acquisition as a step: publishes the final path under the request's
    /// result key and returns `Continue`, or stores the error and returns `Halt`.
    pub async fn run(&self, state: &mut StateBag) -> StepAction {
        let cancel = state.cancel_token().clone();
        match self.acquire(&cancel).await {
            Ok(path) => {
                state.put_path(&self.request.result_key, path);
                StepAction::Continue
            }
            Err(e) => {
                state.put_error(e);
                StepAction::Halt
            }
        }
    }

    /// Acquires the artifact and returns its validated local path.
    pub async fn acquire(&self, cancel: &CancelToken) -> Result<PathBuf, AcquireError> {
        let req = &self.request;
        if req.sources.is_empty() {
            return Err(AcquireError::NoCandidates(req.description.clone()));
        }
        let expected = req.expected_checksum()?;

        self.ui
            .say(&format!("Downloading or copying {}", req.description));

        // Dropped on every return below, releasing the cache keys.
        let mut leases: Vec<(CacheLease, PathBuf)> = Vec::new();
        let tasks = self.resolve_tasks(expected.as_ref(), &mut leases).await?;

        if let Some(path) = self.find_existing(&tasks).await {
            return Ok(path);
        }
        self.download_first(tasks, cancel).await
    }

    async fn resolve_tasks(
        &self,
        expected: Option<&(ChecksumType, Vec<u8>)>,
        leases: &mut Vec<(CacheLease, PathBuf)>,
    ) -> Result<Vec<DownloadTask>, AcquireError> {
        let req = &self.request;
        let mut tasks = Vec::with_capacity(req.sources.len());
        for source in &req.sources {
            let target = match &req.target_path {
                Some(path) => path.clone(),
                None => {
                    let key = cache_key(source, req.extension.as_deref());
                    match leases.iter().find(|(lease, _)| lease.key() == key) {
                        Some((_, path)) => path.clone(),
                        None => {
                            tracing::debug!(source = %source, "acquiring lock to download");
                            let (lease, path) = CacheLease::acquire(Arc::clone(&self.cache), &key)
                                .await
                                .map_err(|e| AcquireError::Cache {
                                    key: key.clone(),
                                    source: e,
                                })?;
                            leases.push((lease, path.clone()));
                            path
                        }
                    }
                }
            };
            tasks.push(DownloadTask::new(source, target, expected, req.copy_local));
        }
        Ok(tasks)
    }

    /// Hashes candidate targets off the runtime; the first valid one in candidate order wins.
    async fn find_existing(&self, tasks: &[DownloadTask]) -> Option<PathBuf> {
        if !tasks.iter().any(DownloadTask::has_checksum) {
            return None;
        }
        let candidates = tasks.to_vec();
        let found = match tokio::task::spawn_blocking(move || first_valid(&candidates)).await {
            Ok(found) => found?,
            Err(e) => {
                tracing::warn!(error = %e, "existing-file check did not complete");
                return None;
            }
        };
        let task = &tasks[found];
        self.ui.message(&format!(
            "Found already downloaded, initial checksum matched, no download needed: {}",
            task.source
        ));
        tracing::info!(path = %task.target_path.display(), "using existing download");
        Some(task.target_path.clone())
    }

    async fn download_first(
        &self,
        tasks: Vec<DownloadTask>,
        cancel: &CancelToken,
    ) -> Result<PathBuf, AcquireError> {
        for task in tasks {
            if cancel.is_cancelled() {
                return Err(self.interrupted());
            }
            self.ui
                .message(&format!("Downloading or copying: {}", task.source));
            let source = task.source.clone();
            match self.executor.execute(task, cancel).await {
                TransferOutcome::Downloaded(path) => {
                    tracing::info!(source = %source, path = %path.display(), "acquired");
                    return Ok(path);
                }
                TransferOutcome::Failed(e) => {
                    tracing::warn!(source = %source, error = %e, "candidate failed");
                    self.ui.message(&format!("Error downloading: {}", e));
                }
                TransferOutcome::Cancelled => return Err(self.interrupted()),
            }
        }

        let err = AcquireError::DownloadFailed {
            description: self.request.description.clone(),
        };
        self.ui.error(&err.to_string());
        Err(err)
    }

    fn interrupted(&self) -> AcquireError {
        tracing::info!("acquisition cancelled");
        self.ui.say("Interrupt received. Cancelling download...");
        AcquireError::Cancelled
    }
}

/// Index of the first task whose target already verifies. Each distinct target is hashed once.
fn first_valid(tasks: &[DownloadTask]) -> Option<usize> {
    let mut checked: HashSet<&Path> = HashSet::new();
    tasks
        .iter()
        .position(|t| checked.insert(t.target_path.as_path()) && t.verify(&t.target_path))
}
