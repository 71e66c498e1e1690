//! Progress tracking for a single transfer (bytes done, rate, ETA).
//!
//! The transport bumps a shared [`ProgressTracker`] on every chunk; a reporter task
//! samples it on a fixed interval and forwards a [`ProgressEvent`] to the reporting
//! sink only when something changed, so the sink sees at most one event per interval.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ui::Ui;

const MIB: f64 = 1_048_576.0;

/// Snapshot of transfer progress, consumed by the reporting sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub bytes_done: u64,
    /// Total size when the transport knows it (e.g. from Content-Length).
    pub total_bytes: Option<u64>,
    /// Elapsed time since the transfer started (seconds).
    pub elapsed_secs: f64,
}

impl ProgressEvent {
    /// Transfer rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Fraction complete in [0.0, 1.0], or None when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.total_bytes?;
        if total == 0 {
            return Some(1.0);
        }
        Some((self.bytes_done as f64 / total as f64).min(1.0))
    }

    /// Estimated seconds remaining (None if the total is unknown or nothing moved yet).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_bytes?.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let done_mib = self.bytes_done as f64 / MIB;
        let rate_mib = self.bytes_per_sec() / MIB;
        match (self.total_bytes, self.fraction()) {
            (Some(total), Some(frac)) => {
                write!(
                    f,
                    "{:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s",
                    done_mib,
                    total as f64 / MIB,
                    frac * 100.0,
                    rate_mib
                )?;
                if let Some(eta) = self.eta_secs() {
                    write!(f, "  ETA {:.0}s", eta)?;
                }
                Ok(())
            }
            _ => write!(f, "{:.1} MiB  {:.2} MiB/s", done_mib, rate_mib),
        }
    }
}

/// Shared byte counters for one transfer.
#[derive(Debug)]
pub struct ProgressTracker {
    done: AtomicU64,
    // 0 = unknown
    total: AtomicU64,
    // bytes_done at the last forwarded event
    reported: AtomicU64,
    started: Instant,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            done: AtomicU64::new(0),
            total: AtomicU64::new(0),
            reported: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn set_total(&self, total: Option<u64>) {
        self.total.store(total.unwrap_or(0), Ordering::Relaxed);
    }

    pub fn advance(&self, bytes: u64) {
        self.done.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Start counting from zero again (e.g. before a retry).
    pub fn reset(&self) {
        self.done.store(0, Ordering::Relaxed);
    }

    pub fn bytes_done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ProgressEvent {
        let total = self.total.load(Ordering::Relaxed);
        ProgressEvent {
            bytes_done: self.bytes_done(),
            total_bytes: (total > 0).then_some(total),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }

    /// Snapshot if the byte count moved since the last one handed out here.
    pub(crate) fn take_unreported(&self) -> Option<ProgressEvent> {
        let event = self.snapshot();
        let previous = self.reported.swap(event.bytes_done, Ordering::Relaxed);
        (previous != event.bytes_done).then_some(event)
    }
}

/// Samples `tracker` every `interval` and forwards changed snapshots to `ui`.
/// Runs until aborted; spawn it with tokio::spawn.
pub(crate) async fn report_progress(
    tracker: Arc<ProgressTracker>,
    ui: Arc<dyn Ui>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Some(event) = tracker.take_unreported() {
            ui.progress(&event);
        }
    }
}
