//! Step state shared between an acquisition and whoever drives it.
//!
//! The [`CancelToken`] is the external cancellation signal: any clone can request a
//! stop (e.g. a Ctrl-C handler) and the orchestrator polls it. [`StateBag`] holds the
//! published result slots and the error of a halted step.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::AcquireError;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What the driver of a step should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Continue,
    Halt,
}

/// Results and errors published by steps, plus the cancellation signal.
#[derive(Debug, Default)]
pub struct StateBag {
    cancel: CancelToken,
    paths: HashMap<String, PathBuf>,
    error: Option<AcquireError>,
}

impl StateBag {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn put_path(&mut self, key: &str, path: PathBuf) {
        self.paths.insert(key.to_string(), path);
    }

    pub fn path(&self, key: &str) -> Option<&Path> {
        self.paths.get(key).map(PathBuf::as_path)
    }

    pub fn put_error(&mut self, err: AcquireError) {
        self.error = Some(err);
    }

    pub fn error(&self) -> Option<&AcquireError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<AcquireError> {
        self.error.take()
    }
}
