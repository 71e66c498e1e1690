//! In-memory stand-ins for the host capabilities: reporting sink, cache, transport.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use fetchstep_core::cache::{Cache, FileCache};
use fetchstep_core::progress::{ProgressEvent, ProgressTracker};
use fetchstep_core::retry::TransferError;
use fetchstep_core::transport::Transport;
use fetchstep_core::ui::Ui;
use fetchstep_core::{CancelToken, DownloadTask};

#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Say(String),
    Message(String),
    Error(String),
    Progress(u64),
}

#[derive(Default)]
pub struct RecordingUi {
    lines: Mutex<Vec<Line>>,
}

impl RecordingUi {
    pub fn lines(&self) -> Vec<Line> {
        self.lines.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| match l {
                Line::Error(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn progress_count(&self) -> usize {
        self.lines()
            .iter()
            .filter(|l| matches!(l, Line::Progress(_)))
            .count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| match l {
            Line::Say(m) | Line::Message(m) | Line::Error(m) => m.contains(needle),
            Line::Progress(_) => false,
        })
    }
}

impl Ui for RecordingUi {
    fn say(&self, message: &str) {
        self.lines.lock().unwrap().push(Line::Say(message.to_string()));
    }

    fn message(&self, message: &str) {
        self.lines.lock().unwrap().push(Line::Message(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.lines.lock().unwrap().push(Line::Error(message.to_string()));
    }

    fn progress(&self, event: &ProgressEvent) {
        self.lines.lock().unwrap().push(Line::Progress(event.bytes_done));
    }
}

/// FileCache that records every lock and unlock.
pub struct RecordingCache {
    pub inner: FileCache,
    locked: Mutex<Vec<String>>,
    unlocked: Mutex<Vec<String>>,
}

impl RecordingCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: FileCache::new(dir),
            locked: Mutex::new(Vec::new()),
            unlocked: Mutex::new(Vec::new()),
        }
    }

    pub fn locked(&self) -> Vec<String> {
        self.locked.lock().unwrap().clone()
    }

    pub fn unlocked(&self) -> Vec<String> {
        self.unlocked.lock().unwrap().clone()
    }

    /// True when every lock has a matching unlock and nothing is held.
    pub fn all_released(&self) -> bool {
        let mut locked = self.locked();
        let mut unlocked = self.unlocked();
        locked.sort();
        unlocked.sort();
        locked == unlocked && locked.iter().all(|k| !self.inner.is_locked(k))
    }
}

#[async_trait::async_trait]
impl Cache for RecordingCache {
    async fn lock(&self, key: &str) -> io::Result<PathBuf> {
        let path = self.inner.lock(key).await?;
        self.locked.lock().unwrap().push(key.to_string());
        Ok(path)
    }

    fn unlock(&self, key: &str) {
        self.unlocked.lock().unwrap().push(key.to_string());
        self.inner.unlock(key);
    }
}

/// What the scripted transport does for one source.
#[derive(Clone)]
pub enum Behavior {
    /// Write the bytes to the target and succeed.
    Serve(Vec<u8>),
    Fail(String),
    /// Sleep, then write the bytes and succeed (long after any test gives up).
    Hang(Duration, Vec<u8>),
    /// Set the cancel token mid-transfer, then succeed.
    ServeThenCancel(Vec<u8>, CancelToken),
    /// Report progress in `chunks` steps, `pause` apart, then succeed.
    Trickle { chunks: usize, pause: Duration },
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: HashMap<String, Behavior>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, source: &str, behavior: Behavior) -> Self {
        self.script.insert(source.to_string(), behavior);
        self
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

fn write_target(task: &DownloadTask, body: &[u8]) -> Result<PathBuf, TransferError> {
    if let Some(parent) = task.target_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&task.target_path, body)?;
    Ok(task.target_path.clone())
}

impl Transport for ScriptedTransport {
    fn fetch(
        &self,
        task: &DownloadTask,
        progress: &ProgressTracker,
    ) -> Result<PathBuf, TransferError> {
        self.attempts.lock().unwrap().push(task.source.clone());
        let behavior = self
            .script
            .get(&task.source)
            .cloned()
            .unwrap_or_else(|| Behavior::Fail("connection refused".to_string()));
        match behavior {
            Behavior::Serve(body) => {
                progress.set_total(Some(body.len() as u64));
                progress.advance(body.len() as u64);
                write_target(task, &body)
            }
            Behavior::Fail(msg) => Err(TransferError::Other(msg)),
            Behavior::Hang(delay, body) => {
                std::thread::sleep(delay);
                write_target(task, &body)
            }
            Behavior::ServeThenCancel(body, token) => {
                token.cancel();
                write_target(task, &body)
            }
            Behavior::Trickle { chunks, pause } => {
                progress.set_total(Some(chunks as u64));
                for _ in 0..chunks {
                    std::thread::sleep(pause);
                    progress.advance(1);
                }
                write_target(task, b"trickled")
            }
        }
    }
}
