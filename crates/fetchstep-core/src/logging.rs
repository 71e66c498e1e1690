//! Logging init: append to a log file configured under `[logging]`, or stderr.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const DEFAULT_FILTER: &str = "info,fetchstep_core=debug,fetchstep=debug";

/// Filter directives used when `RUST_LOG` is unset.
pub fn filter_directives(cfg: &LoggingConfig) -> &str {
    cfg.filter
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FILTER)
}

/// Configured log file, or `$XDG_STATE_HOME/fetchstep/fetchstep.log`.
pub fn log_file_path(cfg: &LoggingConfig) -> Result<PathBuf> {
    if let Some(file) = &cfg.file {
        return Ok(file.clone());
    }
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fetchstep")?;
    Ok(xdg_dirs.get_state_home().join("fetchstep.log"))
}

fn env_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(cfg)))
}

/// Install a subscriber appending to the configured log file and return its path.
/// Errors leave no subscriber installed so the caller can fall back to [`init_logging_stderr`].
pub fn init_logging(cfg: &LoggingConfig) -> Result<PathBuf> {
    let path = log_file_path(cfg)?;
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cfg))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!("fetchstep logging to {}", path.display());
    Ok(path)
}

/// Stderr-only logging for when the log file is unusable.
pub fn init_logging_stderr(cfg: &LoggingConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(cfg))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
