use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::acquire::AcquireSettings;
use crate::retry::RetryPolicy;

/// Transport retry parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per candidate (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/fetchstep/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Directory holding cache-derived download targets. Defaults to the XDG cache dir.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// How often a running transfer checks for cancellation, in milliseconds.
    pub poll_interval_ms: u64,
    /// Minimum spacing between progress reports, in milliseconds.
    pub progress_interval_ms: u64,
    /// User-Agent header sent with remote fetches.
    pub user_agent: String,
    /// Connect timeout for remote fetches, in seconds.
    pub connect_timeout_secs: u64,
    /// Copy local sources into the target path instead of using them in place.
    #[serde(default)]
    pub copy_local_files: bool,
    /// Optional bandwidth cap in bytes per second (None = no cap).
    #[serde(default)]
    pub max_bytes_per_sec: Option<u64>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[logging]` section. `RUST_LOG` still overrides `filter` when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directives, e.g. `"warn,fetchstep_core=info"`.
    #[serde(default)]
    pub filter: Option<String>,
    /// Log file. Defaults to `$XDG_STATE_HOME/fetchstep/fetchstep.log`.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            poll_interval_ms: 1000,
            progress_interval_ms: 1000,
            user_agent: "fetchstep".to_string(),
            connect_timeout_secs: 30,
            copy_local_files: false,
            max_bytes_per_sec: None,
            retry: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl FetchConfig {
    /// Polling and progress intervals for the orchestrator. Zero values are clamped to 1ms.
    pub fn acquire_settings(&self) -> AcquireSettings {
        AcquireSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            progress_interval: Duration::from_millis(self.progress_interval_ms.max(1)),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().policy()
    }

    /// Configured cache directory, or `$XDG_CACHE_HOME/fetchstep`.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("fetchstep")?;
        Ok(xdg_dirs.get_cache_home())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fetchstep")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FetchConfig::default();
        assert_eq!(cfg.poll_interval_ms, 1000);
        assert_eq!(cfg.progress_interval_ms, 1000);
        assert_eq!(cfg.user_agent, "fetchstep");
        assert!(!cfg.copy_local_files);
        assert!(cfg.cache_dir.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: FetchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.poll_interval_ms, cfg.poll_interval_ms);
        assert_eq!(parsed.user_agent, cfg.user_agent);
        assert_eq!(parsed.connect_timeout_secs, cfg.connect_timeout_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            cache_dir = "/var/cache/artifacts"
            poll_interval_ms = 250
            progress_interval_ms = 500
            user_agent = "builder/1.0"
            connect_timeout_secs = 5
            copy_local_files = true
            max_bytes_per_sec = 1_000_000

            [retry]
            max_attempts = 2
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: FetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.cache_dir.as_deref(), Some(std::path::Path::new("/var/cache/artifacts")));
        assert_eq!(cfg.poll_interval_ms, 250);
        assert!(cfg.copy_local_files);
        assert_eq!(cfg.max_bytes_per_sec, Some(1_000_000));
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(15));
    }

    #[test]
    fn optional_sections_default_when_missing() {
        let toml = r#"
            poll_interval_ms = 1000
            progress_interval_ms = 1000
            user_agent = "fetchstep"
            connect_timeout_secs = 30
        "#;
        let cfg: FetchConfig = toml::from_str(toml).unwrap();
        assert!(cfg.retry.is_none());
        assert!(cfg.logging.filter.is_none());
        assert!(cfg.logging.file.is_none());
        assert!(!cfg.copy_local_files);
        assert_eq!(cfg.retry_policy().max_attempts, 3);
    }

    #[test]
    fn acquire_settings_clamps_zero_intervals() {
        let cfg = FetchConfig {
            poll_interval_ms: 0,
            progress_interval_ms: 0,
            ..FetchConfig::default()
        };
        let settings = cfg.acquire_settings();
        assert_eq!(settings.poll_interval, Duration::from_millis(1));
        assert_eq!(settings.progress_interval, Duration::from_millis(1));
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let cfg = FetchConfig {
            cache_dir: Some(PathBuf::from("/tmp/fs-cache")),
            ..FetchConfig::default()
        };
        assert_eq!(cfg.resolved_cache_dir().unwrap(), PathBuf::from("/tmp/fs-cache"));
    }

    #[test]
    fn logging_section_parses() {
        let toml = r#"
            poll_interval_ms = 1000
            progress_interval_ms = 1000
            user_agent = "fetchstep"
            connect_timeout_secs = 30

            [logging]
            filter = "warn"
            file = "/var/log/fetchstep.log"
        "#;
        let cfg: FetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.logging.filter.as_deref(), Some("warn"));
        assert_eq!(
            cfg.logging.file.as_deref(),
            Some(std::path::Path::new("/var/log/fetchstep.log"))
        );
    }
}
