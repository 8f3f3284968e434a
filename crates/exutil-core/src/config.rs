use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{BackoffConfig, ExchangeError};

/// Backoff curve parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Steps in the backoff schedule before it is exhausted.
    pub retries: u32,
    /// Growth factor per step.
    pub factor: f64,
    /// First (and smallest) delay in milliseconds.
    pub min_delay_ms: u64,
    /// Largest delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let b = BackoffConfig::default();
        Self {
            retries: b.retries,
            factor: b.factor,
            min_delay_ms: b.min_delay.as_millis() as u64,
            max_delay_ms: b.max_delay.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn to_backoff(&self) -> Result<BackoffConfig> {
        let backoff = BackoffConfig {
            retries: self.retries,
            factor: self.factor,
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        };
        backoff.validate().context("invalid [retry] section")?;
        Ok(backoff)
    }
}

fn default_rate_limit_retries() -> u32 {
    5
}

/// Global configuration loaded from `~/.config/exutil/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExutilConfig {
    /// Bounded retries granted to rate-limited calls.
    #[serde(default = "default_rate_limit_retries")]
    pub rate_limit_retries: u32,
    /// Optional backoff curve; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for ExutilConfig {
    fn default() -> Self {
        Self {
            rate_limit_retries: default_rate_limit_retries(),
            retry: None,
        }
    }
}

impl ExutilConfig {
    /// Effective backoff curve: the `[retry]` section or the built-in default.
    pub fn backoff(&self) -> Result<BackoffConfig> {
        match &self.retry {
            Some(r) => r.to_backoff(),
            None => Ok(BackoffConfig::default()),
        }
    }

    /// Rate-limit error carrying the configured bounded budget.
    pub fn rate_limited(&self, retry_after: Option<Duration>) -> ExchangeError {
        ExchangeError::rate_limited(self.rate_limit_retries, retry_after)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("exutil")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ExutilConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ExutilConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<ExutilConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ExutilConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
