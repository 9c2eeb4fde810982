use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::errors::Error;
use crate::fetch::retry::{RetryPolicy, DEFAULT_BACKOFF_STEP};
use crate::history::CACHE_FORMAT_VERSION;

pub const ENV_SNAPSHOT_URL: &str = "DATEFACTS_SNAPSHOT_URL";
pub const ENV_HISTORICAL_SNAPSHOT_URL: &str = "DATEFACTS_HISTORICAL_SNAPSHOT_URL";
pub const ENV_CURRENT_POPULATION_URL: &str = "DATEFACTS_CURRENT_POPULATION_URL";
pub const ENV_HISTORICAL_POPULATION_URL: &str = "DATEFACTS_HISTORICAL_POPULATION_URL";
pub const ENV_CACHE_DIR: &str = "DATEFACTS_CACHE_DIR";

/// Source URLs and runtime knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub snapshot_url: String,
    pub historical_snapshot_url: Option<String>,
    pub current_population_url: String,
    pub historical_population_url: String,
    pub cache_dir: PathBuf,
    pub max_attempts: u32,
    pub attempt_timeout_secs: u64,
    pub cache_ttl_minutes: u64,
    pub cache_format_version: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_url: String::new(),
            historical_snapshot_url: None,
            current_population_url: String::new(),
            historical_population_url: String::new(),
            cache_dir: PathBuf::from("cache"),
            max_attempts: 3,
            attempt_timeout_secs: 10,
            cache_ttl_minutes: 30,
            cache_format_version: CACHE_FORMAT_VERSION,
        }
    }
}

impl Config {
    /// YAML file, then environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {:?}", path))?;
        let mut cfg =
            Self::from_yaml(&text).with_context(|| format!("parsing config {:?}", path))?;
        cfg.apply_overrides(|k| std::env::var(k).ok());
        cfg.validate()
            .with_context(|| format!("validating config {:?}", path))?;
        Ok(cfg)
    }

    /// Defaults plus environment variables only.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_overrides(|k| std::env::var(k).ok());
        cfg.validate().context("validating config from environment")?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Overwrite fields from `lookup` (normally `std::env::var`); blank values
    /// are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(v) = get(ENV_SNAPSHOT_URL) {
            self.snapshot_url = v;
        }
        if let Some(v) = get(ENV_HISTORICAL_SNAPSHOT_URL) {
            self.historical_snapshot_url = Some(v);
        }
        if let Some(v) = get(ENV_CURRENT_POPULATION_URL) {
            self.current_population_url = v;
        }
        if let Some(v) = get(ENV_HISTORICAL_POPULATION_URL) {
            self.historical_population_url = v;
        }
        if let Some(v) = get(ENV_CACHE_DIR) {
            self.cache_dir = PathBuf::from(v);
        }
    }

    /// Every required URL present and absolute.
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("snapshot_url", ENV_SNAPSHOT_URL, Some(&self.snapshot_url)),
            (
                "current_population_url",
                ENV_CURRENT_POPULATION_URL,
                Some(&self.current_population_url),
            ),
            (
                "historical_population_url",
                ENV_HISTORICAL_POPULATION_URL,
                Some(&self.historical_population_url),
            ),
            (
                "historical_snapshot_url",
                ENV_HISTORICAL_SNAPSHOT_URL,
                self.historical_snapshot_url.as_ref(),
            ),
        ];
        for (name, env, value) in required {
            let Some(value) = value else {
                continue;
            };
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{name} is not set (or set {env})")));
            }
            Url::parse(value)
                .map_err(|e| Error::Config(format!("{name} {value:?} is not a URL: {e}")))?;
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
            backoff_step: DEFAULT_BACKOFF_STEP,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes * 60)
    }
}
