//! Runtime configuration.
//!
//! Timing parameters for detection and answering, plus the location of the
//! persisted question-bank text. Loaded from YAML, optionally overridden from
//! `ANSWER_ASSIST_*` environment variables.

use crate::error::ConfigError;
use crate::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_MIN_ANSWER_INTERVAL_MS, DEFAULT_RESUME_DELAY_MS,
    DEFAULT_START_DELAY_MS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_DEBOUNCE_MS: &str = "ANSWER_ASSIST_DEBOUNCE_MS";
const ENV_MIN_ANSWER_INTERVAL_MS: &str = "ANSWER_ASSIST_MIN_ANSWER_INTERVAL_MS";
const ENV_RESUME_DELAY_MS: &str = "ANSWER_ASSIST_RESUME_DELAY_MS";
const ENV_START_DELAY_MS: &str = "ANSWER_ASSIST_START_DELAY_MS";
const ENV_STORE_PATH: &str = "ANSWER_ASSIST_STORE_PATH";

/// Configuration for knowledge loading and live detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    /// Quiet period before a burst of change notifications is processed (ms).
    pub debounce_ms: u64,

    /// Minimum time between two applied answers (ms).
    pub min_answer_interval_ms: u64,

    /// Hold-off after a confirmation step before notifications are accepted again (ms).
    pub resume_delay_ms: u64,

    /// Delay used by deferred starts, letting the question surface settle (ms).
    pub start_delay_ms: u64,

    /// Where the raw question-bank text is persisted. `None` keeps it in memory.
    pub store_path: Option<PathBuf>,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_answer_interval_ms: DEFAULT_MIN_ANSWER_INTERVAL_MS,
            resume_delay_ms: DEFAULT_RESUME_DELAY_MS,
            start_delay_ms: DEFAULT_START_DELAY_MS,
            store_path: None,
        }
    }
}

impl AssistConfig {
    /// Load from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::load_from_str(&content)
    }

    /// Load from a YAML string
    pub fn load_from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `ANSWER_ASSIST_*` environment overrides on top of this config.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment, test maps).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &str| -> Result<Option<u64>, ConfigError> {
            match lookup(key) {
                Some(value) => {
                    let parsed = value.trim().parse::<u64>();
                    parsed.map(Some).map_err(|_| ConfigError::InvalidEnv {
                        key: key.to_string(),
                        value,
                    })
                }
                None => Ok(None),
            }
        };

        if let Some(ms) = millis(ENV_DEBOUNCE_MS)? {
            self.debounce_ms = ms;
        }
        if let Some(ms) = millis(ENV_MIN_ANSWER_INTERVAL_MS)? {
            self.min_answer_interval_ms = ms;
        }
        if let Some(ms) = millis(ENV_RESUME_DELAY_MS)? {
            self.resume_delay_ms = ms;
        }
        if let Some(ms) = millis(ENV_START_DELAY_MS)? {
            self.start_delay_ms = ms;
        }
        if let Some(path) = lookup(ENV_STORE_PATH).filter(|p| !p.trim().is_empty()) {
            self.store_path = Some(PathBuf::from(path));
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject configurations the detection loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid(
                "debounce_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the debounce window.
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the minimum interval between applied answers.
    pub fn min_answer_interval_ms(mut self, ms: u64) -> Self {
        self.min_answer_interval_ms = ms;
        self
    }

    /// Set the post-confirmation hold-off.
    pub fn resume_delay_ms(mut self, ms: u64) -> Self {
        self.resume_delay_ms = ms;
        self
    }

    /// Set the deferred-start delay.
    pub fn start_delay_ms(mut self, ms: u64) -> Self {
        self.start_delay_ms = ms;
        self
    }

    /// Persist the raw question-bank text at `path`.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn min_answer_interval(&self) -> Duration {
        Duration::from_millis(self.min_answer_interval_ms)
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AssistConfig::default();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.min_answer_interval_ms, 800);
        assert_eq!(config.resume_delay_ms, 800);
        assert_eq!(config.start_delay_ms, 1200);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AssistConfig::load_from_str("debounce_ms: 100\n").unwrap();
        assert_eq!(config.debounce_ms, 100);
        assert_eq!(config.min_answer_interval_ms, 800);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_answer_interval_ms: 1500").unwrap();
        writeln!(file, "store_path: /tmp/bank.txt").unwrap();

        let config = AssistConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.min_answer_interval(), Duration::from_millis(1500));
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/bank.txt")));
    }

    #[test]
    fn test_missing_file() {
        let err = AssistConfig::load_from_file(Path::new("/nonexistent/assist.yaml"));
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = AssistConfig::load_from_str("debounce_ms: [not, a, number]");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_debounce_rejected() {
        let err = AssistConfig::load_from_str("debounce_ms: 0");
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_DEBOUNCE_MS, "300"),
            (ENV_RESUME_DELAY_MS, " 50 "),
            (ENV_STORE_PATH, "data/bank.txt"),
        ]
        .into_iter()
        .collect();

        let config = AssistConfig::default()
            .with_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.resume_delay_ms, 50);
        assert_eq!(config.min_answer_interval_ms, 800);
        assert_eq!(config.store_path, Some(PathBuf::from("data/bank.txt")));
    }

    #[test]
    fn test_bad_override_value() {
        let err = AssistConfig::default().with_overrides(|k| {
            (k == ENV_MIN_ANSWER_INTERVAL_MS).then(|| "soon".to_string())
        });
        match err {
            Err(ConfigError::InvalidEnv { key, value }) => {
                assert_eq!(key, ENV_MIN_ANSWER_INTERVAL_MS);
                assert_eq!(value, "soon");
            }
            other => panic!("expected InvalidEnv, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_pattern() {
        let config = AssistConfig::default()
            .debounce_ms(10)
            .min_answer_interval_ms(20)
            .resume_delay_ms(30)
            .start_delay_ms(40)
            .with_store_path("bank.txt");

        assert_eq!(config.debounce(), Duration::from_millis(10));
        assert_eq!(config.min_answer_interval(), Duration::from_millis(20));
        assert_eq!(config.resume_delay(), Duration::from_millis(30));
        assert_eq!(config.start_delay(), Duration::from_millis(40));
        assert_eq!(config.store_path, Some(PathBuf::from("bank.txt")));
    }
}
