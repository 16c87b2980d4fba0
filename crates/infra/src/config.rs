//! Session configuration read from the environment.
//!
//! | variable                      | default | meaning                                   |
//! |-------------------------------|---------|-------------------------------------------|
//! | `PLM_STAGE_FETCH_CONCURRENCY` | `8`     | in-flight current-stage lookups on load   |
//! | `PLM_LOG_FORMAT`              | `json`  | `json` or `pretty`                        |
//!
//! Unparseable values fall back to the default and are logged.

use plm_observability::LogFormat;

pub const STAGE_FETCH_CONCURRENCY_VAR: &str = "PLM_STAGE_FETCH_CONCURRENCY";
pub const LOG_FORMAT_VAR: &str = "PLM_LOG_FORMAT";

pub const DEFAULT_STAGE_FETCH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on concurrent stage lookups; always at least 1.
    pub stage_fetch_concurrency: usize,
    pub log_format: LogFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stage_fetch_concurrency: DEFAULT_STAGE_FETCH_CONCURRENCY,
            log_format: LogFormat::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let stage_fetch_concurrency = match lookup(STAGE_FETCH_CONCURRENCY_VAR) {
            None => defaults.stage_fetch_concurrency,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    tracing::warn!(
                        var = STAGE_FETCH_CONCURRENCY_VAR,
                        value = %raw,
                        fallback = defaults.stage_fetch_concurrency,
                        "invalid value, using default"
                    );
                    defaults.stage_fetch_concurrency
                }
            },
        };

        let log_format = match lookup(LOG_FORMAT_VAR) {
            None => defaults.log_format,
            Some(raw) => raw.parse::<LogFormat>().unwrap_or_else(|err: String| {
                tracing::warn!(var = LOG_FORMAT_VAR, error = %err, "invalid value, using default");
                defaults.log_format
            }),
        };

        Self {
            stage_fetch_concurrency,
            log_format,
        }
    }

    /// Install the process-wide subscriber in the configured format.
    ///
    /// Only the first call in a process takes effect.
    pub fn init_logging(&self) {
        plm_observability::init_with(self.log_format);
    }

    pub fn with_stage_fetch_concurrency(mut self, n: usize) -> Self {
        self.stage_fetch_concurrency = n.max(1);
        self
    }
}
