//! Runner configuration
//!
//! Read once from the environment at startup and passed into the poller.
//! The script timings are fixed for production and only changed by tests.

use anyhow::{Context, Result};
use std::time::Duration;

pub const NEXT_TASK_URL_VAR: &str = "HELIX_NEXT_TASK_URL";
pub const INITIAL_SESSION_URL_VAR: &str = "HELIX_INITIAL_SESSION_URL";
pub const MOCK_ERROR_VAR: &str = "HELIX_MOCK_ERROR";
pub const MOCK_DELAY_VAR: &str = "HELIX_MOCK_DELAY";

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL polled for the next task
    pub next_task_url: String,

    /// URL polled once for the session config
    pub initial_session_url: String,

    /// When set, the runner fails right after echoing a task
    pub mock_error: Option<String>,

    /// Extra latency injected after echoing a task, in whole seconds
    ///
    /// Kept as given and parsed per task by [`Config::mock_delay`], so a
    /// malformed value only fails once a task has been consumed.
    pub mock_delay: Option<String>,

    /// Pause between polls while an endpoint is not ready
    pub poll_interval: Duration,

    /// Pause between decoding a task and the first output line
    pub warmup: Duration,

    /// Pause after each placeholder token
    pub token_interval: Duration,

    /// Number of placeholder tokens per response
    pub token_count: usize,
}

impl Config {
    /// Creates a new configuration with default timings and no mock hooks
    pub fn new(next_task_url: String, initial_session_url: String) -> Self {
        Self {
            next_task_url,
            initial_session_url,
            mock_error: None,
            mock_delay: None,
            poll_interval: Duration::from_millis(100),
            warmup: Duration::from_secs(1),
            token_interval: Duration::from_millis(100),
            token_count: 9,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - HELIX_NEXT_TASK_URL (required)
    /// - HELIX_INITIAL_SESSION_URL (required)
    /// - HELIX_MOCK_ERROR (optional, message to fail with)
    /// - HELIX_MOCK_DELAY (optional, whole seconds, parsed per task)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let next_task_url = var(NEXT_TASK_URL_VAR)
            .ok_or_else(|| anyhow::anyhow!("{} is not set", NEXT_TASK_URL_VAR))?;

        let initial_session_url = var(INITIAL_SESSION_URL_VAR)
            .ok_or_else(|| anyhow::anyhow!("{} is not set", INITIAL_SESSION_URL_VAR))?;

        let mut config = Self::new(next_task_url, initial_session_url);
        config.mock_error = var(MOCK_ERROR_VAR);
        config.mock_delay = var(MOCK_DELAY_VAR);
        Ok(config)
    }

    /// Parses the mock delay, `None` when it is off
    pub fn mock_delay(&self) -> Result<Option<Duration>> {
        self.mock_delay
            .as_deref()
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| {
                        format!("{} must be whole seconds, got {:?}", MOCK_DELAY_VAR, raw)
                    })
            })
            .transpose()
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            (NEXT_TASK_URL_VAR, &self.next_task_url),
            (INITIAL_SESSION_URL_VAR, &self.initial_session_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        Ok(())
    }
}
