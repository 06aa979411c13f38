//! Retry policy for strict-mode updates

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of retries after the first strict attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff before the first retry
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(50);

/// How an update is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Read, compute, write unconditionally.
    ///
    /// Lossy under concurrency: two callers that read the same state both
    /// write a result derived from it, and one observation's contribution is
    /// silently dropped. Kept for parity with clients that have always
    /// written this way.
    LastWriterWins,

    /// Read with version, compute, write only if the version is unchanged,
    /// re-reading on conflict. Gives a total order of writes per key.
    Strict,
}

impl std::str::FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_writer_wins" | "lww" => Ok(UpdateMode::LastWriterWins),
            "strict" => Ok(UpdateMode::Strict),
            other => Err(format!("unknown update mode: {}", other)),
        }
    }
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateMode::LastWriterWins => write!(f, "last_writer_wins"),
            UpdateMode::Strict => write!(f, "strict"),
        }
    }
}

/// Strict-mode retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Retries after the first attempt; 0 means a single attempt
    pub max_retries: u32,
    /// Backoff before retry `n` (0-based) is `base_delay * 2^n`
    pub base_delay: Duration,
}

impl ApplyOptions {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay before the given retry (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY)
    }
}
