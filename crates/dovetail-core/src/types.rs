//! Serializable policy types shared by the configuration file and the client

use serde::{Deserialize, Serialize};

use crate::retry::{Delay, RetryConfig};

/// Retry policy for outbound API calls
///
/// This is the file-level description of a [`RetryConfig`]. Only the backoff
/// form of the delay can be expressed here; computed delays are code-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of additional attempts after the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff kind applied between attempts
    #[serde(default)]
    pub delay: BackoffKind,

    /// Base delay in milliseconds
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay: BackoffKind::default(),
            base_delay_ms: default_base_delay(),
        }
    }
}

impl RetryPolicy {
    /// Build a retry configuration for failures of type `E`
    ///
    /// The returned configuration retries every failure and has no observer;
    /// call sites attach their own predicate and observer.
    pub fn to_config<E>(&self) -> RetryConfig<E> {
        RetryConfig::new()
            .with_max_retries(self.max_retries)
            .with_delay(Delay::backoff(self.delay, self.base_delay_ms))
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_base_delay() -> u64 {
    1000
}

/// Backoff kind between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackoffKind {
    /// Same delay before every retry
    Constant,

    /// Delay doubles after every failed attempt (default)
    #[default]
    Exponential,
}
