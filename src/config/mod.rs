//! # Guard Configuration
//!
//! Settings loaded from environment variables with defaults.
//!
//! The configuration is an explicit value handed to the strategies and the
//! registry at construction time. Nothing reads process-wide state after that,
//! so two registries with different settings can run side by side.

use crate::constants::{
    DEFAULT_CACHE_RESYNC_INTERVAL_SECS, DEFAULT_LOG_FILTER, DEFAULT_ORIGINATING_IDENTITY,
};
use std::time::Duration;

/// Environment variable enabling originating identity capture
pub const ENV_ORIGINATING_IDENTITY: &str = "ORIGINATING_IDENTITY";

/// Environment variable for the cache resync interval in seconds
pub const ENV_CACHE_RESYNC_INTERVAL_SECS: &str = "CACHE_RESYNC_INTERVAL_SECS";

/// Environment variable for the default tracing filter
pub const ENV_LOG_FILTER: &str = "LOG_FILTER";

/// Guard configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Stamp the acting user's identity into `spec.userInfo` on create, spec update and delete
    pub originating_identity: bool,
    /// Resync interval of the resource caches
    /// This is the documented upper bound on how stale the admission cache view may be
    pub cache_resync_interval: Duration,
    /// Tracing filter used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            originating_identity: DEFAULT_ORIGINATING_IDENTITY,
            cache_resync_interval: Duration::from_secs(DEFAULT_CACHE_RESYNC_INTERVAL_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl GuardConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            originating_identity: env_var_or_default(
                ENV_ORIGINATING_IDENTITY,
                DEFAULT_ORIGINATING_IDENTITY,
            ),
            cache_resync_interval: Duration::from_secs(env_var_or_default(
                ENV_CACHE_RESYNC_INTERVAL_SECS,
                DEFAULT_CACHE_RESYNC_INTERVAL_SECS,
            )),
            log_filter: env_var_or_default(ENV_LOG_FILTER, DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Same configuration with originating identity capture switched on or off
    #[must_use]
    pub fn with_originating_identity(mut self, enabled: bool) -> Self {
        self.originating_identity = enabled;
        self
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
