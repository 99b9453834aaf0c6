//! # Observability
//!
//! Tracing subscriber setup and Prometheus metrics.

pub mod metrics;

use anyhow::Result;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns an error when a
/// subscriber is already installed, which hosts embedding the guard may ignore.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}
