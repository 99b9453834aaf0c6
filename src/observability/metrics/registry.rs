//! # Metrics Registry
//!
//! Prometheus metrics registry setup and registration.

use anyhow::Result;
use prometheus::Registry;
use std::sync::LazyLock;

/// Crate-wide Prometheus metrics registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Register all guard metrics with the Prometheus registry
///
/// Call once at startup. Metrics are recorded whether or not they are
/// registered; registration only makes them visible to `REGISTRY.gather()`.
#[allow(
    clippy::missing_errors_doc,
    reason = "Fails only when a metric is registered twice"
)]
pub fn register_metrics() -> Result<()> {
    super::guard_metrics::register_guard_metrics()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::increment_strategy_kind_mismatches;
    use prometheus::TextEncoder;

    #[test]
    fn test_register_metrics_exposes_guard_counters() {
        register_metrics().expect("first registration succeeds");
        increment_strategy_kind_mismatches();

        let exposition = TextEncoder::new()
            .encode_to_string(&REGISTRY.gather())
            .expect("metrics encode");
        assert!(exposition.contains("service_catalog_strategy_kind_mismatches_total"));

        // Registering the same collectors again is rejected
        assert!(register_metrics().is_err());
    }
}
