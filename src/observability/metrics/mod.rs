//! # Metrics Module
//!
//! Prometheus metrics for the guard, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup and registration
//! - `guard_metrics` - Admission decisions, validation failures, strategy kind mismatches

pub mod guard_metrics;
pub mod registry;

pub use guard_metrics::*;
pub use registry::*;
