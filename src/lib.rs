//! Service Catalog Guard Library
//!
//! Admission gate, lifecycle strategy and status lifecycle validation for
//! ServiceInstance and ServiceInstanceCredential resources.
//!
//! - [`admission::BlockConcurrentUpdates`] rejects spec updates racing a pending reconciliation
//! - [`strategy::LifecycleStrategy`] normalizes objects on create, update and delete
//! - [`validation`] checks the operation state machine across spec and status
//! - [`registry::ServiceCatalogRegistry`] composes all three in front of an
//!   optimistic-concurrency store

pub mod admission;
pub mod config;
pub mod constants;
pub mod crd;
pub mod observability;
pub mod registry;
pub mod strategy;
pub mod validation;

// Re-export CRD types for convenience
pub use crd::*;
