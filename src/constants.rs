//! # Constants
//!
//! API identifiers, well-known names and default configuration values.

/// API group of the managed resources
pub const GROUP_NAME: &str = "servicecatalog.k8s.io";

/// API version of the managed resources
pub const API_VERSION: &str = "v1alpha1";

/// Resource plural for ServiceInstance
pub const RESOURCE_SERVICE_INSTANCES: &str = "serviceinstances";

/// Resource plural for ServiceInstanceCredential
pub const RESOURCE_SERVICE_INSTANCE_CREDENTIALS: &str = "serviceinstancecredentials";

/// Subresource through which only status may be written
pub const SUBRESOURCE_STATUS: &str = "status";

/// Finalizer attached on create; removed by the reconciler once deprovisioning completes
pub const FINALIZER_SERVICE_CATALOG: &str = "kubernetes-incubator/service-catalog";

/// Condition type reporting readiness
pub const CONDITION_READY: &str = "Ready";

/// Reason recorded on the Ready condition when a spec change is accepted
pub const REASON_UPDATE_INITIATED: &str = "UpdateInitiated";

/// Exact length of a SHA-256 parameters checksum in hex
pub const PARAMETERS_CHECKSUM_LENGTH: usize = 64;

/// RFC 1123 subdomain maximum length (object names)
pub const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

/// RFC 1123 label maximum length (namespaces)
pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;

/// Maximum length of a service class name
pub const SERVICE_CLASS_NAME_MAX_LENGTH: usize = 63;

/// Maximum length of a service plan name
pub const SERVICE_PLAN_NAME_MAX_LENGTH: usize = 63;

/// Default for capturing the originating identity on writes
pub const DEFAULT_ORIGINATING_IDENTITY: bool = false;

/// Default informer resync interval, which bounds cache staleness (seconds)
pub const DEFAULT_CACHE_RESYNC_INTERVAL_SECS: u64 = 300;

/// Default tracing filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "service_catalog_guard=info";
