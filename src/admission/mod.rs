//! # Admission Gate
//!
//! `BlockConcurrentUpdates` rejects spec updates to ServiceInstance and
//! ServiceInstanceCredential objects that still have a change pending.
//!
//! A change is pending while `metadata.generation` is ahead of
//! `status.reconciledGeneration`, or while an instance is being deleted.
//! Both the incoming object and the cached copy under the same key are
//! checked. Writes to the `status` subresource always pass, since that is the
//! reconciler's only way to settle a pending change.
//!
//! The gate is advisory: its cache may lag storage. The registry's resource
//! version compare-and-swap stays authoritative.

mod cache;

pub use cache::{ReflectorCacheView, ResourceCacheView, SnapshotCache};

use crate::constants::{GROUP_NAME, SUBRESOURCE_STATUS};
use crate::crd::{
    CatalogResource, ManagedResource, ObjectKey, PendingChange, ResourceKind, ServiceInstance,
    ServiceInstanceCredential,
};
use crate::observability::metrics;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

/// What the gate knows about a request
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionAttributes {
    pub operation: Operation,
    pub group: String,
    /// Lowercase resource plural
    pub resource: String,
    /// Empty for the main resource
    pub subresource: String,
    pub namespace: String,
    pub name: String,
    /// Object being written
    pub object: Option<ManagedResource>,
}

impl AdmissionAttributes {
    /// Spec update of a managed object
    pub fn update(object: impl Into<ManagedResource>) -> Self {
        let object = object.into();
        let ObjectKey { namespace, name } = object.key();
        Self {
            operation: Operation::Update,
            group: GROUP_NAME.to_string(),
            resource: object.kind().plural().to_string(),
            subresource: String::new(),
            namespace,
            name,
            object: Some(object),
        }
    }

    /// Request against an arbitrary group/resource
    pub fn new(
        operation: Operation,
        group: impl Into<String>,
        resource: impl Into<String>,
        object: Option<ManagedResource>,
    ) -> Self {
        let ObjectKey { namespace, name } = object
            .as_ref()
            .map(ManagedResource::key)
            .unwrap_or_else(|| ObjectKey::new("", ""));
        Self {
            operation,
            group: group.into(),
            resource: resource.into(),
            subresource: String::new(),
            namespace,
            name,
            object,
        }
    }

    #[must_use]
    pub fn with_subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = subresource.into();
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.namespace, &self.name)
    }
}

/// Admission rejection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Not retryable without changing the request (or waiting for the gate to warm up)
    #[error("{resource} \"{name}\" is forbidden: {reason}")]
    Forbidden {
        resource: String,
        name: String,
        reason: String,
    },
    /// Re-read the object and retry with backoff
    #[error("Operation cannot be fulfilled on {resource} \"{key}\": {key} has a pending change already ({change})")]
    Conflict {
        resource: String,
        key: ObjectKey,
        change: PendingChange,
    },
    /// The host routed an object to the wrong resource
    #[error("{0}")]
    BadRequest(String),
}

impl AdmissionError {
    /// HTTP status code
    pub fn code(&self) -> u16 {
        match self {
            AdmissionError::Forbidden { .. } => 403,
            AdmissionError::Conflict { .. } => 409,
            AdmissionError::BadRequest(_) => 400,
        }
    }

    /// Machine-readable status reason
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::Forbidden { .. } => "Forbidden",
            AdmissionError::Conflict { .. } => "Conflict",
            AdmissionError::BadRequest(_) => "BadRequest",
        }
    }
}

/// Blocks spec updates that would race an in-flight reconciliation
pub struct BlockConcurrentUpdates {
    instances: Arc<dyn ResourceCacheView<ServiceInstance>>,
    credentials: Arc<dyn ResourceCacheView<ServiceInstanceCredential>>,
}

impl fmt::Debug for BlockConcurrentUpdates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockConcurrentUpdates")
            .field("instances_synced", &self.instances.has_synced())
            .field("credentials_synced", &self.credentials.has_synced())
            .finish()
    }
}

impl BlockConcurrentUpdates {
    pub const PLUGIN_NAME: &'static str = "BlockConcurrentUpdates";

    pub fn new(
        instances: Arc<dyn ResourceCacheView<ServiceInstance>>,
        credentials: Arc<dyn ResourceCacheView<ServiceInstanceCredential>>,
    ) -> Self {
        Self {
            instances,
            credentials,
        }
    }

    /// Only updates are gated
    pub fn handles(&self, operation: Operation) -> bool {
        operation == Operation::Update
    }

    /// Both caches have completed their initial synchronization
    pub fn is_ready(&self) -> bool {
        self.instances.has_synced() && self.credentials.has_synced()
    }

    /// Poll readiness until it holds or `timeout` elapses
    pub async fn wait_for_ready(&self, timeout: Duration) -> bool {
        let ready = tokio::time::timeout(timeout, async {
            let mut interval = tokio::time::interval(Duration::from_millis(100));
            while !self.is_ready() {
                interval.tick().await;
            }
        })
        .await
        .is_ok();
        if ready {
            info!("{} caches synced", Self::PLUGIN_NAME);
        } else {
            warn!(
                "{} caches not synced after {:?}",
                Self::PLUGIN_NAME,
                timeout
            );
        }
        ready
    }

    /// Largest staleness bound of the two caches, if both are known
    pub fn staleness_bound(&self) -> Option<Duration> {
        Some(
            self.instances
                .staleness_bound()?
                .max(self.credentials.staleness_bound()?),
        )
    }

    /// Decide one request
    pub fn admit(&self, attrs: &AdmissionAttributes) -> Result<(), AdmissionError> {
        let result = self.decide(attrs);
        let decision = match &result {
            Ok(Decision::Allow) => "allow",
            Ok(Decision::Skip) => "skip",
            Err(AdmissionError::Forbidden { .. }) => "forbidden",
            Err(AdmissionError::Conflict { .. }) => "conflict",
            Err(AdmissionError::BadRequest(_)) => "bad_request",
        };
        metrics::increment_admission_decisions(&attrs.resource, decision);
        result.map(|_| ())
    }

    fn decide(&self, attrs: &AdmissionAttributes) -> Result<Decision, AdmissionError> {
        if !self.handles(attrs.operation) {
            return Ok(Decision::Skip);
        }

        if !self.is_ready() {
            warn!(
                "{} rejecting {} {}: caches not yet synced",
                Self::PLUGIN_NAME,
                attrs.resource,
                attrs.key()
            );
            return Err(AdmissionError::Forbidden {
                resource: attrs.resource.clone(),
                name: attrs.name.clone(),
                reason: "not yet ready to handle request".to_string(),
            });
        }

        if attrs.group != GROUP_NAME {
            return Ok(Decision::Skip);
        }

        if attrs.subresource == SUBRESOURCE_STATUS {
            debug!(
                "Skipping pending change check for {} {} status update",
                attrs.resource,
                attrs.key()
            );
            return Ok(Decision::Skip);
        }

        let Some(kind) = ResourceKind::from_plural(&attrs.resource) else {
            return Ok(Decision::Skip);
        };

        let object = attrs
            .object
            .as_ref()
            .filter(|obj| obj.kind() == kind)
            .ok_or_else(|| {
                AdmissionError::BadRequest(format!(
                    "Resource was marked with kind {kind} but was unable to be converted"
                ))
            })?;

        let key = object.key();
        if let Some(change) = object.pending_change().or_else(|| self.cached_pending_change(object)) {
            debug!("{} {} has a pending change already: {}", kind, key, change);
            warn!(
                "{} rejecting update of {} {}: {}",
                Self::PLUGIN_NAME,
                kind,
                key,
                change
            );
            return Err(AdmissionError::Conflict {
                resource: attrs.resource.clone(),
                key,
                change,
            });
        }

        debug!("{} admitted update of {} {}", Self::PLUGIN_NAME, kind, key);
        Ok(Decision::Allow)
    }

    /// Pending change of the cached copy, which may be newer than the caller's object
    fn cached_pending_change(&self, object: &ManagedResource) -> Option<PendingChange> {
        let key = object.key();
        match object {
            ManagedResource::Instance(_) => self.instances.get(&key)?.pending_change(),
            ManagedResource::Credential(_) => self.credentials.get(&key)?.pending_change(),
        }
    }
}

enum Decision {
    Allow,
    Skip,
}
