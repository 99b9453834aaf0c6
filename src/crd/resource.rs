//! # Managed Resources
//!
//! Kind-independent view over the two managed resource kinds.
//!
//! The admission gate and the registry work on either kind. `CatalogResource`
//! gives them a common set of accessors and `ManagedResource` is the closed
//! sum used wherever a value of either kind is passed around.

use super::{ServiceInstance, ServiceInstanceCredential};
use crate::constants::{RESOURCE_SERVICE_INSTANCES, RESOURCE_SERVICE_INSTANCE_CREDENTIALS};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::fmt;

/// The two resource kinds under management
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    ServiceInstance,
    ServiceInstanceCredential,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::ServiceInstance => "ServiceInstance",
            ResourceKind::ServiceInstanceCredential => "ServiceInstanceCredential",
        }
    }

    /// Lowercase plural used in request attributes
    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::ServiceInstance => RESOURCE_SERVICE_INSTANCES,
            ResourceKind::ServiceInstanceCredential => RESOURCE_SERVICE_INSTANCE_CREDENTIALS,
        }
    }

    pub fn from_plural(plural: &str) -> Option<Self> {
        match plural {
            RESOURCE_SERVICE_INSTANCES => Some(ResourceKind::ServiceInstance),
            RESOURCE_SERVICE_INSTANCE_CREDENTIALS => Some(ResourceKind::ServiceInstanceCredential),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespace/name key of a namespaced object
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Why a resource is not yet settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingChange {
    /// Deletion was requested and the finalizer has not been released
    Deletion,
    /// The spec moved ahead of what the reconciler has processed
    Generation { generation: i64, reconciled: i64 },
}

impl fmt::Display for PendingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingChange::Deletion => f.write_str("deletion in progress"),
            PendingChange::Generation {
                generation,
                reconciled,
            } => write!(
                f,
                "generation {generation} not yet reconciled (reconciled {reconciled})"
            ),
        }
    }
}

/// Accessors shared by ServiceInstance and ServiceInstanceCredential
pub trait CatalogResource: Resource<DynamicType = ()> + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    /// `metadata.generation`, zero when unset
    fn generation(&self) -> i64 {
        self.meta().generation.unwrap_or_default()
    }

    /// `status.reconciledGeneration`, zero when there is no status
    fn reconciled_generation(&self) -> i64;

    /// Pending change that blocks further spec updates, if any
    fn pending_change(&self) -> Option<PendingChange>;

    fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace().unwrap_or_default(), self.name_any())
    }
}

fn generation_pending<K: CatalogResource>(obj: &K) -> Option<PendingChange> {
    let generation = obj.generation();
    let reconciled = obj.reconciled_generation();
    (generation != reconciled).then_some(PendingChange::Generation {
        generation,
        reconciled,
    })
}

impl CatalogResource for ServiceInstance {
    const KIND: ResourceKind = ResourceKind::ServiceInstance;

    fn reconciled_generation(&self) -> i64 {
        self.status
            .as_ref()
            .map(|s| s.reconciled_generation)
            .unwrap_or_default()
    }

    fn pending_change(&self) -> Option<PendingChange> {
        if self.meta().deletion_timestamp.is_some() {
            return Some(PendingChange::Deletion);
        }
        generation_pending(self)
    }
}

impl CatalogResource for ServiceInstanceCredential {
    const KIND: ResourceKind = ResourceKind::ServiceInstanceCredential;

    fn reconciled_generation(&self) -> i64 {
        self.status
            .as_ref()
            .map(|s| s.reconciled_generation)
            .unwrap_or_default()
    }

    // Deletion alone does not block credential updates
    fn pending_change(&self) -> Option<PendingChange> {
        generation_pending(self)
    }
}

/// A value of either managed kind
#[derive(Debug, Clone, PartialEq)]
pub enum ManagedResource {
    Instance(ServiceInstance),
    Credential(ServiceInstanceCredential),
}

impl ManagedResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ManagedResource::Instance(_) => ResourceKind::ServiceInstance,
            ManagedResource::Credential(_) => ResourceKind::ServiceInstanceCredential,
        }
    }

    pub fn key(&self) -> ObjectKey {
        match self {
            ManagedResource::Instance(obj) => obj.key(),
            ManagedResource::Credential(obj) => obj.key(),
        }
    }

    pub fn meta(&self) -> &ObjectMeta {
        match self {
            ManagedResource::Instance(obj) => obj.meta(),
            ManagedResource::Credential(obj) => obj.meta(),
        }
    }

    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            ManagedResource::Instance(obj) => obj.meta_mut(),
            ManagedResource::Credential(obj) => obj.meta_mut(),
        }
    }

    pub fn pending_change(&self) -> Option<PendingChange> {
        match self {
            ManagedResource::Instance(obj) => obj.pending_change(),
            ManagedResource::Credential(obj) => obj.pending_change(),
        }
    }

    pub fn as_instance(&self) -> Option<&ServiceInstance> {
        match self {
            ManagedResource::Instance(obj) => Some(obj),
            ManagedResource::Credential(_) => None,
        }
    }

    pub fn as_credential(&self) -> Option<&ServiceInstanceCredential> {
        match self {
            ManagedResource::Credential(obj) => Some(obj),
            ManagedResource::Instance(_) => None,
        }
    }
}

impl From<ServiceInstance> for ManagedResource {
    fn from(obj: ServiceInstance) -> Self {
        ManagedResource::Instance(obj)
    }
}

impl From<ServiceInstanceCredential> for ManagedResource {
    fn from(obj: ServiceInstanceCredential) -> Self {
        ManagedResource::Credential(obj)
    }
}
