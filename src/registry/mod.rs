//! # Service Catalog Registry
//!
//! In-memory host composing the lifecycle strategy, the admission gate and
//! the validators in front of an optimistic-concurrency store.
//!
//! Write path for a spec update:
//!
//! 1. load the stored object (`NotFound`)
//! 2. `BlockConcurrentUpdates::admit` on the caller's object
//! 3. `LifecycleStrategy::prepare_for_update` then `validate_update`
//! 4. compare the caller's `resourceVersion` with the stored one (`Conflict`)
//! 5. store under a new `resourceVersion`
//!
//! Status updates take the same path through the `status` subresource and the
//! `StatusStrategy`. The caches consulted by the gate are refreshed only by
//! `sync_caches`, which stands in for an informer resync.

use crate::admission::{
    AdmissionAttributes, AdmissionError, BlockConcurrentUpdates, Operation, ResourceCacheView,
    SnapshotCache,
};
use crate::config::GuardConfig;
use crate::constants::{GROUP_NAME, SUBRESOURCE_STATUS};
use crate::crd::{ManagedResource, ObjectKey, ResourceKind, ServiceInstance, ServiceInstanceCredential};
use crate::strategy::{LifecycleStrategy, RequestContext, StatusStrategy, StrategyError};
use crate::validation::{FieldError, FieldPath, InvalidObjectError};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Invalid(#[from] InvalidObjectError),
    #[error(transparent)]
    Strategy(#[from] StrategyError),
    #[error("{kind} \"{key}\" not found")]
    NotFound { kind: ResourceKind, key: ObjectKey },
    #[error("{kind} \"{key}\" already exists")]
    AlreadyExists { kind: ResourceKind, key: ObjectKey },
    #[error("Operation cannot be fulfilled on {kind} \"{key}\": the object has been modified; please apply your changes to the latest version and try again")]
    Conflict { kind: ResourceKind, key: ObjectKey },
}

impl RegistryError {
    /// HTTP status code
    pub fn code(&self) -> u16 {
        match self {
            RegistryError::Admission(e) => e.code(),
            RegistryError::Invalid(_) => 422,
            RegistryError::Strategy(_) => 500,
            RegistryError::NotFound { .. } => 404,
            RegistryError::AlreadyExists { .. } | RegistryError::Conflict { .. } => 409,
        }
    }
}

#[derive(Debug, Default)]
struct Storage {
    objects: BTreeMap<(ResourceKind, ObjectKey), ManagedResource>,
    last_version: u64,
}

impl Storage {
    fn next_version(&mut self) -> String {
        self.last_version += 1;
        self.last_version.to_string()
    }
}

/// Registry for ServiceInstance and ServiceInstanceCredential objects
#[derive(Debug)]
pub struct ServiceCatalogRegistry {
    instance_strategy: LifecycleStrategy,
    credential_strategy: LifecycleStrategy,
    gate: BlockConcurrentUpdates,
    instances: Arc<SnapshotCache<ServiceInstance>>,
    credentials: Arc<SnapshotCache<ServiceInstanceCredential>>,
    storage: Mutex<Storage>,
}

impl ServiceCatalogRegistry {
    pub fn new(config: &GuardConfig) -> Self {
        let instances: Arc<SnapshotCache<ServiceInstance>> = Arc::new(
            SnapshotCache::new().with_staleness_bound(config.cache_resync_interval),
        );
        let credentials: Arc<SnapshotCache<ServiceInstanceCredential>> = Arc::new(
            SnapshotCache::new().with_staleness_bound(config.cache_resync_interval),
        );
        let instance_view: Arc<dyn ResourceCacheView<ServiceInstance>> = instances.clone();
        let credential_view: Arc<dyn ResourceCacheView<ServiceInstanceCredential>> =
            credentials.clone();
        let gate = BlockConcurrentUpdates::new(instance_view, credential_view);
        info!(
            "Service catalog registry created (originating identity: {}, cache resync: {:?})",
            config.originating_identity, config.cache_resync_interval
        );
        Self {
            instance_strategy: LifecycleStrategy::new(ResourceKind::ServiceInstance, config),
            credential_strategy: LifecycleStrategy::new(
                ResourceKind::ServiceInstanceCredential,
                config,
            ),
            gate,
            instances,
            credentials,
            storage: Mutex::new(Storage::default()),
        }
    }

    pub fn strategy(&self, kind: ResourceKind) -> &LifecycleStrategy {
        match kind {
            ResourceKind::ServiceInstance => &self.instance_strategy,
            ResourceKind::ServiceInstanceCredential => &self.credential_strategy,
        }
    }

    pub fn status_strategy(&self, kind: ResourceKind) -> StatusStrategy {
        self.strategy(kind).status_strategy()
    }

    pub fn gate(&self) -> &BlockConcurrentUpdates {
        &self.gate
    }

    pub fn instance_cache(&self) -> &Arc<SnapshotCache<ServiceInstance>> {
        &self.instances
    }

    pub fn credential_cache(&self) -> &Arc<SnapshotCache<ServiceInstanceCredential>> {
        &self.credentials
    }

    /// Stored copy of an object
    pub fn get(&self, kind: ResourceKind, key: &ObjectKey) -> Option<ManagedResource> {
        self.storage().objects.get(&(kind, key.clone())).cloned()
    }

    /// Copy storage into the gate's caches and mark them synced
    pub fn sync_caches(&self) {
        let (instances, credentials): (Vec<_>, Vec<_>) = self
            .storage()
            .objects
            .values()
            .cloned()
            .partition(|obj| obj.kind() == ResourceKind::ServiceInstance);
        self.instances
            .replace(instances.into_iter().filter_map(|obj| match obj {
                ManagedResource::Instance(instance) => Some(instance),
                ManagedResource::Credential(_) => None,
            }));
        self.credentials
            .replace(credentials.into_iter().filter_map(|obj| match obj {
                ManagedResource::Credential(credential) => Some(credential),
                ManagedResource::Instance(_) => None,
            }));
        debug!(
            "Caches synced: {} instances, {} credentials",
            self.instances.len(),
            self.credentials.len()
        );
    }

    /// Create a new object
    pub fn create(
        &self,
        obj: impl Into<ManagedResource>,
        ctx: &RequestContext,
    ) -> Result<ManagedResource, RegistryError> {
        let mut obj = obj.into();
        let kind = obj.kind();
        let strategy = self.strategy(kind);

        self.gate.admit(&AdmissionAttributes::new(
            Operation::Create,
            GROUP_NAME,
            kind.plural(),
            Some(obj.clone()),
        ))?;
        strategy.prepare_for_create(&mut obj, ctx)?;
        let errors = strategy.validate(&obj)?;
        InvalidObjectError::check(kind.as_str(), obj.key().name, errors)?;
        strategy.canonicalize(&obj)?;

        let key = obj.key();
        let mut storage = self.storage();
        if storage.objects.contains_key(&(kind, key.clone())) {
            return Err(RegistryError::AlreadyExists { kind, key });
        }
        obj.meta_mut().resource_version = Some(storage.next_version());
        storage.objects.insert((kind, key.clone()), obj.clone());
        info!("Created {} {}", kind, key);
        Ok(obj)
    }

    /// Update the spec of an existing object
    pub fn update(
        &self,
        obj: impl Into<ManagedResource>,
        ctx: &RequestContext,
    ) -> Result<ManagedResource, RegistryError> {
        let mut new = obj.into();
        let kind = new.kind();
        let strategy = self.strategy(kind);
        let old = self.load(kind, &new.key())?;

        self.gate.admit(&AdmissionAttributes::update(new.clone()))?;
        strategy.prepare_for_update(&mut new, &old, ctx)?;
        let errors = strategy.validate_update(&new, &old)?;
        InvalidObjectError::check(kind.as_str(), new.key().name, errors)?;
        strategy.canonicalize(&new)?;

        self.commit(new)
    }

    /// Update the status of an existing object through the `status` subresource
    pub fn update_status(&self, obj: impl Into<ManagedResource>) -> Result<ManagedResource, RegistryError> {
        let mut new = obj.into();
        let kind = new.kind();
        let strategy = self.status_strategy(kind);
        let old = self.load(kind, &new.key())?;

        self.gate
            .admit(&AdmissionAttributes::update(new.clone()).with_subresource(SUBRESOURCE_STATUS))?;
        strategy.prepare_for_update(&mut new, &old)?;
        let errors = strategy.validate_update(&new, &old)?;
        InvalidObjectError::check(kind.as_str(), new.key().name, errors)?;

        self.commit(new)
    }

    fn storage(&self) -> std::sync::MutexGuard<'_, Storage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self, kind: ResourceKind, key: &ObjectKey) -> Result<ManagedResource, RegistryError> {
        self.get(kind, key).ok_or_else(|| RegistryError::NotFound {
            kind,
            key: key.clone(),
        })
    }

    /// Store `new` if its `resourceVersion` still matches the stored one
    fn commit(&self, mut new: ManagedResource) -> Result<ManagedResource, RegistryError> {
        let kind = new.kind();
        let key = new.key();
        let Some(expected) = new.meta().resource_version.clone() else {
            return Err(InvalidObjectError {
                kind: kind.as_str().to_string(),
                name: key.name,
                errors: vec![FieldError::invalid(
                    FieldPath::new("metadata").child("resourceVersion"),
                    "",
                    "must be specified for an update",
                )],
            }
            .into());
        };

        let mut storage = self.storage();
        let current = storage
            .objects
            .get(&(kind, key.clone()))
            .ok_or_else(|| RegistryError::NotFound {
                kind,
                key: key.clone(),
            })?;
        if current.meta().resource_version.as_deref() != Some(expected.as_str()) {
            warn!(
                "Rejecting write to {} {}: resourceVersion {} is stale",
                kind, key, expected
            );
            return Err(RegistryError::Conflict { kind, key });
        }

        new.meta_mut().resource_version = Some(storage.next_version());
        storage.objects.insert((kind, key.clone()), new.clone());
        debug!("Updated {} {} to resourceVersion {:?}", kind, key, new.meta().resource_version);
        Ok(new)
    }
}
