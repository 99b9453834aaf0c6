//! # Resource Cache View
//!
//! Read-only, eventually consistent views of stored objects.
//!
//! The admission gate consults a view synchronously while handling a request,
//! so a view must never block. A view may lag storage by up to its
//! `staleness_bound`; the registry's resource version check remains the
//! authoritative guard against lost updates.

use crate::crd::{CatalogResource, ObjectKey};
use kube_runtime::reflector::{ObjectRef, Store};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{info, warn};

/// List-and-synced contract consumed by the admission gate
pub trait ResourceCacheView<K: CatalogResource>: Send + Sync {
    /// Every cached object
    fn list(&self) -> Vec<Arc<K>>;

    /// True once the initial synchronization has completed
    fn has_synced(&self) -> bool;

    /// Cached object under `key`
    fn get(&self, key: &ObjectKey) -> Option<Arc<K>> {
        self.list().into_iter().find(|obj| obj.key() == *key)
    }

    /// Upper bound on how far the view may lag storage, if known
    fn staleness_bound(&self) -> Option<Duration> {
        None
    }
}

/// Explicitly refreshed in-memory snapshot
///
/// Synced after the first `replace` or `mark_synced`.
pub struct SnapshotCache<K> {
    objects: RwLock<BTreeMap<ObjectKey, Arc<K>>>,
    synced: AtomicBool,
    staleness_bound: Option<Duration>,
}

impl<K: CatalogResource> SnapshotCache<K> {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            synced: AtomicBool::new(false),
            staleness_bound: None,
        }
    }

    #[must_use]
    pub fn with_staleness_bound(mut self, bound: Duration) -> Self {
        self.staleness_bound = Some(bound);
        self
    }

    /// Swap in a full listing and mark the view synced
    pub fn replace(&self, objects: impl IntoIterator<Item = K>) {
        let snapshot: BTreeMap<ObjectKey, Arc<K>> = objects
            .into_iter()
            .map(|obj| (obj.key(), Arc::new(obj)))
            .collect();
        *self.objects.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        self.mark_synced();
    }

    pub fn upsert(&self, obj: K) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(obj.key(), Arc::new(obj));
    }

    pub fn remove(&self, key: &ObjectKey) -> Option<Arc<K>> {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn mark_synced(&self) {
        self.synced.store(true, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: CatalogResource> Default for SnapshotCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for SnapshotCache<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("synced", &self.synced.load(Ordering::Acquire))
            .field("staleness_bound", &self.staleness_bound)
            .finish_non_exhaustive()
    }
}

impl<K: CatalogResource> ResourceCacheView<K> for SnapshotCache<K> {
    fn list(&self) -> Vec<Arc<K>> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    fn get(&self, key: &ObjectKey) -> Option<Arc<K>> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn staleness_bound(&self) -> Option<Duration> {
        self.staleness_bound
    }
}

/// View over a `kube_runtime` reflector store kept warm by a watcher
pub struct ReflectorCacheView<K: CatalogResource> {
    store: Store<K>,
    synced: Arc<AtomicBool>,
    resync_interval: Option<Duration>,
}

impl<K: CatalogResource> ReflectorCacheView<K> {
    /// Wrap `store` and flip the synced flag once its initial listing lands
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(store: Store<K>, resync_interval: Option<Duration>) -> Self {
        let synced = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&synced);
        let waiter = store.clone();
        tokio::spawn(async move {
            match waiter.wait_until_ready().await {
                Ok(()) => {
                    flag.store(true, Ordering::Release);
                    info!("{} cache synced", K::KIND);
                }
                Err(e) => {
                    warn!("{} cache writer dropped before sync: {:?}", K::KIND, e);
                }
            }
        });
        Self {
            store,
            synced,
            resync_interval,
        }
    }
}

impl<K: CatalogResource> fmt::Debug for ReflectorCacheView<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectorCacheView")
            .field("kind", &K::KIND)
            .field("synced", &self.synced.load(Ordering::Acquire))
            .field("resync_interval", &self.resync_interval)
            .finish_non_exhaustive()
    }
}

impl<K: CatalogResource> ResourceCacheView<K> for ReflectorCacheView<K> {
    fn list(&self) -> Vec<Arc<K>> {
        self.store.state()
    }

    fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    fn get(&self, key: &ObjectKey) -> Option<Arc<K>> {
        self.store
            .get(&ObjectRef::new(&key.name).within(&key.namespace))
    }

    fn staleness_bound(&self) -> Option<Duration> {
        self.resync_interval
    }
}
