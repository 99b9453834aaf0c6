//! # Lifecycle Strategy
//!
//! Normalizes objects before they are validated and stored.
//!
//! - `prepare_for_create` wipes caller-supplied status, attaches the finalizer
//!   and starts the generation at 1
//! - `prepare_for_update` keeps the stored status and bumps the generation on
//!   spec changes, flipping `Ready` to `False`
//! - `StatusStrategy` is the reconciler's path: it keeps the stored spec
//!
//! Objects of the wrong kind are reported as `StrategyError::KindMismatch`.
//! That is a dispatch bug in the host, never a user error.

mod conditions;
mod identity;

pub use conditions::{set_update_initiated, upsert_condition};
pub use identity::RequestContext;

use crate::config::GuardConfig;
use crate::constants::FINALIZER_SERVICE_CATALOG;
use crate::crd::{
    CatalogResource, Condition, ManagedResource, ResourceKind, ServiceInstance,
    ServiceInstanceCredential, UserInfo,
};
use crate::observability::metrics;
use crate::validation::{self, FieldErrorList};
use kube::ResourceExt;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("{operation}: expected a {expected} object but received a {found}")]
    KindMismatch {
        operation: &'static str,
        expected: ResourceKind,
        found: ResourceKind,
    },
}

/// Mutations the strategy applies to either kind
pub(crate) trait LifecycleObject: CatalogResource {
    fn reset_status(&mut self);
    fn copy_status_from(&mut self, old: &Self);
    fn copy_spec_from(&mut self, old: &Self);
    fn spec_differs(&self, old: &Self) -> bool;
    fn set_user_info(&mut self, user_info: Option<UserInfo>);
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;
}

impl LifecycleObject for ServiceInstance {
    fn reset_status(&mut self) {
        self.status = Some(Default::default());
    }

    fn copy_status_from(&mut self, old: &Self) {
        self.status.clone_from(&old.status);
    }

    fn copy_spec_from(&mut self, old: &Self) {
        self.spec.clone_from(&old.spec);
    }

    fn spec_differs(&self, old: &Self) -> bool {
        self.spec != old.spec
    }

    fn set_user_info(&mut self, user_info: Option<UserInfo>) {
        self.spec.user_info = user_info;
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.status.get_or_insert_with(Default::default).conditions
    }
}

impl LifecycleObject for ServiceInstanceCredential {
    fn reset_status(&mut self) {
        self.status = Some(Default::default());
    }

    fn copy_status_from(&mut self, old: &Self) {
        self.status.clone_from(&old.status);
    }

    fn copy_spec_from(&mut self, old: &Self) {
        self.spec.clone_from(&old.spec);
    }

    fn spec_differs(&self, old: &Self) -> bool {
        self.spec != old.spec
    }

    fn set_user_info(&mut self, user_info: Option<UserInfo>) {
        self.spec.user_info = user_info;
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.status.get_or_insert_with(Default::default).conditions
    }
}

fn kind_mismatch(operation: &'static str, expected: ResourceKind, found: ResourceKind) -> StrategyError {
    error!(
        "{}: expected a {} object but received a {}",
        operation, expected, found
    );
    metrics::increment_strategy_kind_mismatches();
    StrategyError::KindMismatch {
        operation,
        expected,
        found,
    }
}

fn check_kind(
    operation: &'static str,
    expected: ResourceKind,
    obj: &ManagedResource,
) -> Result<(), StrategyError> {
    if obj.kind() == expected {
        Ok(())
    } else {
        Err(kind_mismatch(operation, expected, obj.kind()))
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn prepare_create<K: LifecycleObject>(obj: &mut K, ctx: &RequestContext, originating_identity: bool) {
    if originating_identity {
        identity::stamp_user_info(obj, ctx);
    }
    obj.reset_status();
    let meta = obj.meta_mut();
    meta.finalizers = Some(vec![FINALIZER_SERVICE_CATALOG.to_string()]);
    meta.generation = Some(1);
}

fn prepare_update<K: LifecycleObject>(new: &mut K, old: &K, ctx: &RequestContext, originating_identity: bool) {
    new.copy_status_from(old);
    let old_generation = old.generation();
    if new.spec_differs(old) {
        if originating_identity {
            identity::stamp_user_info(new, ctx);
        }
        new.meta_mut().generation = Some(old_generation + 1);
        set_update_initiated(new.conditions_mut(), K::KIND.as_str(), &now());
        debug!(
            "{} {}/{} spec changed, generation {} -> {}",
            K::KIND,
            new.namespace().unwrap_or_default(),
            new.name_any(),
            old_generation,
            old_generation + 1
        );
    } else {
        new.meta_mut().generation = old.meta().generation;
    }
}

fn keep_stored_spec<K: LifecycleObject>(new: &mut K, old: &K) {
    new.copy_spec_from(old);
    new.meta_mut().generation = old.meta().generation;
}

/// Create/update/delete strategy for one resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleStrategy {
    kind: ResourceKind,
    originating_identity: bool,
}

impl LifecycleStrategy {
    pub fn new(kind: ResourceKind, config: &GuardConfig) -> Self {
        Self {
            kind,
            originating_identity: config.originating_identity,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn originating_identity(&self) -> bool {
        self.originating_identity
    }

    pub fn namespace_scoped(&self) -> bool {
        true
    }

    pub fn allow_create_on_update(&self) -> bool {
        false
    }

    pub fn allow_unconditional_update(&self) -> bool {
        false
    }

    /// No transformation; only the kind is checked
    pub fn canonicalize(&self, obj: &ManagedResource) -> Result<(), StrategyError> {
        check_kind("canonicalize", self.kind, obj)
    }

    /// Clear status, attach the finalizer and start at generation 1
    pub fn prepare_for_create(
        &self,
        obj: &mut ManagedResource,
        ctx: &RequestContext,
    ) -> Result<(), StrategyError> {
        check_kind("prepare_for_create", self.kind, obj)?;
        match obj {
            ManagedResource::Instance(instance) => {
                prepare_create(instance, ctx, self.originating_identity);
            }
            ManagedResource::Credential(credential) => {
                prepare_create(credential, ctx, self.originating_identity);
            }
        }
        Ok(())
    }

    /// Keep the stored status; bump generation and flip `Ready` on spec changes
    pub fn prepare_for_update(
        &self,
        new: &mut ManagedResource,
        old: &ManagedResource,
        ctx: &RequestContext,
    ) -> Result<(), StrategyError> {
        check_kind("prepare_for_update", self.kind, new)?;
        check_kind("prepare_for_update", self.kind, old)?;
        match (new, old) {
            (ManagedResource::Instance(new), ManagedResource::Instance(old)) => {
                prepare_update(new, old, ctx, self.originating_identity);
            }
            (ManagedResource::Credential(new), ManagedResource::Credential(old)) => {
                prepare_update(new, old, ctx, self.originating_identity);
            }
            (new, _) => return Err(kind_mismatch("prepare_for_update", self.kind, new.kind())),
        }
        Ok(())
    }

    pub fn validate(&self, obj: &ManagedResource) -> Result<FieldErrorList, StrategyError> {
        check_kind("validate", self.kind, obj)?;
        let errors = match obj {
            ManagedResource::Instance(instance) => validation::validate_service_instance(instance),
            ManagedResource::Credential(credential) => {
                validation::validate_service_instance_credential(credential)
            }
        };
        if !errors.is_empty() {
            metrics::increment_validation_failures(self.kind.as_str(), "create");
        }
        Ok(errors)
    }

    pub fn validate_update(
        &self,
        new: &ManagedResource,
        old: &ManagedResource,
    ) -> Result<FieldErrorList, StrategyError> {
        check_kind("validate_update", self.kind, new)?;
        check_kind("validate_update", self.kind, old)?;
        let errors = match (new, old) {
            (ManagedResource::Instance(new), ManagedResource::Instance(old)) => {
                validation::validate_service_instance_update(new, old)
            }
            (ManagedResource::Credential(new), ManagedResource::Credential(old)) => {
                validation::validate_service_instance_credential_update(new, old)
            }
            (new, _) => return Err(kind_mismatch("validate_update", self.kind, new.kind())),
        };
        if !errors.is_empty() {
            metrics::increment_validation_failures(self.kind.as_str(), "update");
        }
        Ok(errors)
    }

    /// Stamp the deleting user and decline graceful deletion
    ///
    /// Physical deletion is left to the reconciler, which releases the
    /// finalizer once deprovisioning completes.
    pub fn check_graceful_delete(
        &self,
        obj: &mut ManagedResource,
        ctx: &RequestContext,
    ) -> Result<bool, StrategyError> {
        check_kind("check_graceful_delete", self.kind, obj)?;
        if self.originating_identity {
            match obj {
                ManagedResource::Instance(instance) => identity::stamp_user_info(instance, ctx),
                ManagedResource::Credential(credential) => {
                    identity::stamp_user_info(credential, ctx);
                }
            }
        }
        Ok(false)
    }

    pub fn status_strategy(&self) -> StatusStrategy {
        StatusStrategy { kind: self.kind }
    }
}

/// Update strategy of the `status` subresource
///
/// The spec and generation always come from the stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStrategy {
    kind: ResourceKind,
}

impl StatusStrategy {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn prepare_for_update(
        &self,
        new: &mut ManagedResource,
        old: &ManagedResource,
    ) -> Result<(), StrategyError> {
        check_kind("status prepare_for_update", self.kind, new)?;
        check_kind("status prepare_for_update", self.kind, old)?;
        match (new, old) {
            (ManagedResource::Instance(new), ManagedResource::Instance(old)) => {
                keep_stored_spec(new, old);
            }
            (ManagedResource::Credential(new), ManagedResource::Credential(old)) => {
                keep_stored_spec(new, old);
            }
            (new, _) => {
                return Err(kind_mismatch(
                    "status prepare_for_update",
                    self.kind,
                    new.kind(),
                ))
            }
        }
        Ok(())
    }

    pub fn validate_update(
        &self,
        new: &ManagedResource,
        old: &ManagedResource,
    ) -> Result<FieldErrorList, StrategyError> {
        check_kind("status validate_update", self.kind, new)?;
        check_kind("status validate_update", self.kind, old)?;
        let errors = match (new, old) {
            (ManagedResource::Instance(new), ManagedResource::Instance(old)) => {
                validation::validate_service_instance_status_update(new, old)
            }
            (ManagedResource::Credential(new), ManagedResource::Credential(old)) => {
                validation::validate_service_instance_credential_status_update(new, old)
            }
            (new, _) => {
                return Err(kind_mismatch(
                    "status validate_update",
                    self.kind,
                    new.kind(),
                ))
            }
        };
        if !errors.is_empty() {
            metrics::increment_validation_failures(self.kind.as_str(), "status_update");
        }
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{ServiceInstanceCredentialSpec, ServiceInstanceSpec};

    fn instance_strategy() -> LifecycleStrategy {
        LifecycleStrategy::new(ResourceKind::ServiceInstance, &GuardConfig::default())
    }

    fn credential() -> ManagedResource {
        ServiceInstanceCredential::new("creds", ServiceInstanceCredentialSpec::default()).into()
    }

    #[test]
    fn test_strategy_flags() {
        let strategy = instance_strategy();
        assert!(strategy.namespace_scoped());
        assert!(!strategy.allow_create_on_update());
        assert!(!strategy.allow_unconditional_update());
        assert!(!strategy.originating_identity());
    }

    #[test]
    fn test_wrong_kind_is_reported() {
        let strategy = instance_strategy();
        let before = metrics::strategy_kind_mismatches();
        let err = strategy
            .prepare_for_create(&mut credential(), &RequestContext::anonymous())
            .unwrap_err();
        assert_eq!(
            err,
            StrategyError::KindMismatch {
                operation: "prepare_for_create",
                expected: ResourceKind::ServiceInstance,
                found: ResourceKind::ServiceInstanceCredential,
            }
        );
        assert!(metrics::strategy_kind_mismatches() > before);
    }

    #[test]
    fn test_mixed_update_pair_is_reported() {
        let strategy = instance_strategy();
        let mut new: ManagedResource =
            ServiceInstance::new("db", ServiceInstanceSpec::default()).into();
        assert!(strategy
            .prepare_for_update(&mut new, &credential(), &RequestContext::anonymous())
            .is_err());
        assert!(strategy
            .status_strategy()
            .validate_update(&new, &credential())
            .is_err());
    }

    #[test]
    fn test_canonicalize_checks_kind_only() {
        let strategy = instance_strategy();
        let obj: ManagedResource = ServiceInstance::new("db", ServiceInstanceSpec::default()).into();
        let before = obj.clone();
        assert!(strategy.canonicalize(&obj).is_ok());
        assert_eq!(obj, before);
        assert!(strategy.canonicalize(&credential()).is_err());
    }
}
