//! # Lifecycle Strategy Tests
//!
//! Create, update, status update and delete behaviour of the strategies for both kinds.

mod common;

use common::*;
use service_catalog_guard::config::GuardConfig;
use service_catalog_guard::constants::{CONDITION_READY, FINALIZER_SERVICE_CATALOG, REASON_UPDATE_INITIATED};
use service_catalog_guard::crd::{ManagedResource, ResourceKind};
use service_catalog_guard::strategy::{LifecycleStrategy, RequestContext};
use service_catalog_guard::{ConditionStatus, InstanceOperation, ServiceInstanceStatus};

fn strategy(kind: ResourceKind, originating_identity: bool) -> LifecycleStrategy {
    LifecycleStrategy::new(
        kind,
        &GuardConfig::default().with_originating_identity(originating_identity),
    )
}

fn created_instance(strategy: &LifecycleStrategy, ctx: &RequestContext) -> ManagedResource {
    let mut obj = ManagedResource::from(valid_service_instance());
    strategy
        .prepare_for_create(&mut obj, ctx)
        .expect("kind matches");
    obj
}

#[test]
fn test_prepare_for_create_resets_status() {
    let strategy = strategy(ResourceKind::ServiceInstance, false);
    let mut obj = ManagedResource::from(instance_with_in_progress_provision());
    obj.meta_mut().generation = Some(9);
    strategy
        .prepare_for_create(&mut obj, &RequestContext::anonymous())
        .expect("kind matches");

    let instance = obj.as_instance().expect("instance");
    assert_eq!(instance.status, Some(ServiceInstanceStatus::default()));
    assert_eq!(instance.metadata.generation, Some(1));
    assert_eq!(
        instance.metadata.finalizers,
        Some(vec![FINALIZER_SERVICE_CATALOG.to_string()])
    );
}

#[test]
fn test_prepare_for_create_is_idempotent() {
    let strategy = strategy(ResourceKind::ServiceInstance, true);
    let ctx = RequestContext::for_user(alice());
    let once = created_instance(&strategy, &ctx);
    let mut twice = once.clone();
    strategy.prepare_for_create(&mut twice, &ctx).expect("kind matches");
    assert_eq!(once, twice);
}

#[test]
fn test_prepare_for_create_stamps_identity_when_enabled() {
    let ctx = RequestContext::for_user(alice());

    let with_identity = created_instance(&strategy(ResourceKind::ServiceInstance, true), &ctx);
    assert_eq!(
        with_identity.as_instance().and_then(|i| i.spec.user_info.clone()),
        Some(alice())
    );

    let mut forged = valid_service_instance();
    forged.spec.user_info = Some(alice());
    let mut obj = ManagedResource::from(forged);
    strategy(ResourceKind::ServiceInstance, true)
        .prepare_for_create(&mut obj, &RequestContext::anonymous())
        .expect("kind matches");
    assert_eq!(obj.as_instance().and_then(|i| i.spec.user_info.clone()), None);
}

#[test]
fn test_prepare_for_create_leaves_user_info_when_disabled() {
    let mut forged = valid_service_instance();
    forged.spec.user_info = Some(alice());
    let mut obj = ManagedResource::from(forged);
    strategy(ResourceKind::ServiceInstance, false)
        .prepare_for_create(&mut obj, &RequestContext::anonymous())
        .expect("kind matches");
    assert_eq!(
        obj.as_instance().and_then(|i| i.spec.user_info.clone()),
        Some(alice())
    );
}

#[test]
fn test_two_configurations_side_by_side() {
    let ctx = RequestContext::for_user(alice());
    let on = created_instance(&strategy(ResourceKind::ServiceInstance, true), &ctx);
    let off = created_instance(&strategy(ResourceKind::ServiceInstance, false), &ctx);
    assert!(on.as_instance().is_some_and(|i| i.spec.user_info.is_some()));
    assert!(off.as_instance().is_some_and(|i| i.spec.user_info.is_none()));
}

#[test]
fn test_prepare_for_update_bumps_generation_on_spec_change() {
    let strategy = strategy(ResourceKind::ServiceInstance, false);
    let ctx = RequestContext::anonymous();
    let old = created_instance(&strategy, &ctx);

    let mut new = old.clone();
    if let ManagedResource::Instance(instance) = &mut new {
        instance.spec.plan_name = "bigger-plan".to_string();
        instance.status = None;
    }
    strategy
        .prepare_for_update(&mut new, &old, &ctx)
        .expect("kind matches");

    let instance = new.as_instance().expect("instance");
    assert_eq!(instance.metadata.generation, Some(2));
    let status = instance.status.as_ref().expect("status copied from storage");
    assert_eq!(status.conditions.len(), 1);
    let ready = &status.conditions[0];
    assert_eq!(ready.r#type, CONDITION_READY);
    assert_eq!(ready.status, ConditionStatus::False);
    assert_eq!(ready.reason.as_deref(), Some(REASON_UPDATE_INITIATED));
    assert_eq!(
        ready.message.as_deref(),
        Some("Update initiated on ServiceInstance")
    );
    assert!(ready.last_transition_time.is_some());
}

#[test]
fn test_prepare_for_update_without_spec_change_keeps_generation() {
    let strategy = strategy(ResourceKind::ServiceInstance, false);
    let ctx = RequestContext::anonymous();
    let old = created_instance(&strategy, &ctx);

    let mut new = old.clone();
    new.meta_mut().generation = Some(42);
    new.meta_mut()
        .labels
        .get_or_insert_with(Default::default)
        .insert("tier".to_string(), "gold".to_string());
    strategy
        .prepare_for_update(&mut new, &old, &ctx)
        .expect("kind matches");

    let instance = new.as_instance().expect("instance");
    assert_eq!(instance.metadata.generation, Some(1));
    assert!(instance
        .status
        .as_ref()
        .is_some_and(|s| s.conditions.is_empty()));
}

#[test]
fn test_prepare_for_update_keeps_stored_status() {
    let strategy = strategy(ResourceKind::ServiceInstance, false);
    let ctx = RequestContext::anonymous();
    let mut stored = valid_service_instance();
    stored.metadata.generation = Some(3);
    stored.status = Some(ServiceInstanceStatus {
        reconciled_generation: 3,
        dashboard_url: Some("https://dashboard.example".to_string()),
        ..Default::default()
    });
    let old = ManagedResource::from(stored);

    let mut new = old.clone();
    if let ManagedResource::Instance(instance) = &mut new {
        instance.status = Some(ServiceInstanceStatus {
            current_operation: Some(InstanceOperation::Provision),
            ..Default::default()
        });
    }
    strategy
        .prepare_for_update(&mut new, &old, &ctx)
        .expect("kind matches");
    assert_eq!(new, old);
}

#[test]
fn test_prepare_for_update_stamps_identity_only_on_spec_change() {
    let strategy = strategy(ResourceKind::ServiceInstance, true);
    let old = created_instance(&strategy, &RequestContext::for_user(alice()));

    let mut bob = alice();
    bob.username = "bob".to_string();
    bob.uid = "bob-uid".to_string();
    let ctx = RequestContext::for_user(bob.clone());

    let mut unchanged = old.clone();
    strategy
        .prepare_for_update(&mut unchanged, &old, &ctx)
        .expect("kind matches");
    assert_eq!(
        unchanged.as_instance().and_then(|i| i.spec.user_info.clone()),
        Some(alice())
    );

    let mut changed = old.clone();
    if let ManagedResource::Instance(instance) = &mut changed {
        instance.spec.plan_name = "other-plan".to_string();
    }
    strategy
        .prepare_for_update(&mut changed, &old, &ctx)
        .expect("kind matches");
    assert_eq!(
        changed.as_instance().and_then(|i| i.spec.user_info.clone()),
        Some(bob)
    );
}

#[test]
fn test_credential_update_initiated_message() {
    let strategy = strategy(ResourceKind::ServiceInstanceCredential, false);
    let ctx = RequestContext::anonymous();
    let mut old = ManagedResource::from(valid_service_instance_credential());
    strategy.prepare_for_create(&mut old, &ctx).expect("kind matches");

    let mut new = old.clone();
    if let ManagedResource::Credential(credential) = &mut new {
        credential.spec.secret_name = "rotated-secret".to_string();
    }
    strategy
        .prepare_for_update(&mut new, &old, &ctx)
        .expect("kind matches");

    let credential = new.as_credential().expect("credential");
    assert_eq!(credential.metadata.generation, Some(2));
    let conditions = &credential.status.as_ref().expect("status").conditions;
    assert_eq!(
        conditions[0].message.as_deref(),
        Some("Update initiated on ServiceInstanceCredential")
    );
}

#[test]
fn test_validate_update_rejects_async_operation_in_progress() {
    let strategy = strategy(ResourceKind::ServiceInstance, false);
    let mut stored = valid_service_instance();
    stored.metadata.generation = Some(2);
    stored.status = Some(ServiceInstanceStatus {
        reconciled_generation: 1,
        current_operation: Some(InstanceOperation::Provision),
        operation_start_time: Some(OPERATION_START.to_string()),
        in_progress_properties: Some(valid_properties_snapshot()),
        async_op_in_progress: true,
        ..Default::default()
    });
    let old = ManagedResource::from(stored);
    let mut new = old.clone();
    if let ManagedResource::Instance(instance) = &mut new {
        instance.spec.plan_name = "Foo".to_string();
    }

    let errors = strategy.validate_update(&new, &old).expect("kind matches");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field.as_str(), "spec");
}

#[test]
fn test_check_graceful_delete_declines_and_stamps_identity() {
    let strategy = strategy(ResourceKind::ServiceInstance, true);
    let mut obj = ManagedResource::from(valid_service_instance());
    let graceful = strategy
        .check_graceful_delete(&mut obj, &RequestContext::for_user(alice()))
        .expect("kind matches");
    assert!(!graceful);
    assert_eq!(
        obj.as_instance().and_then(|i| i.spec.user_info.clone()),
        Some(alice())
    );

    let strategy = self::strategy(ResourceKind::ServiceInstance, false);
    let mut obj = ManagedResource::from(valid_service_instance());
    let graceful = strategy
        .check_graceful_delete(&mut obj, &RequestContext::for_user(alice()))
        .expect("kind matches");
    assert!(!graceful);
    assert!(obj.as_instance().is_some_and(|i| i.spec.user_info.is_none()));
}

#[test]
fn test_status_strategy_keeps_stored_spec() {
    let strategy = strategy(ResourceKind::ServiceInstance, false);
    let status_strategy = strategy.status_strategy();
    assert_eq!(status_strategy.kind(), ResourceKind::ServiceInstance);

    let mut stored = valid_service_instance();
    stored.metadata.generation = Some(2);
    let old = ManagedResource::from(stored);

    let mut new = old.clone();
    if let ManagedResource::Instance(instance) = &mut new {
        instance.spec.plan_name = "sneaky-plan".to_string();
        instance.metadata.generation = Some(5);
        instance.status = Some(ServiceInstanceStatus {
            reconciled_generation: 2,
            ..Default::default()
        });
    }
    status_strategy
        .prepare_for_update(&mut new, &old)
        .expect("kind matches");

    let instance = new.as_instance().expect("instance");
    assert_eq!(instance.spec.plan_name, "test-plan");
    assert_eq!(instance.metadata.generation, Some(2));
    assert_eq!(
        instance.status.as_ref().map(|s| s.reconciled_generation),
        Some(2)
    );
    assert!(status_strategy
        .validate_update(&new, &old)
        .expect("kind matches")
        .is_empty());
}
