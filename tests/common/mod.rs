//! Shared fixtures for integration tests

#![allow(dead_code, reason = "Each test binary uses a different subset of fixtures")]

use service_catalog_guard::{
    Condition, ConditionStatus, InstanceOperation, LocalObjectReference, PropertiesSnapshot,
    RawParameters, ServiceInstance, ServiceInstanceCredential, ServiceInstanceCredentialSpec,
    ServiceInstanceSpec, ServiceInstanceStatus, UserInfo,
};
use std::collections::BTreeMap;

pub const NAMESPACE: &str = "test-ns";
pub const VALID_CHECKSUM: &str =
    "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
pub const OPERATION_START: &str = "2024-01-01T00:00:00Z";

pub fn valid_service_instance() -> ServiceInstance {
    let mut instance = ServiceInstance::new(
        "test-instance",
        ServiceInstanceSpec {
            service_class_name: "test-serviceclass".to_string(),
            plan_name: "test-plan".to_string(),
            ..Default::default()
        },
    );
    instance.metadata.namespace = Some(NAMESPACE.to_string());
    instance
}

pub fn valid_properties_snapshot() -> PropertiesSnapshot {
    PropertiesSnapshot {
        parameters: Some(RawParameters::from("a: 1\nb: \"2\"")),
        parameters_checksum: VALID_CHECKSUM.to_string(),
    }
}

/// Instance with a provision in flight (generation 1, reconciled 2)
pub fn instance_with_in_progress_provision() -> ServiceInstance {
    let mut instance = valid_service_instance();
    instance.metadata.generation = Some(1);
    instance.status = Some(ServiceInstanceStatus {
        reconciled_generation: 2,
        current_operation: Some(InstanceOperation::Provision),
        operation_start_time: Some(OPERATION_START.to_string()),
        in_progress_properties: Some(valid_properties_snapshot()),
        ..Default::default()
    });
    instance
}

pub fn valid_service_instance_credential() -> ServiceInstanceCredential {
    let mut credential = ServiceInstanceCredential::new(
        "test-credential",
        ServiceInstanceCredentialSpec {
            instance_ref: LocalObjectReference {
                name: "test-instance".to_string(),
            },
            secret_name: "test-secret".to_string(),
            ..Default::default()
        },
    );
    credential.metadata.namespace = Some(NAMESPACE.to_string());
    credential
}

pub fn condition(r#type: &str, status: ConditionStatus) -> Condition {
    Condition {
        r#type: r#type.to_string(),
        status,
        last_transition_time: None,
        reason: None,
        message: None,
    }
}

pub fn alice() -> UserInfo {
    UserInfo {
        username: "alice".to_string(),
        uid: "alice-uid".to_string(),
        groups: vec!["system:authenticated".to_string()],
        extra: BTreeMap::from([("team".to_string(), vec!["data".to_string()])]),
    }
}
