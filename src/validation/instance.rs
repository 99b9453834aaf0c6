//! # ServiceInstance Validation

use super::field::{FieldError, FieldErrorList, FieldPath};
use super::lifecycle::{validate_operation_status, OperationStatus};
use super::names::{service_class_name_problems, service_plan_name_problems, validate_object_meta};
use super::parameters::{validate_inline_parameters, validate_parameters_from};
use crate::crd::{CatalogResource, InstanceOperation, ServiceInstance, ServiceInstanceSpec, ServiceInstanceStatus};
use kube::ResourceExt;
use tracing::warn;

/// Validate a whole ServiceInstance (metadata, spec, status)
pub fn validate_service_instance(instance: &ServiceInstance) -> FieldErrorList {
    let mut errors = validate_object_meta(&instance.metadata, &FieldPath::new("metadata"));
    errors.extend(validate_spec(&instance.spec, &FieldPath::new("spec")));
    errors.extend(validate_status(
        &instance.status_or_default(),
        instance.generation(),
        &FieldPath::new("status"),
    ));
    errors
}

/// Validate a spec update; rejected outright while the old object has an async operation running
pub fn validate_service_instance_update(new: &ServiceInstance, old: &ServiceInstance) -> FieldErrorList {
    let mut errors = FieldErrorList::new();
    if old.status_or_default().async_op_in_progress {
        errors.push(FieldError::forbidden(
            FieldPath::new("spec"),
            "Another operation for this service instance is in progress",
        ));
    }
    errors.extend(validate_service_instance(new));
    errors
}

/// Validate a status update
///
/// Only the structural rules apply. `reconciledGeneration` moving backward or
/// past `generation` is accepted and logged.
pub fn validate_service_instance_status_update(
    new: &ServiceInstance,
    old: &ServiceInstance,
) -> FieldErrorList {
    let (new_reconciled, old_reconciled) = (new.reconciled_generation(), old.reconciled_generation());
    if new_reconciled < old_reconciled || new_reconciled > new.generation() {
        warn!(
            "ServiceInstance {}/{} reconciledGeneration moved from {} to {} (generation {})",
            new.namespace().unwrap_or_default(),
            new.name_any(),
            old_reconciled,
            new_reconciled,
            new.generation()
        );
    }
    validate_service_instance(new)
}

fn validate_spec(spec: &ServiceInstanceSpec, path: &FieldPath) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    let class_path = path.child("serviceClassName");
    if spec.service_class_name.is_empty() {
        errors.push(FieldError::required(class_path.clone(), "serviceClassName is required"));
    }
    for msg in service_class_name_problems(&spec.service_class_name) {
        errors.push(FieldError::invalid(class_path.clone(), &spec.service_class_name, msg));
    }

    let plan_path = path.child("planName");
    if spec.plan_name.is_empty() {
        errors.push(FieldError::required(plan_path.clone(), "planName is required"));
    }
    for msg in service_plan_name_problems(&spec.plan_name) {
        errors.push(FieldError::invalid(plan_path.clone(), &spec.plan_name, msg));
    }

    errors.extend(validate_parameters_from(
        &spec.parameters_from,
        &path.child("parametersFrom"),
    ));
    if let Some(parameters) = &spec.parameters {
        errors.extend(validate_inline_parameters(parameters, &path.child("parameters")));
    }
    errors
}

fn validate_status(status: &ServiceInstanceStatus, generation: i64, path: &FieldPath) -> FieldErrorList {
    let operation = status.current_operation.as_ref();
    let mut errors = validate_operation_status(
        &OperationStatus {
            operation: operation.map(InstanceOperation::as_str),
            supported: InstanceOperation::SUPPORTED,
            pushes_properties: operation.is_some_and(InstanceOperation::pushes_properties),
            pushing_operations: "\"Provision\" or \"Update\"",
            operation_start_time: status.operation_start_time.as_deref(),
            conditions: &status.conditions,
            in_progress_properties: status.in_progress_properties.as_ref(),
            external_properties: status.external_properties.as_ref(),
            generation,
            reconciled_generation: status.reconciled_generation,
        },
        path,
    );

    if operation.is_none() {
        if status.async_op_in_progress {
            errors.push(FieldError::forbidden(
                path.child("asyncOpInProgress"),
                "asyncOpInProgress cannot be true when there is no currentOperation",
            ));
        }
        if status.last_operation.is_some() {
            errors.push(FieldError::forbidden(
                path.child("lastOperation"),
                "lastOperation must not be present when currentOperation is not present",
            ));
        }
    }
    errors
}
