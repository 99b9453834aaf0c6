//! # ServiceInstanceCredential Validation

use super::field::{FieldError, FieldErrorList, FieldPath};
use super::lifecycle::{validate_operation_status, OperationStatus};
use super::names::{dns1123_subdomain_problems, validate_object_meta};
use super::parameters::{validate_inline_parameters, validate_parameters_from};
use crate::crd::{
    CatalogResource, CredentialOperation, ServiceInstanceCredential, ServiceInstanceCredentialSpec,
    ServiceInstanceCredentialStatus,
};
use kube::ResourceExt;
use tracing::warn;

/// Validate a whole ServiceInstanceCredential (metadata, spec, status)
pub fn validate_service_instance_credential(credential: &ServiceInstanceCredential) -> FieldErrorList {
    let mut errors = validate_object_meta(&credential.metadata, &FieldPath::new("metadata"));
    errors.extend(validate_spec(&credential.spec, &FieldPath::new("spec")));
    errors.extend(validate_status(
        &credential.status_or_default(),
        credential.generation(),
        &FieldPath::new("status"),
    ));
    errors
}

pub fn validate_service_instance_credential_update(
    new: &ServiceInstanceCredential,
    _old: &ServiceInstanceCredential,
) -> FieldErrorList {
    validate_service_instance_credential(new)
}

pub fn validate_service_instance_credential_status_update(
    new: &ServiceInstanceCredential,
    old: &ServiceInstanceCredential,
) -> FieldErrorList {
    let (new_reconciled, old_reconciled) = (new.reconciled_generation(), old.reconciled_generation());
    if new_reconciled < old_reconciled || new_reconciled > new.generation() {
        warn!(
            "ServiceInstanceCredential {}/{} reconciledGeneration moved from {} to {} (generation {})",
            new.namespace().unwrap_or_default(),
            new.name_any(),
            old_reconciled,
            new_reconciled,
            new.generation()
        );
    }
    validate_service_instance_credential_update(new, old)
}

fn validate_spec(spec: &ServiceInstanceCredentialSpec, path: &FieldPath) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    let instance_path = path.child("instanceRef").child("name");
    for msg in dns1123_subdomain_problems(&spec.instance_ref.name) {
        errors.push(FieldError::invalid(
            instance_path.clone(),
            &spec.instance_ref.name,
            msg,
        ));
    }

    let secret_path = path.child("secretName");
    for msg in dns1123_subdomain_problems(&spec.secret_name) {
        errors.push(FieldError::invalid(secret_path.clone(), &spec.secret_name, msg));
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

fn validate_status(
    status: &ServiceInstanceCredentialStatus,
    generation: i64,
    path: &FieldPath,
) -> FieldErrorList {
    let operation = status.current_operation.as_ref();
    validate_operation_status(
        &OperationStatus {
            operation: operation.map(CredentialOperation::as_str),
            supported: CredentialOperation::SUPPORTED,
            pushes_properties: operation.is_some_and(CredentialOperation::pushes_properties),
            pushing_operations: "\"Bind\"",
            operation_start_time: status.operation_start_time.as_deref(),
            conditions: &status.conditions,
            in_progress_properties: status.in_progress_properties.as_ref(),
            external_properties: status.external_properties.as_ref(),
            generation,
            reconciled_generation: status.reconciled_generation,
        },
        path,
    )
}
