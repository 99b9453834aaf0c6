//! # Operation Lifecycle Rules
//!
//! Status rules shared by both kinds: the operation enum, its start time,
//! readiness while an operation runs, in-progress properties and the
//! generation fence.

use super::field::{FieldError, FieldErrorList, FieldPath};
use super::parameters::validate_properties_snapshot;
use crate::crd::{Condition, PropertiesSnapshot};

/// Kind-independent view of an operation status
pub(crate) struct OperationStatus<'a> {
    /// Wire value of `currentOperation`, `None` when idle
    pub operation: Option<&'a str>,
    /// Accepted wire values, "" included
    pub supported: &'static [&'static str],
    /// The current operation must carry `inProgressProperties`
    pub pushes_properties: bool,
    /// Wording of the operations that push properties, used in messages
    pub pushing_operations: &'static str,
    pub operation_start_time: Option<&'a str>,
    pub conditions: &'a [Condition],
    pub in_progress_properties: Option<&'a PropertiesSnapshot>,
    pub external_properties: Option<&'a PropertiesSnapshot>,
    pub generation: i64,
    pub reconciled_generation: i64,
}

pub(crate) fn validate_operation_status(status: &OperationStatus<'_>, path: &FieldPath) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    if let Some(op) = status.operation {
        if !status.supported.iter().any(|supported| *supported == op) {
            errors.push(FieldError::not_supported(
                path.child("currentOperation"),
                op,
                status.supported,
            ));
        }
    }

    match status.operation {
        None => {
            if status.operation_start_time.is_some() {
                errors.push(FieldError::forbidden(
                    path.child("operationStartTime"),
                    "operationStartTime must not be present when currentOperation is not present",
                ));
            }
        }
        Some(_) => {
            if status.operation_start_time.is_none() {
                errors.push(FieldError::required(
                    path.child("operationStartTime"),
                    "operationStartTime is required when currentOperation is present",
                ));
            }
            for (i, condition) in status.conditions.iter().enumerate() {
                if condition.is_ready_true() {
                    errors.push(FieldError::forbidden(
                        path.child("conditions").index(i),
                        "Can not set Ready condition to true when there is an operation in progress",
                    ));
                }
            }
        }
    }

    let in_progress_path = path.child("inProgressProperties");
    match (status.pushes_properties, status.in_progress_properties) {
        (true, None) => errors.push(FieldError::required(
            in_progress_path,
            format!(
                "inProgressProperties is required when currentOperation is {}",
                status.pushing_operations
            ),
        )),
        (false, Some(_)) => errors.push(FieldError::forbidden(
            in_progress_path,
            format!(
                "inProgressProperties must not be present when currentOperation is not {}",
                status.pushing_operations
            ),
        )),
        _ => {}
    }

    if let Some(snapshot) = status.in_progress_properties {
        errors.extend(validate_properties_snapshot(
            snapshot,
            &path.child("inProgressProperties"),
        ));
    }
    if let Some(snapshot) = status.external_properties {
        errors.extend(validate_properties_snapshot(
            snapshot,
            &path.child("externalProperties"),
        ));
    }

    if status.operation.is_some() && status.generation == status.reconciled_generation {
        errors.push(FieldError::forbidden(
            path.child("currentOperation"),
            "currentOperation must not be present when reconciledGeneration and generation are the same",
        ));
    }

    errors
}
