//! # Parameter Rules
//!
//! Inline parameters, parameter sources and properties snapshots.

use super::field::{FieldError, FieldErrorList, FieldPath};
use crate::constants::PARAMETERS_CHECKSUM_LENGTH;
use crate::crd::{ParametersFromSource, PropertiesSnapshot, RawParameters};

/// Inline parameters must be a non-empty key/value document
pub fn validate_inline_parameters(parameters: &RawParameters, path: &FieldPath) -> FieldErrorList {
    if parameters.is_empty() {
        return vec![FieldError::required(
            path.clone(),
            "inline parameters must not be empty if present",
        )];
    }
    match parameters.parse_map() {
        Ok(_) => FieldErrorList::new(),
        Err(e) => vec![FieldError::invalid(
            path.clone(),
            parameters.as_str(),
            format!("invalid inline parameters: {e}"),
        )],
    }
}

/// Every source must name both a secret and a key
pub fn validate_parameters_from(sources: &[ParametersFromSource], path: &FieldPath) -> FieldErrorList {
    let mut errors = FieldErrorList::new();
    for (i, source) in sources.iter().enumerate() {
        let item = path.index(i);
        let Some(secret_ref) = &source.secret_key_ref else {
            errors.push(FieldError::required(
                item,
                "source must not be empty if present",
            ));
            continue;
        };
        let ref_path = item.child("secretKeyRef");
        if secret_ref.name.is_empty() {
            errors.push(FieldError::required(
                ref_path.child("name"),
                "name is required",
            ));
        }
        if secret_ref.key.is_empty() {
            errors.push(FieldError::required(ref_path.child("key"), "key is required"));
        }
    }
    errors
}

/// Parameters and checksum must be present together and well-formed
pub fn validate_properties_snapshot(snapshot: &PropertiesSnapshot, path: &FieldPath) -> FieldErrorList {
    let mut errors = FieldErrorList::new();
    let checksum = snapshot.parameters_checksum.as_str();
    let checksum_path = path.child("parametersChecksum");

    match &snapshot.parameters {
        None => {
            if !checksum.is_empty() {
                errors.push(FieldError::forbidden(
                    checksum_path.clone(),
                    "parametersChecksum must be empty when there are no parameters",
                ));
            }
        }
        Some(parameters) => {
            let raw_path = path.child("parameters").child("raw");
            if parameters.is_empty() {
                errors.push(FieldError::required(raw_path, "raw must not be empty"));
            } else if parameters.parse_map().is_err() {
                errors.push(FieldError::invalid(
                    raw_path,
                    parameters.as_str(),
                    "raw must be valid yaml",
                ));
            }
            if checksum.is_empty() {
                errors.push(FieldError::forbidden(
                    checksum_path.clone(),
                    "parametersChecksum must not be empty when there are parameters",
                ));
            }
        }
    }

    if checksum.is_empty() {
        return errors;
    }
    if checksum.len() != PARAMETERS_CHECKSUM_LENGTH {
        errors.push(FieldError::invalid(
            checksum_path.clone(),
            checksum,
            format!("parametersChecksum must be exactly {PARAMETERS_CHECKSUM_LENGTH} digits"),
        ));
    }
    if !is_hexadecimal(checksum) {
        errors.push(FieldError::invalid(
            checksum_path,
            checksum,
            "parametersChecksum must be a hexadecimal number",
        ));
    }
    errors
}

pub fn is_hexadecimal(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_hexdigit())
}
