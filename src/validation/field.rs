//! # Field Errors
//!
//! Field paths and field-level validation errors.
//!
//! Validators never short-circuit: every rule appends to a `FieldErrorList`
//! and the whole list is returned so a caller can fix all violations in one
//! round trip.

use std::fmt;
use thiserror::Error;

/// Path to a field within an object, e.g. `status.conditions[0]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(root: &str) -> Self {
        Self(root.to_string())
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{i}]", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Class of a field-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldErrorKind {
    Required,
    Invalid,
    Forbidden,
    NotSupported,
}

impl FieldErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldErrorKind::Required => "Required value",
            FieldErrorKind::Invalid => "Invalid value",
            FieldErrorKind::Forbidden => "Forbidden",
            FieldErrorKind::NotSupported => "Unsupported value",
        }
    }
}

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct FieldError {
    pub kind: FieldErrorKind,
    pub field: FieldPath,
    pub bad_value: Option<String>,
    pub detail: String,
}

impl FieldError {
    pub fn required(field: FieldPath, detail: impl Into<String>) -> Self {
        Self {
            kind: FieldErrorKind::Required,
            field,
            bad_value: None,
            detail: detail.into(),
        }
    }

    pub fn invalid(field: FieldPath, value: impl fmt::Display, detail: impl Into<String>) -> Self {
        Self {
            kind: FieldErrorKind::Invalid,
            field,
            bad_value: Some(value.to_string()),
            detail: detail.into(),
        }
    }

    pub fn forbidden(field: FieldPath, detail: impl Into<String>) -> Self {
        Self {
            kind: FieldErrorKind::Forbidden,
            field,
            bad_value: None,
            detail: detail.into(),
        }
    }

    /// Value outside an enumerated set; the detail lists the accepted values
    pub fn not_supported(field: FieldPath, value: impl fmt::Display, valid: &[&str]) -> Self {
        let quoted: Vec<String> = valid.iter().map(|v| format!("\"{v}\"")).collect();
        Self {
            kind: FieldErrorKind::NotSupported,
            field,
            bad_value: Some(value.to_string()),
            detail: format!("supported values: {}", quoted.join(", ")),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind.as_str())?;
        if let Some(value) = &self.bad_value {
            write!(f, ": \"{value}\"")?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered list of field errors; empty means valid
pub type FieldErrorList = Vec<FieldError>;

/// Aggregate of every field error for one object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} \"{name}\" is invalid: [{}]", join(.errors))]
pub struct InvalidObjectError {
    pub kind: String,
    pub name: String,
    pub errors: FieldErrorList,
}

impl InvalidObjectError {
    /// `Ok(())` for an empty list, the aggregate otherwise
    pub fn check(
        kind: impl Into<String>,
        name: impl Into<String>,
        errors: FieldErrorList,
    ) -> Result<(), Self> {
        if errors.is_empty() {
            return Ok(());
        }
        Err(Self {
            kind: kind.into(),
            name: name.into(),
            errors,
        })
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
