//! # ServiceInstanceCredential
//!
//! A request to bind to a provisioned ServiceInstance and receive credentials
//! in a Secret.

use super::status::empty_as_none;
use super::{
    Condition, LocalObjectReference, ParametersFromSource, PropertiesSnapshot, RawParameters,
    UserInfo,
};
use kube::CustomResource;
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// ServiceInstanceCredential Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: servicecatalog.k8s.io/v1alpha1
/// kind: ServiceInstanceCredential
/// metadata:
///   name: my-database-credentials
///   namespace: default
/// spec:
///   instanceRef:
///     name: my-database
///   secretName: my-database-credentials
/// ```
#[derive(CustomResource, Debug, Clone, PartialEq, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "ServiceInstanceCredential",
    group = "servicecatalog.k8s.io",
    version = "v1alpha1",
    namespaced,
    status = "ServiceInstanceCredentialStatus",
    shortname = "sic",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Instance", "type":"string", "jsonPath":".spec.instanceRef.name"}, {"name":"Secret", "type":"string", "jsonPath":".spec.secretName"}, {"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstanceCredentialSpec {
    /// ServiceInstance in the same namespace to bind to
    pub instance_ref: LocalObjectReference,
    /// Secret receiving the credentials
    #[serde(default)]
    pub secret_name: String,
    /// Inline parameters for the broker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<RawParameters>,
    /// Parameters sourced from secrets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters_from: Vec<ParametersFromSource>,
    /// User that initiated the latest spec change or delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
}

/// Status of a ServiceInstanceCredential
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstanceCredentialStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_operation: Option<CredentialOperation>,
    #[serde(default)]
    pub reconciled_generation: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress_properties: Option<PropertiesSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_properties: Option<PropertiesSnapshot>,
}

/// Operation a ServiceInstanceCredential reconciler can be carrying out
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum CredentialOperation {
    Bind,
    Unbind,
    Unsupported(String),
}

impl CredentialOperation {
    /// Wire values accepted for `currentOperation`; "" means none
    pub const SUPPORTED: &'static [&'static str] = &["", "Bind", "Unbind"];

    pub fn as_str(&self) -> &str {
        match self {
            CredentialOperation::Bind => "Bind",
            CredentialOperation::Unbind => "Unbind",
            CredentialOperation::Unsupported(s) => s,
        }
    }

    /// Whether this operation must carry `inProgressProperties`
    pub fn pushes_properties(&self) -> bool {
        matches!(self, CredentialOperation::Bind)
    }
}

impl From<String> for CredentialOperation {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Bind" => CredentialOperation::Bind,
            "Unbind" => CredentialOperation::Unbind,
            _ => CredentialOperation::Unsupported(value),
        }
    }
}

impl From<CredentialOperation> for String {
    fn from(op: CredentialOperation) -> Self {
        match op {
            CredentialOperation::Unsupported(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for CredentialOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonSchema for CredentialOperation {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("CredentialOperation")
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        schemars::json_schema!({
            "type": "string",
            "enum": ["Bind", "Unbind"],
            "description": "Operation currently being carried out against the broker"
        })
    }
}

impl ServiceInstanceCredential {
    /// Status, or the zero status when none has been written
    pub fn status_or_default(&self) -> Cow<'_, ServiceInstanceCredentialStatus> {
        match &self.status {
            Some(status) => Cow::Borrowed(status),
            None => Cow::Owned(ServiceInstanceCredentialStatus::default()),
        }
    }
}
