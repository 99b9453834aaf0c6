//! # ServiceInstance
//!
//! A request to provision a service from a broker.

use super::status::empty_as_none;
use super::{Condition, ParametersFromSource, PropertiesSnapshot, RawParameters, UserInfo};
use kube::CustomResource;
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// ServiceInstance Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: servicecatalog.k8s.io/v1alpha1
/// kind: ServiceInstance
/// metadata:
///   name: my-database
///   namespace: default
/// spec:
///   serviceClassName: postgres
///   planName: small
///   parameters: |
///     storage: 10Gi
/// ```
#[derive(CustomResource, Debug, Clone, PartialEq, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "ServiceInstance",
    group = "servicecatalog.k8s.io",
    version = "v1alpha1",
    namespaced,
    status = "ServiceInstanceStatus",
    shortname = "si",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Class", "type":"string", "jsonPath":".spec.serviceClassName"}, {"name":"Plan", "type":"string", "jsonPath":".spec.planName"}, {"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstanceSpec {
    /// Name of the service class offered by the broker
    pub service_class_name: String,
    /// Name of the plan within the service class
    pub plan_name: String,
    /// Inline parameters for the broker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<RawParameters>,
    /// Parameters sourced from secrets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters_from: Vec<ParametersFromSource>,
    /// User that initiated the latest spec change or delete
    /// Set by the guard; client-supplied values are overwritten when identity capture is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
}

/// Status of a ServiceInstance
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstanceStatus {
    /// Conditions, at most one per type
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// True while an asynchronous broker operation is outstanding
    #[serde(default)]
    pub async_op_in_progress: bool,
    /// Opaque token of the outstanding asynchronous broker operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<String>,
    /// Dashboard URL returned by the broker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    /// Operation the reconciler is currently carrying out
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_operation: Option<InstanceOperation>,
    /// Generation the reconciler last fully processed
    #[serde(default)]
    pub reconciled_generation: i64,
    /// When the current operation started (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_start_time: Option<String>,
    /// Properties being pushed to the broker by the current operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress_properties: Option<PropertiesSnapshot>,
    /// Properties of the last successful operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_properties: Option<PropertiesSnapshot>,
}

/// Operation a ServiceInstance reconciler can be carrying out
///
/// Unknown values are kept verbatim so validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceOperation {
    Provision,
    Update,
    Deprovision,
    Unsupported(String),
}

impl InstanceOperation {
    /// Wire values accepted for `currentOperation`; "" means none
    pub const SUPPORTED: &'static [&'static str] = &["", "Provision", "Update", "Deprovision"];

    pub fn as_str(&self) -> &str {
        match self {
            InstanceOperation::Provision => "Provision",
            InstanceOperation::Update => "Update",
            InstanceOperation::Deprovision => "Deprovision",
            InstanceOperation::Unsupported(s) => s,
        }
    }

    /// Whether this operation must carry `inProgressProperties`
    pub fn pushes_properties(&self) -> bool {
        matches!(self, InstanceOperation::Provision | InstanceOperation::Update)
    }
}

impl From<String> for InstanceOperation {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Provision" => InstanceOperation::Provision,
            "Update" => InstanceOperation::Update,
            "Deprovision" => InstanceOperation::Deprovision,
            _ => InstanceOperation::Unsupported(value),
        }
    }
}

impl From<InstanceOperation> for String {
    fn from(op: InstanceOperation) -> Self {
        match op {
            InstanceOperation::Unsupported(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for InstanceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonSchema for InstanceOperation {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("InstanceOperation")
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        schemars::json_schema!({
            "type": "string",
            "enum": ["Provision", "Update", "Deprovision"],
            "description": "Operation currently being carried out against the broker"
        })
    }
}

impl ServiceInstance {
    /// Status, or the zero status when none has been written
    pub fn status_or_default(&self) -> Cow<'_, ServiceInstanceStatus> {
        match &self.status {
            Some(status) => Cow::Borrowed(status),
            None => Cow::Owned(ServiceInstanceStatus::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_operation_from_string() {
        assert_eq!(
            InstanceOperation::from("Provision".to_string()),
            InstanceOperation::Provision
        );
        assert_eq!(
            InstanceOperation::from("Bind".to_string()),
            InstanceOperation::Unsupported("Bind".to_string())
        );
    }

    #[test]
    fn test_empty_current_operation_reads_as_none() {
        let status: ServiceInstanceStatus =
            serde_json::from_value(serde_json::json!({ "currentOperation": "" })).unwrap();
        assert!(status.current_operation.is_none());

        let status: ServiceInstanceStatus =
            serde_json::from_value(serde_json::json!({ "currentOperation": "Update" })).unwrap();
        assert_eq!(status.current_operation, Some(InstanceOperation::Update));
    }

    #[test]
    fn test_unknown_operation_round_trips_verbatim() {
        let status: ServiceInstanceStatus =
            serde_json::from_value(serde_json::json!({ "currentOperation": "Explode" })).unwrap();
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["currentOperation"], "Explode");
    }

    #[test]
    fn test_spec_uses_camel_case() {
        let spec: ServiceInstanceSpec = serde_json::from_value(serde_json::json!({
            "serviceClassName": "postgres",
            "planName": "small",
            "parametersFrom": [{ "secretKeyRef": { "name": "s", "key": "k" } }]
        }))
        .unwrap();
        assert_eq!(spec.service_class_name, "postgres");
        assert_eq!(spec.parameters_from.len(), 1);
        assert!(spec.parameters.is_none());
    }

    #[test]
    fn test_pushes_properties() {
        assert!(InstanceOperation::Provision.pushes_properties());
        assert!(InstanceOperation::Update.pushes_properties());
        assert!(!InstanceOperation::Deprovision.pushes_properties());
    }
}
