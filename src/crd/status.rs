//! # Shared Status Types
//!
//! Conditions and properties snapshots used by both ServiceInstance and
//! ServiceInstanceCredential status.

use crate::crd::RawParameters;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Status of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition represents a condition of a resource
///
/// At most one condition per type is kept; conditions stay in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (e.g. "Ready", "Failed")
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,
    /// Last transition time (RFC3339)
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

impl Condition {
    /// True when this is a `Ready` condition with status `True`
    pub fn is_ready_true(&self) -> bool {
        self.r#type == crate::constants::CONDITION_READY && self.status == ConditionStatus::True
    }
}

/// Parameters payload plus its checksum
///
/// Captured while an operation is in flight (`inProgressProperties`) or after
/// the last successful operation (`externalProperties`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesSnapshot {
    /// Raw parameters document sent to the broker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<RawParameters>,
    /// SHA-256 of the parameters, 64 hex digits; empty when there are no parameters
    #[serde(default)]
    pub parameters_checksum: String,
}

impl PropertiesSnapshot {
    /// Build a snapshot whose checksum matches the given parameters
    pub fn capture(parameters: Option<RawParameters>) -> Self {
        let parameters_checksum = parameters
            .as_ref()
            .map(RawParameters::checksum)
            .unwrap_or_default();
        Self {
            parameters,
            parameters_checksum,
        }
    }
}

/// Deserialize an operation string, reading "" as no operation
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(T::from))
}
