//! # Custom Resource Definitions
//!
//! CRD types for the service catalog guard.
//!
//! This module contains the two managed resource kinds, ServiceInstance and
//! ServiceInstanceCredential, the spec/status types they share, and the
//! `ManagedResource` sum type the strategy and admission layers dispatch on.

mod credential;
mod instance;
mod resource;
mod status;

pub use credential::*;
pub use instance::*;
pub use resource::*;
pub use status::*;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Raw parameters document (YAML or JSON)
///
/// Kept as written by the user. The guard only checks that it is a
/// well-formed mapping and never interprets its contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct RawParameters(pub String);

impl RawParameters {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode as a key/value mapping
    ///
    /// YAML is a superset of JSON, so both encodings are accepted.
    pub fn parse_map(&self) -> Result<serde_yaml::Mapping, serde_yaml::Error> {
        serde_yaml::from_str(&self.0)
    }

    /// SHA-256 of the raw document as 64 lowercase hex digits
    pub fn checksum(&self) -> String {
        format!("{:x}", Sha256::digest(self.0.as_bytes()))
    }
}

impl From<&str> for RawParameters {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for RawParameters {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Source of parameters held outside the resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParametersFromSource {
    /// Secret key holding a parameters document
    #[serde(default)]
    pub secret_key_ref: Option<SecretKeyReference>,
}

/// Reference to a key within a Secret in the resource namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyReference {
    /// Secret name
    pub name: String,
    /// Key within the secret
    pub key: String,
}

/// Identity of the user that initiated the latest spec change or delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, Vec<String>>,
}

/// Reference to another object in the same namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocalObjectReference {
    pub name: String,
}
