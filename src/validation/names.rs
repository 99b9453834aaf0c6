//! # Name Rules
//!
//! Syntax checks for object names, namespaces, service class and plan names.

use super::field::{FieldError, FieldErrorList, FieldPath};
use crate::constants::{
    DNS1123_LABEL_MAX_LENGTH, DNS1123_SUBDOMAIN_MAX_LENGTH, SERVICE_CLASS_NAME_MAX_LENGTH,
    SERVICE_PLAN_NAME_MAX_LENGTH,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use regex::Regex;
use std::sync::LazyLock;

static DNS1123_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$")
        .expect("Failed to compile DNS-1123 label regex - this should never happen")
});

static DNS1123_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("Failed to compile DNS-1123 subdomain regex - this should never happen")
});

static SERVICE_CLASS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-a-zA-Z0-9]+$")
        .expect("Failed to compile service class name regex - this should never happen")
});

static SERVICE_PLAN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-_a-zA-Z0-9]+$")
        .expect("Failed to compile service plan name regex - this should never happen")
});

/// Problems with `value` as a DNS-1123 subdomain; empty when valid
pub fn dns1123_subdomain_problems(value: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        problems.push(format!(
            "must be no more than {DNS1123_SUBDOMAIN_MAX_LENGTH} characters"
        ));
    }
    if !DNS1123_SUBDOMAIN.is_match(value) {
        problems.push(
            "a DNS-1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', \
             and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    problems
}

/// Problems with `value` as a DNS-1123 label; empty when valid
pub fn dns1123_label_problems(value: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if value.len() > DNS1123_LABEL_MAX_LENGTH {
        problems.push(format!(
            "must be no more than {DNS1123_LABEL_MAX_LENGTH} characters"
        ));
    }
    if !DNS1123_LABEL.is_match(value) {
        problems.push(
            "a DNS-1123 label must consist of lower case alphanumeric characters or '-', \
             and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    problems
}

pub fn service_class_name_problems(value: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if value.len() > SERVICE_CLASS_NAME_MAX_LENGTH {
        problems.push(format!(
            "must be no more than {SERVICE_CLASS_NAME_MAX_LENGTH} characters"
        ));
    }
    if !SERVICE_CLASS_NAME.is_match(value) {
        problems.push("must match [-a-zA-Z0-9]+".to_string());
    }
    problems
}

pub fn service_plan_name_problems(value: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if value.len() > SERVICE_PLAN_NAME_MAX_LENGTH {
        problems.push(format!(
            "must be no more than {SERVICE_PLAN_NAME_MAX_LENGTH} characters"
        ));
    }
    if !SERVICE_PLAN_NAME.is_match(value) {
        problems.push("must match [-_a-zA-Z0-9]+".to_string());
    }
    problems
}

/// Required field validated by `problems`; one `Invalid` per problem
pub(crate) fn validate_required_name(
    value: &str,
    path: &FieldPath,
    problems: fn(&str) -> Vec<String>,
) -> FieldErrorList {
    if value.is_empty() {
        return vec![FieldError::required(path.clone(), "")];
    }
    problems(value)
        .into_iter()
        .map(|msg| FieldError::invalid(path.clone(), value, msg))
        .collect()
}

/// Namespaced object metadata: name is a subdomain, namespace is a label
pub fn validate_object_meta(meta: &ObjectMeta, path: &FieldPath) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    let name = meta.name.as_deref().unwrap_or_default();
    if name.is_empty() {
        errors.push(FieldError::required(
            path.child("name"),
            "name is required",
        ));
    } else {
        errors.extend(
            dns1123_subdomain_problems(name)
                .into_iter()
                .map(|msg| FieldError::invalid(path.child("name"), name, msg)),
        );
    }

    errors.extend(validate_required_name(
        meta.namespace.as_deref().unwrap_or_default(),
        &path.child("namespace"),
        dns1123_label_problems,
    ));

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns1123_subdomain() {
        assert!(dns1123_subdomain_problems("my-db.example").is_empty());
        assert!(!dns1123_subdomain_problems("My_DB").is_empty());
        assert!(!dns1123_subdomain_problems(&"a".repeat(254)).is_empty());
    }

    #[test]
    fn test_dns1123_label_rejects_dots() {
        assert!(dns1123_label_problems("test-ns").is_empty());
        assert!(!dns1123_label_problems("test.ns").is_empty());
    }

    #[test]
    fn test_service_class_name() {
        assert!(service_class_name_problems("test-serviceclass").is_empty());
        assert!(!service_class_name_problems("oing20&)*^&").is_empty());
        assert!(!service_class_name_problems("under_score").is_empty());
        assert!(!service_class_name_problems(&"a".repeat(64)).is_empty());
    }

    #[test]
    fn test_service_plan_name() {
        assert!(service_plan_name_problems("test_plan-1").is_empty());
        assert!(!service_plan_name_problems("9651.JVHbebe").is_empty());
    }

    #[test]
    fn test_validate_object_meta_missing_fields() {
        let errors = validate_object_meta(&ObjectMeta::default(), &FieldPath::new("metadata"));
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["metadata.name", "metadata.namespace"]);
    }

    #[test]
    fn test_generate_name_alone_is_not_a_name() {
        let meta = ObjectMeta {
            generate_name: Some("db-".to_string()),
            namespace: Some("test-ns".to_string()),
            ..Default::default()
        };
        let errors = validate_object_meta(&meta, &FieldPath::new("metadata"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_str(), "metadata.name");
        assert_eq!(errors[0].detail, "name is required");
    }
}
