//! # Status Lifecycle Validation
//!
//! Pure validators over ServiceInstance and ServiceInstanceCredential objects.
//!
//! Each validator returns the full ordered list of field errors; an empty list
//! means the object is valid. Status rules enforce the operation state machine:
//!
//! - an operation in flight has a start time and is never `Ready=True`
//! - an idle object has no start time (and, for instances, no async marker)
//! - operations that push parameters carry `inProgressProperties`, others don't
//! - a properties snapshot pairs parameters with a 64 digit hex checksum
//! - an operation is never set once `reconciledGeneration` caught up with `generation`

mod credential;
mod field;
mod instance;
mod lifecycle;
mod names;
mod parameters;

pub use credential::{
    validate_service_instance_credential, validate_service_instance_credential_status_update,
    validate_service_instance_credential_update,
};
pub use field::{FieldError, FieldErrorKind, FieldErrorList, FieldPath, InvalidObjectError};
pub use instance::{
    validate_service_instance, validate_service_instance_status_update,
    validate_service_instance_update,
};
pub use names::{
    dns1123_label_problems, dns1123_subdomain_problems, service_class_name_problems,
    service_plan_name_problems, validate_object_meta,
};
pub use parameters::{
    is_hexadecimal, validate_inline_parameters, validate_parameters_from,
    validate_properties_snapshot,
};
