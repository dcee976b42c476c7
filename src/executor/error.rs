//! Locating raw errors against the AST and response path, and the
//! field-not-found hint.

use crate::ast::{ResponsePath, SourceLocation};
use crate::resolve::FieldError;
use crate::schema::NamedType;

use super::{ExecutionContext, ExecutionError};

/// Records a located error into the execution context's accumulator.
pub(crate) fn record(
    ctx: &ExecutionContext,
    error: impl Into<FieldError>,
    location: SourceLocation,
    path: &ResponsePath,
) {
    ctx.record_error(ExecutionError::new(error, location, path.clone()));
}

/// Builds the "field '<name>' was not found on type '<Type>'. <hint>"
/// message.
pub(crate) fn field_not_found_message(
    field_name: &str,
    parent_type: Option<&NamedType>,
    parent_type_name: &str,
) -> String {
    let hint = match parent_type {
        Some(NamedType::Object(object)) => {
            let names: Vec<String> = object.fields.keys().cloned().collect();
            parent_type.unwrap().field_not_found_hint(&names)
        }
        Some(other) => other.field_not_found_hint(&[]),
        None => "The type should not be null.".to_owned(),
    };

    if hint.is_empty() {
        format!("field '{field_name}' was not found on type '{parent_type_name}'.")
    } else {
        format!("field '{field_name}' was not found on type '{parent_type_name}'. {hint}")
    }
}
