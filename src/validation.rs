//! Field extraction for JSON request bodies.
//!
//! Each helper reads one field from a JSON object, records any problem in a
//! shared [`FieldErrors`] and returns the cleaned value when it is usable. The
//! caller converts the accumulated errors into a single validation response.

use crate::error::{
    ApiError, FieldErrors, FIELD_BLANK, FIELD_NOT_STRING, FIELD_NULL, FIELD_REQUIRED,
    NON_FIELD_ERRORS,
};
use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

/// The body as a JSON object, or a validation error naming what arrived instead
pub fn as_object(body: &Value) -> Result<&Object, ApiError> {
    body.as_object().ok_or_else(|| {
        ApiError::Validation(FieldErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(body)
            ),
        ))
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Strings pass through trimmed; numbers are accepted in their JSON form
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A field that must be present and hold a non-blank string
pub fn required_string(obj: &Object, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match obj.get(field) {
        None => {
            errors.add(field, FIELD_REQUIRED);
            None
        }
        Some(value) => string_value(value, field, errors),
    }
}

/// A field that may be omitted, but must be a non-blank string when present
pub fn optional_string(obj: &Object, field: &str, errors: &mut FieldErrors) -> Option<String> {
    obj.get(field)
        .and_then(|value| string_value(value, field, errors))
}

fn string_value(value: &Value, field: &str, errors: &mut FieldErrors) -> Option<String> {
    if value.is_null() {
        errors.add(field, FIELD_NULL);
        return None;
    }

    match coerce_string(value) {
        None => {
            errors.add(field, FIELD_NOT_STRING);
            None
        }
        Some(s) if s.is_empty() => {
            errors.add(field, FIELD_BLANK);
            None
        }
        Some(s) => Some(s),
    }
}

/// Record a length error when `value` exceeds `max` characters
pub fn max_length(value: &str, field: &str, max: usize, errors: &mut FieldErrors) {
    if value.chars().count() > max {
        errors.add(field, max_length_message(max));
    }
}

pub fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

/// A string restricted to `choices`
pub fn choice(
    obj: &Object,
    field: &str,
    choices: &[&str],
    required: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = if required {
        required_string(obj, field, errors)?
    } else {
        optional_string(obj, field, errors)?
    };

    if choices.contains(&value.as_str()) {
        Some(value)
    } else {
        errors.add(field, format!("\"{}\" is not a valid choice.", value));
        None
    }
}

/// A primary-key reference given as an integer or a numeric string
pub fn primary_key(
    obj: &Object,
    field: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<i64> {
    let value = match obj.get(field) {
        None if required => {
            errors.add(field, FIELD_REQUIRED);
            return None;
        }
        None => return None,
        Some(Value::Null) => {
            errors.add(field, FIELD_NULL);
            return None;
        }
        Some(value) => value,
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };

    if parsed.is_none() {
        errors.add(
            field,
            format!(
                "Incorrect type. Expected pk value, received {}.",
                json_type_name(value)
            ),
        );
    }
    parsed
}

pub fn missing_pk_message(pk: i64) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", pk)
}
