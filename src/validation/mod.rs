//! Input validation.
//!
//! Every input runs through three passes: the declared [`shape`] coerces
//! the raw JSON object, serde builds the typed value, then `validator`
//! constraints and the input's own cross-field checks run. Failures from
//! each pass are reported against the JSON (camelCase) field names.

pub mod extract;
pub mod inputs;
pub mod shape;

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::error::{ApiError, FieldErrors};
pub use extract::{FilterQuery, PathId, ValidatedJson, ValidatedUpdate};
pub use shape::{Field, Kind};

pub const BODY_FIELD: &str = "_body";

/// A typed request input with a declared shape.
pub trait Input: DeserializeOwned + Validate {
    fn shape() -> &'static [Field];

    /// Rules spanning more than one field
    fn check(&self, _errors: &mut FieldErrors) {}
}

/// Validate an untyped JSON value into `T`.
pub fn parse<T: Input>(input: Value) -> Result<T, ApiError> {
    let coerced = shape::coerce(T::shape(), input).map_err(failed)?;

    let value: T = serde_json::from_value(Value::Object(coerced))
        .map_err(|e| ApiError::invalid_field(BODY_FIELD, e.to_string()))?;

    let mut errors = FieldErrors::new();
    if let Err(e) = value.validate() {
        collect_validator_errors(&e, &mut errors);
    }
    value.check(&mut errors);

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(failed(errors))
    }
}

/// Validate an update body, taking the identifier from the path.
///
/// The path id wins over any `id` in the body.
pub fn parse_with_id<T: Input>(id: &str, input: Value) -> Result<T, ApiError> {
    let input = match input {
        Value::Object(mut object) => {
            object.insert("id".to_string(), Value::String(id.to_string()));
            Value::Object(object)
        }
        other => other,
    };
    parse(input)
}

fn failed(errors: FieldErrors) -> ApiError {
    ApiError::validation("Validation failed", errors)
}

fn collect_validator_errors(e: &validator::ValidationErrors, errors: &mut FieldErrors) {
    for (field, field_errors) in e.field_errors() {
        let key = camel_case(&field);
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map_or_else(|| error.code.to_string(), ToString::to_string);
            shape::push_error(errors, &key, message);
        }
    }
}

/// `move_in_date` -> `moveInDate`
pub fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
