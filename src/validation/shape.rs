//! Declared input shapes and the coercion pass that runs before typed
//! deserialization. Coercion is where string-or-number and
//! string-or-timestamp inputs are normalized, so every failure here can be
//! reported against the offending field.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::error::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Integer,
    /// Exact decimal, forwarded as a string so no float rounding happens
    Decimal,
    Bool,
    /// Calendar date; accepts `YYYY-MM-DD` or an RFC 3339 timestamp
    Date,
    /// Instant; accepts an RFC 3339 timestamp or a date (midnight UTC)
    DateTime,
    Uuid,
    /// Case-insensitive match against a closed set of labels
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub required: bool,
}

pub const fn required(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: true }
}

pub const fn optional(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: false }
}

pub fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

/// Coerce `input` against `shape`. Unknown keys are dropped; `null` counts
/// as absent.
pub fn coerce(shape: &[Field], input: Value) -> Result<Map<String, Value>, FieldErrors> {
    let mut errors = FieldErrors::new();

    let mut object = match input {
        Value::Object(object) => object,
        _ => {
            push_error(&mut errors, "_body", "Expected a JSON object");
            return Err(errors);
        }
    };

    let mut output = Map::new();
    for field in shape {
        match object.remove(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    push_error(&mut errors, field.name, "Required");
                }
            }
            Some(raw) => match coerce_value(field.kind, raw) {
                Ok(value) => {
                    output.insert(field.name.to_string(), value);
                }
                Err(message) => push_error(&mut errors, field.name, message),
            },
        }
    }

    if errors.is_empty() {
        Ok(output)
    } else {
        Err(errors)
    }
}

fn coerce_value(kind: Kind, raw: Value) -> Result<Value, String> {
    match kind {
        Kind::Text => match raw {
            Value::String(s) => Ok(Value::String(s.trim().to_string())),
            other => Err(format!("Expected string, received {}", type_name(&other))),
        },
        Kind::Integer => {
            let parsed = match &raw {
                Value::Number(n) => n.as_i64().or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                }),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            parsed
                .map(|i| Value::Number(Number::from(i)))
                .ok_or_else(|| "Expected an integer".to_string())
        }
        Kind::Decimal => {
            let parsed = match &raw {
                Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
                Value::String(s) => s.trim().parse::<Decimal>().ok(),
                _ => None,
            };
            parsed
                .map(|d| Value::String(d.normalize().to_string()))
                .ok_or_else(|| "Expected a number".to_string())
        }
        Kind::Bool => match raw {
            Value::Bool(b) => Ok(Value::Bool(b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err("Expected a boolean".to_string()),
            },
            _ => Err("Expected a boolean".to_string()),
        },
        Kind::Date => match raw {
            Value::String(s) => parse_date(&s)
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .ok_or_else(|| "Invalid date".to_string()),
            _ => Err("Invalid date".to_string()),
        },
        Kind::DateTime => match raw {
            Value::String(s) => parse_datetime(&s)
                .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::Micros, true)))
                .ok_or_else(|| "Invalid date".to_string()),
            _ => Err("Invalid date".to_string()),
        },
        Kind::Uuid => match raw {
            Value::String(s) => Uuid::parse_str(s.trim())
                .map(|u| Value::String(u.hyphenated().to_string()))
                .map_err(|_| "Invalid uuid".to_string()),
            _ => Err("Invalid uuid".to_string()),
        },
        Kind::OneOf(labels) => {
            let candidate = raw.as_str().map(|s| s.trim().to_ascii_uppercase());
            match candidate {
                Some(c) if labels.contains(&c.as_str()) => Ok(Value::String(c)),
                _ => Err(format!("Invalid value. Expected one of: {}", labels.join(", "))),
            }
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc).date_naive()))
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
