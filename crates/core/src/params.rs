//! Typed parameter extraction from a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. A missing key
//! (or an explicit `null`) yields the default; a present value of the wrong
//! type is reported as [`FlowError::ParamTypeMismatch`] instead of being
//! silently replaced, so a typo such as `"particle_count": -5` is rejected
//! before anything is built.

use serde_json::Value;

use crate::error::FlowError;

/// Short description of a JSON value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(_) => "boolean".to_owned(),
        Value::Number(n) => format!("number {n}"),
        Value::String(_) => "string".to_owned(),
        Value::Array(_) => "array".to_owned(),
        Value::Object(_) => "object".to_owned(),
    }
}

fn mismatch(name: &str, expected: &str, got: &Value) -> FlowError {
    FlowError::ParamTypeMismatch {
        name: name.to_owned(),
        expected: expected.to_owned(),
        got: describe(got),
    }
}

/// Present, non-null value for `name`.
fn present<'a>(params: &'a Value, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

/// Extracts an `f64`. Integers are accepted and converted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> Result<f64, FlowError> {
    match present(params, name) {
        None => Ok(default),
        Some(v) => v.as_f64().ok_or_else(|| mismatch(name, "number", v)),
    }
}

/// Extracts a non-negative integer as `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> Result<usize, FlowError> {
    match present(params, name) {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| mismatch(name, "non-negative integer", v)),
    }
}

/// Extracts a `bool`.
pub fn param_bool(params: &Value, name: &str, default: bool) -> Result<bool, FlowError> {
    match present(params, name) {
        None => Ok(default),
        Some(v) => v.as_bool().ok_or_else(|| mismatch(name, "boolean", v)),
    }
}

/// Extracts a `String`.
pub fn param_string(params: &Value, name: &str, default: &str) -> Result<String, FlowError> {
    match present(params, name) {
        None => Ok(default.to_owned()),
        Some(v) => v
            .as_str()
            .map(String::from)
            .ok_or_else(|| mismatch(name, "string", v)),
    }
}
