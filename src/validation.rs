//! Field-level checks shared by the request validators.
//!
//! Each check returns the first message that applies, so a field never
//! carries more than one error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_NUMBER: &str = "A valid number is required.";

/// Conversion from a raw JSON value, with the message used when it does not fit.
pub trait FromJson: Sized {
    const INVALID: &'static str;

    fn from_json(value: Value) -> Option<Self>;
}

/// Strings, with numbers taken as their decimal text.
impl FromJson for String {
    const INVALID: &'static str = INVALID_STRING;

    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Numbers, or strings holding one.
impl FromJson for f64 {
    const INVALID: &'static str = INVALID_NUMBER;

    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// One field of a request body. A value of the wrong type is kept as
/// `Invalid` so it can be reported against its field instead of failing
/// the whole body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Input<T> {
    #[default]
    Missing,
    Null,
    Invalid,
    Value(T),
}

impl<T: FromJson> Input<T> {
    /// `Ok(None)` when the field was not sent.
    pub fn into_result(self) -> Result<Option<T>, String> {
        match self {
            Input::Missing => Ok(None),
            Input::Null => Err(NULL.into()),
            Input::Invalid => Err(T::INVALID.into()),
            Input::Value(v) => Ok(Some(v)),
        }
    }
}

impl<'de, T: FromJson> Deserialize<'de> for Input<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Input::Null,
            value => T::from_json(value).map_or(Input::Invalid, Input::Value),
        })
    }
}

/// Like [`required_text`], for a raw body field.
pub fn required_input(value: Input<String>) -> Result<String, String> {
    required_text(value.into_result()?)
}

pub fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

pub fn min_length_message(min: usize) -> String {
    format!("Ensure this field has at least {min} characters.")
}

/// Trims the value and rejects it when missing or empty.
pub fn required_text(value: Option<String>) -> Result<String, String> {
    let value = value.ok_or_else(|| REQUIRED.to_string())?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BLANK.to_string());
    }
    Ok(trimmed.to_string())
}

/// Trims the value, allowing it to be empty.
pub fn optional_text(value: String) -> String {
    value.trim().to_string()
}

pub fn max_chars(value: String, max: usize) -> Result<String, String> {
    if value.chars().count() > max {
        Err(max_length_message(max))
    } else {
        Ok(value)
    }
}
