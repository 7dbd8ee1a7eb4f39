//! The XML-RPC value model and typed conversions.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::protocol::error::{CameleonError, Result};

/// A decoded XML-RPC value.
///
/// This is the dynamic shape the codec produces and consumes; typed DTOs
/// convert through it via [`ToValue`] and [`FromValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    String(String),
    Double(f64),
    DateTime(NaiveDateTime),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
}

impl Value {
    /// Wire type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
            Value::Double(_) => "double",
            Value::DateTime(_) => "dateTime.iso8601",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Struct member lookup; a missing member is a decode error.
    pub fn member(&self, name: &str) -> Result<&Value> {
        self.opt_member(name)?.ok_or_else(|| {
            CameleonError::Decode(format!("missing struct member `{name}`"))
        })
    }

    /// Struct member lookup tolerating absence; non-struct receivers are
    /// still a decode error.
    pub fn opt_member(&self, name: &str) -> Result<Option<&Value>> {
        match self {
            Value::Struct(members) => Ok(members.get(name)),
            other => Err(CameleonError::Decode(format!(
                "expected struct with member `{name}`, got {}",
                other.type_name()
            ))),
        }
    }
}

/// Conversion into the wire value model.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Conversion out of the wire value model.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

/// Decode a required struct member.
pub fn required<T: FromValue>(value: &Value, member: &str) -> Result<T> {
    T::from_value(value.member(member)?)
}

/// Decode an optional struct member; absence is `None`, a present member of
/// the wrong shape is still an error.
pub fn optional<T: FromValue>(value: &Value, member: &str) -> Result<Option<T>> {
    match value.opt_member(member)? {
        Some(inner) => Ok(Some(T::from_value(inner)?)),
        None => Ok(None),
    }
}

fn type_mismatch(expected: &str, actual: &Value) -> CameleonError {
    CameleonError::Decode(format!(
        "expected {expected}, got {}",
        actual.type_name()
    ))
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_i32().ok_or_else(|| type_mismatch("int", value))
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| type_mismatch("boolean", value))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| type_mismatch("double", value))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| type_mismatch("string", value))
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            other => Err(type_mismatch("dateTime.iso8601", other)),
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_array()
            .ok_or_else(|| type_mismatch("array", value))?
            .iter()
            .map(T::from_value)
            .collect()
    }
}

impl FromValue for BTreeMap<String, Value> {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_struct()
            .cloned()
            .ok_or_else(|| type_mismatch("struct", value))
    }
}
