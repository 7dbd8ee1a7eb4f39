//! Message DTOs exchanged with the sign controller.
//!
//! Rust field names are idiomatic; the wire member names are the remote
//! protocol's exact spellings (including `"whichDays"` and the lowercase
//! `"message"` member) and live only in the `ToValue`/`FromValue` impls.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::protocol::error::{CameleonError, Result};
use crate::protocol::schedule::EventTime;
use crate::xmlrpc::{optional, required, FromValue, ToValue, Value};

/// Outcome of a message update, as reported by the controller.
///
/// Wire-mapped by name string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateStatus {
    InvalidData,
    InvalidUsernamePassword,
    AllUpdated,
    AllUpdatedLater,
    Errors,
}

impl FromValue for UpdateStatus {
    fn from_value(value: &Value) -> Result<Self> {
        match value.as_str() {
            Some("InvalidData") => Ok(UpdateStatus::InvalidData),
            Some("InvalidUsernamePassword") => Ok(UpdateStatus::InvalidUsernamePassword),
            Some("AllUpdated") => Ok(UpdateStatus::AllUpdated),
            Some("AllUpdatedLater") => Ok(UpdateStatus::AllUpdatedLater),
            Some("Errors") => Ok(UpdateStatus::Errors),
            Some(other) => Err(CameleonError::Decode(format!(
                "unknown UpdateStatus `{other}`"
            ))),
            None => Err(CameleonError::Decode(format!(
                "expected UpdateStatus string, got {}",
                value.type_name()
            ))),
        }
    }
}

/// A sign the controller failed to update, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignError {
    pub location: String,
    pub error: String,
}

impl FromValue for SignError {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(SignError {
            location: required(value, "Location")?,
            error: required(value, "Error")?,
        })
    }
}

/// Reply to a `SetMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetMessageResponse {
    pub server_name: String,
    pub update_status: UpdateStatus,
    /// Empty unless `update_status` is [`UpdateStatus::Errors`].
    pub signs_not_updated: Vec<SignError>,
}

impl FromValue for SetMessageResponse {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(SetMessageResponse {
            server_name: required(value, "ServerName")?,
            update_status: required(value, "UpdateStatus")?,
            signs_not_updated: optional(value, "SignsNotUpdated")?.unwrap_or_default(),
        })
    }
}

/// Directory entry for a sign or sign group, from `GetSignIDs`.
///
/// The controller populates members selectively; `sign_group` is present
/// only for group entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInfo {
    pub id: Option<String>,
    pub location: Option<String>,
    pub script_tag: Option<String>,
    pub sign_group: Option<String>,
}

impl FromValue for SignInfo {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(SignInfo {
            id: optional(value, "ID")?,
            location: optional(value, "Location")?,
            script_tag: optional(value, "ScriptTag")?,
            sign_group: optional(value, "SignGroup")?,
        })
    }
}

/// A message sitting in the controller's schedule queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub message_id: i32,
    pub recipients: Vec<String>,
    pub update_time: EventTime,
    pub next_update_time: NaiveDateTime,
    pub update_schedule: String,
    pub message_level: i32,
    pub user_name: String,
    pub message_name: String,
    pub end_time: EventTime,
    pub next_end_time: NaiveDateTime,
    pub end_time_schedule: String,
}

impl FromValue for ScheduledMessage {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(ScheduledMessage {
            message_id: required(value, "MessageID")?,
            recipients: required(value, "Recipients")?,
            update_time: required(value, "UpdateTime")?,
            next_update_time: required(value, "NextUpdateTime")?,
            update_schedule: required(value, "UpdateSchedule")?,
            message_level: required(value, "MessageLevel")?,
            user_name: required(value, "UserName")?,
            message_name: required(value, "MessageName")?,
            end_time: required(value, "EndTime")?,
            next_end_time: required(value, "NextEndTime")?,
            end_time_schedule: required(value, "EndTimeSchedule")?,
        })
    }
}

/// One display phase of a message: the text lines shown together, how long
/// they dwell, and the blank gap before the next phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePhase {
    pub line_text: Vec<String>,
    pub dwell_time: i32,
    pub blank_time: f64,
}

impl ToValue for MessagePhase {
    fn to_value(&self) -> Value {
        let mut members = BTreeMap::new();
        members.insert("LineText".to_string(), self.line_text.to_value());
        members.insert("DwellTime".to_string(), Value::Int(self.dwell_time));
        members.insert("BlankTime".to_string(), Value::Double(self.blank_time));
        Value::Struct(members)
    }
}

impl FromValue for MessagePhase {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(MessagePhase {
            line_text: required(value, "LineText")?,
            dwell_time: required(value, "DwellTime")?,
            blank_time: required(value, "BlankTime")?,
        })
    }
}

/// Reply to `GetCurrentMessage`: what a single sign is showing right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMessage {
    pub server_name: String,
    pub color: i32,
    pub full_matrix: bool,
    pub phases: Vec<MessagePhase>,
    pub num_phases: i32,
    pub num_rows: i32,
    pub message_name: String,
}

impl FromValue for CurrentMessage {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(CurrentMessage {
            server_name: required(value, "ServerName")?,
            color: required(value, "Color")?,
            full_matrix: required(value, "FullMatrix")?,
            phases: required(value, "message")?,
            num_phases: required(value, "NumPhases")?,
            num_rows: required(value, "NumRows")?,
            message_name: required(value, "MessageName")?,
        })
    }
}

/// A controller-wide broadcast message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMessage {
    pub id: i32,
    pub message: String,
}

impl FromValue for GlobalMessage {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(GlobalMessage {
            id: required(value, "ID")?,
            message: required(value, "Message")?,
        })
    }
}

/// Reply to `ValidateUsernamePassword`.
///
/// Accepts both the name-string and ordinal-number wire forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
    Valid,
    Invalid,
}

impl FromValue for CredentialStatus {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) if s == "Valid" => Ok(CredentialStatus::Valid),
            Value::String(s) if s == "Invalid" => Ok(CredentialStatus::Invalid),
            Value::Int(0) => Ok(CredentialStatus::Valid),
            Value::Int(1) => Ok(CredentialStatus::Invalid),
            other => Err(CameleonError::Decode(format!(
                "unrecognized CredentialStatus {other:?}"
            ))),
        }
    }
}

/// Reply slot that legitimately carries either a structured success value or
/// a plain-string business error.
///
/// Exactly one variant is ever populated; the string form is the remote
/// protocol's way of reporting a business failure inside a successful frame
/// and is not a transport fault.
///
/// # Example
///
/// ```
/// use cameleon_protocol::protocol::MixedResult;
///
/// let ok: MixedResult<i32> = MixedResult::Data(7);
/// assert_eq!(ok.into_result(), Ok(7));
///
/// let err: MixedResult<i32> = MixedResult::ErrorMessage("no such sign".into());
/// assert!(err.is_error());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum MixedResult<T> {
    Data(T),
    ErrorMessage(String),
}

impl<T> MixedResult<T> {
    /// The success payload, if any.
    pub fn data(self) -> Option<T> {
        match self {
            MixedResult::Data(data) => Some(data),
            MixedResult::ErrorMessage(_) => None,
        }
    }

    /// The business error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            MixedResult::Data(_) => None,
            MixedResult::ErrorMessage(message) => Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MixedResult::ErrorMessage(_))
    }

    /// Convert to a plain `Result`, with the business error as `Err`.
    pub fn into_result(self) -> std::result::Result<T, String> {
        match self {
            MixedResult::Data(data) => Ok(data),
            MixedResult::ErrorMessage(message) => Err(message),
        }
    }
}

impl<T: FromValue> MixedResult<T> {
    /// Branch on the decoded reply's shape: a plain string is the business
    /// error form, anything else must decode as `T`.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(message) => Ok(MixedResult::ErrorMessage(message.clone())),
            other => Ok(MixedResult::Data(T::from_value(other)?)),
        }
    }
}
