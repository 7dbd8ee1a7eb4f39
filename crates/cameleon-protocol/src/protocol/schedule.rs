//! Schedule descriptors for message updates.
//!
//! A message update is either applied immediately or according to an
//! [`EventTime`] descriptor. The two forms share one positional argument
//! slot on the wire, which [`UpdateTime`] models as a tagged union.

use std::collections::BTreeMap;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::protocol::error::{CameleonError, Result};
use crate::xmlrpc::{optional, FromValue, ToValue, Value};

/// Wire value of the `IsMessage` struct member. Always 1.
pub const IS_MESSAGE: i32 = 1;

/// Kind of schedule an [`EventTime`] describes.
///
/// Wire-mapped by number; the gaps in the numbering are the remote
/// protocol's, not ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Once = 0,
    Weekly = 1,
    Sunrise = 2,
    Monthly = 4,
    Daily = 5,
    Sunset = 8,
}

impl EventType {
    fn from_wire(code: i32) -> Result<Self> {
        match code {
            0 => Ok(EventType::Once),
            1 => Ok(EventType::Weekly),
            2 => Ok(EventType::Sunrise),
            4 => Ok(EventType::Monthly),
            5 => Ok(EventType::Daily),
            8 => Ok(EventType::Sunset),
            other => Err(CameleonError::Decode(format!(
                "unknown EventType code {other}"
            ))),
        }
    }
}

impl FromValue for EventType {
    fn from_value(value: &Value) -> Result<Self> {
        EventType::from_wire(i32::from_value(value)?)
    }
}

impl ToValue for EventType {
    fn to_value(&self) -> Value {
        Value::Int(*self as i32)
    }
}

/// One-byte mask selecting the days a daily update runs on.
///
/// The most significant bit is Sunday, the next Monday, and so on down to
/// Saturday; the least significant bit is unused.
///
/// # Example
///
/// ```
/// use cameleon_protocol::protocol::Days;
///
/// let weekend = Days::SATURDAY | Days::SUNDAY;
/// assert!(weekend.contains(Days::SUNDAY));
/// assert!(!weekend.contains(Days::MONDAY));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Days(pub u8);

impl Days {
    pub const NONE: Days = Days(0);
    pub const SUNDAY: Days = Days(128);
    pub const MONDAY: Days = Days(64);
    pub const TUESDAY: Days = Days(32);
    pub const WEDNESDAY: Days = Days(16);
    pub const THURSDAY: Days = Days(8);
    pub const FRIDAY: Days = Days(4);
    pub const SATURDAY: Days = Days(2);

    /// Check whether every day in `other` is set in `self`.
    pub fn contains(&self, other: Days) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Days {
    type Output = Days;

    fn bitor(self, rhs: Days) -> Days {
        Days(self.0 | rhs.0)
    }
}

impl ToValue for Days {
    fn to_value(&self) -> Value {
        Value::Int(i32::from(self.0))
    }
}

/// Structured schedule descriptor for a message update.
///
/// Which optional members are required depends on [`EventType`]:
/// `event_time` ("hh:mm:ss AM/PM") for `Once`/`Daily`/`Weekly`/`Monthly`,
/// `day` ("dd/mm/yyyy") for `Once`, `which_days` for `Daily`,
/// `day_of_week` (1 = Sunday) for `Weekly`, `day_of_month` for `Monthly`,
/// and `latitude`/`longitude`/`minutes` for `Sunrise`/`Sunset`.
///
/// Unset members are omitted from the serialized struct entirely; the remote
/// protocol distinguishes absence from placeholder values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTime {
    pub event_type: EventType,
    /// 1 if the update is suppressed on holidays, 0 otherwise.
    pub suspend_on_holiday: i32,
    pub event_time: Option<String>,
    pub day: Option<String>,
    pub which_days: Option<Days>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub minutes: Option<i32>,
    pub day_of_week: Option<i32>,
    pub day_of_month: Option<i32>,
}

impl EventTime {
    /// Create a descriptor with all optional members unset.
    pub fn new(event_type: EventType, suspend_on_holiday: i32) -> Self {
        Self {
            event_type,
            suspend_on_holiday,
            event_time: None,
            day: None,
            which_days: None,
            latitude: None,
            longitude: None,
            minutes: None,
            day_of_week: None,
            day_of_month: None,
        }
    }
}

impl ToValue for EventTime {
    fn to_value(&self) -> Value {
        let mut members = BTreeMap::new();
        members.insert("EventType".to_string(), self.event_type.to_value());
        members.insert("IsMessage".to_string(), Value::Int(IS_MESSAGE));
        members.insert(
            "SuspendOnHoliday".to_string(),
            Value::Int(self.suspend_on_holiday),
        );
        if let Some(event_time) = &self.event_time {
            members.insert("EventTime".to_string(), event_time.to_value());
        }
        if let Some(day) = &self.day {
            members.insert("Day".to_string(), day.to_value());
        }
        if let Some(which_days) = &self.which_days {
            members.insert("whichDays".to_string(), which_days.to_value());
        }
        if let Some(latitude) = self.latitude {
            members.insert("Latitude".to_string(), latitude.to_value());
        }
        if let Some(longitude) = self.longitude {
            members.insert("Longitude".to_string(), longitude.to_value());
        }
        if let Some(minutes) = self.minutes {
            members.insert("Minutes".to_string(), minutes.to_value());
        }
        if let Some(day_of_week) = self.day_of_week {
            members.insert("DayOfWeek".to_string(), day_of_week.to_value());
        }
        if let Some(day_of_month) = self.day_of_month {
            members.insert("DayOfMonth".to_string(), day_of_month.to_value());
        }
        Value::Struct(members)
    }
}

impl FromValue for EventTime {
    // The remote serializer omits members freely; absent required members
    // decode to their zero values.
    fn from_value(value: &Value) -> Result<Self> {
        Ok(EventTime {
            event_type: optional(value, "EventType")?.unwrap_or(EventType::Once),
            suspend_on_holiday: optional(value, "SuspendOnHoliday")?.unwrap_or(0),
            event_time: optional(value, "EventTime")?,
            day: optional(value, "Day")?,
            which_days: optional::<i32>(value, "whichDays")?.map(|bits| Days(bits as u8)),
            latitude: optional(value, "Latitude")?,
            longitude: optional(value, "Longitude")?,
            minutes: optional(value, "Minutes")?,
            day_of_week: optional(value, "DayOfWeek")?,
            day_of_month: optional(value, "DayOfMonth")?,
        })
    }
}

/// When a message update takes effect.
///
/// The two variants are mutually exclusive representations sharing one
/// positional argument slot: `Immediately` serializes as the
/// immediate-sentinel string, `At` as the schedule struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateTime {
    Immediately,
    At(EventTime),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_time_serializes_required_members_only() {
        let schedule = EventTime::new(EventType::Sunrise, 1);
        let value = schedule.to_value();

        let members = value.as_struct().unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(members["EventType"], Value::Int(2));
        assert_eq!(members["IsMessage"], Value::Int(1));
        assert_eq!(members["SuspendOnHoliday"], Value::Int(1));
    }

    #[test]
    fn event_time_serializes_optional_members_when_set() {
        let mut schedule = EventTime::new(EventType::Daily, 0);
        schedule.event_time = Some("09:30:00 AM".to_string());
        schedule.which_days = Some(Days::MONDAY | Days::FRIDAY);
        let value = schedule.to_value();

        let members = value.as_struct().unwrap();
        assert_eq!(
            members["EventTime"],
            Value::String("09:30:00 AM".to_string())
        );
        assert_eq!(members["whichDays"], Value::Int(68));
        assert!(!members.contains_key("Latitude"));
        assert!(!members.contains_key("Day"));
    }

    #[test]
    fn event_time_round_trips_through_value() {
        let mut schedule = EventTime::new(EventType::Once, 1);
        schedule.event_time = Some("11:00:00 PM".to_string());
        schedule.day = Some("24/12/2025".to_string());

        let decoded = EventTime::from_value(&schedule.to_value()).unwrap();
        assert_eq!(decoded, schedule);
    }

    #[test]
    fn event_time_decodes_with_missing_members() {
        let value = Value::Struct(BTreeMap::new());
        let decoded = EventTime::from_value(&value).unwrap();
        assert_eq!(decoded.event_type, EventType::Once);
        assert_eq!(decoded.suspend_on_holiday, 0);
        assert_eq!(decoded.event_time, None);
    }

    #[test]
    fn unknown_event_type_code_is_a_decode_error() {
        let result = EventType::from_value(&Value::Int(3));
        assert!(matches!(result, Err(CameleonError::Decode(_))));
    }

    #[test]
    fn days_mask_matches_wire_numbering() {
        assert_eq!((Days::SUNDAY | Days::SATURDAY).0, 130);
        assert_eq!(Days::NONE.0, 0);
        assert!(Days(0xFF).contains(Days::WEDNESDAY));
    }
}
