//! Outward representation of records.
//!
//! Models are serialized with serde; the well-known timestamp fields are then
//! rewritten into a display format (`31.12.2024 23:59:59+0000` by default).
//! Request models parse the same fields leniently through
//! [`flexible_datetime`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::errors::ApiError;

pub const DEFAULT_DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S%z";

pub const TIMESTAMP_FIELDS: [&str; 8] = [
    "created_at",
    "updated_at",
    "start_at",
    "end_at",
    "start_date",
    "end_date",
    "last_run",
    "next_run",
];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCore {
    pub date_time_format: String,
    pub timestamp_fields: Vec<String>,
}

impl Default for SchemaCore {
    fn default() -> Self {
        Self {
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
            timestamp_fields: TIMESTAMP_FIELDS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl SchemaCore {
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_format = format.into();
        self
    }

    #[must_use]
    pub fn with_timestamp_field(mut self, field: impl Into<String>) -> Self {
        self.timestamp_fields.push(field.into());
        self
    }

    /// Serialize one model.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Serialization` if serde fails on the model.
    pub fn dump<M: Serialize>(&self, model: &M) -> Result<Value, ApiError> {
        let mut value = serde_json::to_value(model)?;
        if let Value::Object(fields) = &mut value {
            for name in &self.timestamp_fields {
                if let Some(field) = fields.get_mut(name) {
                    self.format_field(field);
                }
            }
        }
        Ok(value)
    }

    /// # Errors
    ///
    /// See [`SchemaCore::dump`].
    pub fn dump_many<M: Serialize>(&self, models: &[M]) -> Result<Vec<Value>, ApiError> {
        models.iter().map(|model| self.dump(model)).collect()
    }

    /// `None` becomes JSON `null`.
    ///
    /// # Errors
    ///
    /// See [`SchemaCore::dump`].
    pub fn dump_optional<M: Serialize>(&self, model: Option<&M>) -> Result<Value, ApiError> {
        model.map_or(Ok(Value::Null), |model| self.dump(model))
    }

    #[must_use]
    pub fn format(&self, value: &DateTime<Utc>) -> String {
        value.format(&self.date_time_format).to_string()
    }

    fn format_field(&self, field: &mut Value) {
        let parsed = match field {
            Value::String(raw) => parse_serialized(raw),
            _ => None,
        };
        if let Some(timestamp) = parsed {
            *field = Value::String(self.format(&timestamp));
        }
    }
}

fn parse_serialized(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Lenient serde `with` module for timestamps in request bodies.
///
/// Accepts RFC 3339, naive ISO 8601 (read as UTC) and the display format.
/// Serializes as RFC 3339.
pub mod flexible_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{DEFAULT_DATE_TIME_FORMAT, parse_serialized};

    #[must_use]
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        parse_serialized(raw).or_else(|| {
            DateTime::parse_from_str(raw, DEFAULT_DATE_TIME_FORMAT)
                .ok()
                .map(|timestamp| timestamp.with_timezone(&Utc))
        })
    }

    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    /// # Errors
    ///
    /// Fails when the string matches none of the accepted formats.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date time '{raw}'")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        /// # Errors
        ///
        /// Propagates the serializer's error.
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&value.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        /// # Errors
        ///
        /// Fails when a present string matches none of the accepted formats.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid date time '{raw}'"))),
                None => Ok(None),
            }
        }
    }
}
