//! # Wire Serializer
//!
//! Maps records to and from their external JSON representation.
//!
//! Only the descriptor's wire allow-list crosses the boundary. Outbound,
//! ids are hyphenated UUID strings and timestamps are RFC 3339 strings.
//! Inbound, values are coerced leniently:
//!
//! | type        | accepted JSON                                   |
//! |-------------|-------------------------------------------------|
//! | `Text`      | string                                          |
//! | `Integer`   | integer number, or a string holding one         |
//! | `Boolean`   | bool, or `"true"` / `"false"`                   |
//! | `Uuid`      | any textual UUID form                           |
//! | `Timestamp` | RFC 3339 string, or epoch milliseconds          |
//!
//! Fields outside the allow-list are ignored and `null` counts as absent.

use crate::domain::entities::{EntityDescriptor, Record};
use crate::domain::value_objects::{FieldType, FieldValue, RecordId, Timestamp};
use serde_json::{Map, Value};
use thiserror::Error;

/// Inbound payload failed validation.
///
/// Lists every missing required field and every field whose value could
/// not be coerced to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: missing {missing:?}, invalid {invalid:?}")]
pub struct ValidationError {
    missing: Vec<String>,
    invalid: Vec<String>,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub fn new(missing: Vec<String>, invalid: Vec<String>) -> Self {
        Self { missing, invalid }
    }

    /// Returns the missing required fields.
    #[must_use]
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Returns the fields whose values were rejected.
    #[must_use]
    pub fn invalid(&self) -> &[String] {
        &self.invalid
    }

    /// Returns every offending field name, missing first.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.missing
            .iter()
            .chain(&self.invalid)
            .map(String::as_str)
            .collect()
    }
}

/// Wire serializer for one entity type.
#[derive(Debug, Clone, Copy)]
pub struct WireSerializer {
    descriptor: &'static EntityDescriptor,
}

impl WireSerializer {
    /// Creates a serializer for `descriptor`.
    #[must_use]
    pub const fn new(descriptor: &'static EntityDescriptor) -> Self {
        Self { descriptor }
    }

    /// Returns the descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    /// Renders the allow-listed fields of `record` as a JSON object.
    #[must_use]
    pub fn to_wire(&self, record: &Record) -> Map<String, Value> {
        self.descriptor
            .wire_specs()
            .filter_map(|spec| {
                record
                    .get(spec.name())
                    .map(|value| (spec.name().to_owned(), to_json(value)))
            })
            .collect()
    }

    /// Builds a record from an inbound JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming every missing required field and
    /// every value that could not be coerced. A payload that is not an
    /// object is treated as empty.
    pub fn from_wire(&self, payload: &Value) -> Result<Record, ValidationError> {
        let empty = Map::new();
        let object = payload.as_object().unwrap_or(&empty);

        let mut record = Record::new();
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        for spec in self.descriptor.wire_specs() {
            match object.get(spec.name()) {
                None | Some(Value::Null) => {
                    if spec.is_required() {
                        missing.push(spec.name().to_owned());
                    }
                }
                Some(raw) => match coerce(spec.field_type(), raw) {
                    Some(value) => {
                        record.set(spec.name(), value);
                    }
                    None => invalid.push(spec.name().to_owned()),
                },
            }
        }

        if missing.is_empty() && invalid.is_empty() {
            Ok(record)
        } else {
            tracing::debug!(
                entity = self.descriptor.name(),
                ?missing,
                ?invalid,
                "rejected inbound payload"
            );
            Err(ValidationError::new(missing, invalid))
        }
    }
}

fn to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Integer(n) => Value::from(*n),
        FieldValue::Boolean(b) => Value::Bool(*b),
        FieldValue::Uuid(id) => Value::String(id.to_string()),
        FieldValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
    }
}

fn coerce(field_type: FieldType, raw: &Value) -> Option<FieldValue> {
    match (field_type, raw) {
        (FieldType::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
        (FieldType::Integer, Value::Number(n)) => n.as_i64().map(FieldValue::Integer),
        (FieldType::Integer, Value::String(s)) => s.trim().parse().ok().map(FieldValue::Integer),
        (FieldType::Boolean, Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
        (FieldType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(FieldValue::Boolean(true)),
            "false" => Some(FieldValue::Boolean(false)),
            _ => None,
        },
        (FieldType::Uuid, Value::String(s)) => RecordId::parse(s).ok().map(FieldValue::Uuid),
        (FieldType::Timestamp, Value::String(s)) => {
            Timestamp::parse_rfc3339(s).map(FieldValue::Timestamp)
        }
        (FieldType::Timestamp, Value::Number(n)) => n
            .as_i64()
            .and_then(Timestamp::from_millis)
            .map(FieldValue::Timestamp),
        _ => None,
    }
}
