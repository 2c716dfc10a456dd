//! # Record Codec
//!
//! Translation between domain [`Record`]s and the store's native row
//! representation (a UUID key plus a [`ColumnMap`] of raw bytes).
//!
//! Column values use the binary layouts of a column-family store's
//! standard validators, so index predicates built from encoded values
//! compare byte-for-byte with stored columns:
//!
//! | type        | bytes                                   |
//! |-------------|-----------------------------------------|
//! | `Text`      | UTF-8                                   |
//! | `Integer`   | 8-byte big-endian two's complement      |
//! | `Boolean`   | 1 byte, zero is false                   |
//! | `Uuid`      | 16 raw bytes                            |
//! | `Timestamp` | 8-byte big-endian epoch milliseconds    |

use crate::domain::entities::{EntityDescriptor, Record};
use crate::domain::value_objects::{FieldType, FieldValue, RecordId, Timestamp};
use crate::infrastructure::persistence::traits::ColumnMap;
use bytes::Bytes;
use thiserror::Error;

/// Error raised when a record cannot be encoded or a row cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A required field is absent.
    #[error("{entity}: required field `{field}` is missing")]
    MissingField {
        /// Entity type name.
        entity: &'static str,
        /// Field name.
        field: &'static str,
    },

    /// A record value does not have the declared type.
    #[error("{entity}: field `{field}` must be {expected}, found {actual}")]
    TypeMismatch {
        /// Entity type name.
        entity: &'static str,
        /// Field name.
        field: &'static str,
        /// Declared type.
        expected: FieldType,
        /// Actual type.
        actual: FieldType,
    },

    /// A stored column does not parse as the declared type.
    #[error("{entity}: column `{field}` is not a valid {expected}: {reason}")]
    Malformed {
        /// Entity type name.
        entity: &'static str,
        /// Field name.
        field: &'static str,
        /// Declared type.
        expected: FieldType,
        /// Parse failure.
        reason: String,
    },
}

impl CodecError {
    /// Returns the name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::Malformed { field, .. } => *field,
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Encodes one value to its column bytes.
#[must_use]
pub fn encode_value(value: &FieldValue) -> Bytes {
    match value {
        FieldValue::Text(s) => Bytes::copy_from_slice(s.as_bytes()),
        FieldValue::Integer(n) => Bytes::copy_from_slice(&n.to_be_bytes()),
        FieldValue::Boolean(b) => Bytes::copy_from_slice(&[u8::from(*b)]),
        FieldValue::Uuid(id) => Bytes::copy_from_slice(id.as_bytes()),
        FieldValue::Timestamp(ts) => Bytes::copy_from_slice(&ts.timestamp_millis().to_be_bytes()),
    }
}

/// Decodes column bytes as the given type.
///
/// # Errors
///
/// Returns a description of the failure when `raw` is not a valid
/// encoding of `field_type`.
pub fn decode_value(field_type: FieldType, raw: &[u8]) -> Result<FieldValue, String> {
    match field_type {
        FieldType::Text => std::str::from_utf8(raw)
            .map(|s| FieldValue::Text(s.to_owned()))
            .map_err(|e| e.to_string()),
        FieldType::Integer => be_i64(raw).map(FieldValue::Integer),
        FieldType::Boolean => match raw {
            [b] => Ok(FieldValue::Boolean(*b != 0)),
            _ => Err(format!("expected 1 byte, found {}", raw.len())),
        },
        FieldType::Uuid => RecordId::from_slice(raw)
            .map(FieldValue::Uuid)
            .map_err(|_| format!("expected 16 bytes, found {}", raw.len())),
        FieldType::Timestamp => {
            let millis = be_i64(raw)?;
            Timestamp::from_millis(millis)
                .map(FieldValue::Timestamp)
                .ok_or_else(|| format!("{millis} ms is out of range"))
        }
    }
}

fn be_i64(raw: &[u8]) -> Result<i64, String> {
    <[u8; 8]>::try_from(raw)
        .map(i64::from_be_bytes)
        .map_err(|_| format!("expected 8 bytes, found {}", raw.len()))
}

/// Schema-driven codec for one entity type.
#[derive(Debug, Clone, Copy)]
pub struct RecordCodec {
    descriptor: &'static EntityDescriptor,
}

impl RecordCodec {
    /// Creates a codec for the given entity type.
    #[must_use]
    pub const fn new(descriptor: &'static EntityDescriptor) -> Self {
        Self { descriptor }
    }

    /// Returns the descriptor this codec was built for.
    #[must_use]
    pub const fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    /// Produces the columns to write for `record`.
    ///
    /// Only fields declared in the write schema are emitted; the id field
    /// travels separately as the row key. Absent optional fields are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::MissingField` if a required field is absent and
    /// `CodecError::TypeMismatch` if a value has the wrong type.
    pub fn encode(&self, record: &Record) -> CodecResult<ColumnMap> {
        let entity = self.descriptor.name();
        let mut columns = ColumnMap::new();

        for spec in self.descriptor.schema().fields() {
            let Some(value) = record.get(spec.name()) else {
                if spec.is_required() {
                    return Err(CodecError::MissingField {
                        entity,
                        field: spec.name(),
                    });
                }
                continue;
            };

            if value.field_type() != spec.field_type() {
                return Err(CodecError::TypeMismatch {
                    entity,
                    field: spec.name(),
                    expected: spec.field_type(),
                    actual: value.field_type(),
                });
            }

            columns.insert(spec.name().to_owned(), encode_value(value));
        }

        Ok(columns)
    }

    /// Builds a record from a row key and its columns.
    ///
    /// The key becomes the id field. Declared fields are decoded from
    /// their columns; undeclared columns are ignored and absent optional
    /// fields are left unset.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::MissingField` if a required column is absent and
    /// `CodecError::Malformed` if a column does not parse.
    pub fn decode(&self, key: RecordId, columns: &ColumnMap) -> CodecResult<Record> {
        let entity = self.descriptor.name();
        let mut record = Record::new().with(self.descriptor.id_field(), key);

        for spec in self.descriptor.schema().fields() {
            let Some(raw) = columns.get(spec.name()) else {
                if spec.is_required() {
                    return Err(CodecError::MissingField {
                        entity,
                        field: spec.name(),
                    });
                }
                continue;
            };

            let value =
                decode_value(spec.field_type(), raw).map_err(|reason| CodecError::Malformed {
                    entity,
                    field: spec.name(),
                    expected: spec.field_type(),
                    reason,
                })?;
            record.set(spec.name(), value);
        }

        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{PHRASE_CARD, PHRASE_DECK};
    use proptest::prelude::*;

    fn card(deck: RecordId) -> Record {
        Record::new()
            .with("deck", deck)
            .with("term", "Banana")
            .with("description", "A yellow fruit")
            .with("order", 2_i64)
    }

    mod encode {
        use super::*;

        #[test]
        fn emits_declared_fields_only() {
            let codec = RecordCodec::new(&PHRASE_CARD);
            let record = card(RecordId::generate())
                .with("phrase_card_id", RecordId::generate())
                .with("score", 10_i64);

            let columns = codec.encode(&record).unwrap();
            let names: Vec<&str> = columns.keys().map(String::as_str).collect();
            assert_eq!(names, vec!["deck", "description", "order", "term"]);
        }

        #[test]
        fn integer_layout_is_big_endian() {
            let codec = RecordCodec::new(&PHRASE_CARD);
            let columns = codec.encode(&card(RecordId::generate())).unwrap();
            assert_eq!(columns["order"].as_ref(), &[0, 0, 0, 0, 0, 0, 0, 2]);
        }

        #[test]
        fn missing_required_field_fails() {
            let codec = RecordCodec::new(&PHRASE_DECK);
            let err = codec.encode(&Record::new().with("name", "Classics")).unwrap_err();
            assert_eq!(err.field(), "description");
            assert!(matches!(err, CodecError::MissingField { .. }));
        }

        #[test]
        fn wrong_type_fails() {
            let codec = RecordCodec::new(&PHRASE_CARD);
            let record = card(RecordId::generate()).with("order", "two");
            let err = codec.encode(&record).unwrap_err();
            assert_eq!(
                err,
                CodecError::TypeMismatch {
                    entity: "PhraseCard",
                    field: "order",
                    expected: FieldType::Integer,
                    actual: FieldType::Text,
                }
            );
        }
    }

    mod decode {
        use super::*;

        #[test]
        fn key_becomes_id_field() {
            let codec = RecordCodec::new(&PHRASE_CARD);
            let key = RecordId::generate();
            let columns = codec.encode(&card(RecordId::generate())).unwrap();

            let record = codec.decode(key, &columns).unwrap();
            assert_eq!(PHRASE_CARD.id_of(&record), Some(key));
        }

        #[test]
        fn missing_optional_field_is_omitted() {
            let codec = RecordCodec::new(&PHRASE_CARD);
            let columns = codec.encode(&card(RecordId::generate())).unwrap();

            let record = codec.decode(RecordId::generate(), &columns).unwrap();
            assert!(!record.contains("active"));
            assert!(!record.contains("created_at"));
        }

        #[test]
        fn missing_required_column_fails() {
            let codec = RecordCodec::new(&PHRASE_CARD);
            let mut columns = codec.encode(&card(RecordId::generate())).unwrap();
            columns.remove("term");

            let err = codec.decode(RecordId::generate(), &columns).unwrap_err();
            assert!(matches!(err, CodecError::MissingField { field: "term", .. }));
        }

        #[test]
        fn malformed_column_fails() {
            let codec = RecordCodec::new(&PHRASE_CARD);
            let mut columns = codec.encode(&card(RecordId::generate())).unwrap();
            columns.insert("order".to_owned(), Bytes::from_static(b"2"));

            let err = codec.decode(RecordId::generate(), &columns).unwrap_err();
            assert!(matches!(err, CodecError::Malformed { field: "order", .. }));
            assert!(err.to_string().contains("expected 8 bytes"));
        }

        #[test]
        fn undeclared_columns_are_ignored() {
            let codec = RecordCodec::new(&PHRASE_DECK);
            let mut columns = ColumnMap::new();
            columns.insert("name".to_owned(), Bytes::from_static(b"Classics"));
            columns.insert("description".to_owned(), Bytes::from_static(b"Old"));
            columns.insert("legacy".to_owned(), Bytes::from_static(b"\xff"));

            let record = codec.decode(RecordId::generate(), &columns).unwrap();
            assert_eq!(record.len(), 3);
            assert!(!record.contains("legacy"));
        }

        #[test]
        fn any_nonzero_byte_is_true() {
            assert_eq!(
                decode_value(FieldType::Boolean, &[7]),
                Ok(FieldValue::Boolean(true))
            );
            assert!(decode_value(FieldType::Boolean, &[]).is_err());
        }
    }

    fn arb_card() -> impl Strategy<Value = Record> {
        (
            any::<[u8; 16]>(),
            ".*",
            ".*",
            any::<i64>(),
            proptest::option::of(any::<bool>()),
            proptest::option::of(-8_000_000_000_000_i64..8_000_000_000_000_i64),
        )
            .prop_map(|(deck, term, description, order, active, created)| {
                let mut record = Record::new()
                    .with("deck", RecordId::new(uuid::Uuid::from_bytes(deck)))
                    .with("term", term)
                    .with("description", description)
                    .with("order", order);
                if let Some(active) = active {
                    record.set("active", active);
                }
                if let Some(ts) = created.and_then(Timestamp::from_millis) {
                    record.set("created_at", ts);
                }
                record
            })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(record in arb_card()) {
            let codec = RecordCodec::new(&PHRASE_CARD);
            let key = RecordId::generate();

            let columns = codec.encode(&record).unwrap();
            let decoded = codec.decode(key, &columns).unwrap();

            let expected = record.clone().with("phrase_card_id", key);
            prop_assert_eq!(decoded, expected);
        }
    }
}
