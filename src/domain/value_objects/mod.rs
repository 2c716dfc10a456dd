//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! - [`RecordId`]: UUID primary key, with [`ToRecordId`] normalization
//! - [`Timestamp`]: millisecond-precision UTC instant
//! - [`FieldValue`] / [`FieldType`]: typed record values and their schema types

pub mod field_value;
pub mod ids;
pub mod timestamp;

pub use field_value::{FieldType, FieldValue};
pub use ids::{InvalidIdError, RecordId, ToRecordId};
pub use timestamp::Timestamp;
