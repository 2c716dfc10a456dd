//! # Record Identifiers
//!
//! UUID-based identifier shared by every entity type.
//!
//! Identifiers arrive from callers as strings in any of the textual UUID
//! forms (hyphenated, simple, braced or URN) or as already-typed values.
//! [`ToRecordId`] normalizes all of them to a [`RecordId`], whose display
//! form is always the canonical 36-character hyphenated lowercase string.
//!
//! # Examples
//!
//! ```
//! use rememerme_cards::domain::value_objects::{RecordId, ToRecordId};
//!
//! let id = "{67E55044-10B1-426F-9247-BB680E5FE0C8}".to_record_id().unwrap();
//! assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
//!
//! assert!("not-a-uuid".to_record_id().is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// The input could not be interpreted as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid id: {input:?} is not a valid UUID")]
pub struct InvalidIdError {
    input: String,
}

impl InvalidIdError {
    /// Creates an error for the rejected input.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Primary key of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Wraps an existing UUID.
    #[inline]
    #[must_use]
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generates a fresh time-ordered (v7) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses any textual UUID form.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdError`] if `s` is not a UUID.
    pub fn parse(s: &str) -> Result<Self, InvalidIdError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| InvalidIdError::new(s))
    }

    /// Builds an identifier from its 16 raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdError`] if `bytes` is not exactly 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, InvalidIdError> {
        Uuid::from_slice(bytes)
            .map(Self)
            .map_err(|_| InvalidIdError::new(format!("{bytes:02x?}")))
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the 16 raw bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Returns true for the all-zero UUID.
    #[inline]
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecordId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RecordId> for Uuid {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// Conversion of caller-supplied identifiers into a [`RecordId`].
pub trait ToRecordId {
    /// Normalizes `self` to a record id.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdError`] if `self` is not a UUID.
    fn to_record_id(&self) -> Result<RecordId, InvalidIdError>;
}

impl ToRecordId for RecordId {
    fn to_record_id(&self) -> Result<RecordId, InvalidIdError> {
        Ok(*self)
    }
}

impl ToRecordId for Uuid {
    fn to_record_id(&self) -> Result<RecordId, InvalidIdError> {
        Ok(RecordId(*self))
    }
}

impl ToRecordId for str {
    fn to_record_id(&self) -> Result<RecordId, InvalidIdError> {
        RecordId::parse(self)
    }
}

impl ToRecordId for String {
    fn to_record_id(&self) -> Result<RecordId, InvalidIdError> {
        RecordId::parse(self)
    }
}

impl<T: ToRecordId + ?Sized> ToRecordId for &T {
    fn to_record_id(&self) -> Result<RecordId, InvalidIdError> {
        (**self).to_record_id()
    }
}
