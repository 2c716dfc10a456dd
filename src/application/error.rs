//! # Application Errors
//!
//! Error types for the application layer.
//!
//! Every failure surfaced by the entity store clients and the wire
//! serializer is an [`ApplicationError`]. Lower-layer errors convert into
//! it through `From`, so nothing is swallowed on the way up.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── InvalidId(InvalidIdError)       - malformed UUID input
//! ├── Validation(ValidationError)     - inbound payload missing/invalid fields
//! ├── NotFound { .. }                 - absent key or empty scan
//! ├── Unsupported(String)             - operation not defined for the entity
//! ├── Codec(CodecError)               - row cannot be decoded / record encoded
//! └── StoreUnavailable(String)        - transport or connection failure
//! ```
//!
//! # Examples
//!
//! ```
//! use rememerme_cards::application::error::ApplicationError;
//!
//! let err = ApplicationError::not_found("PhraseCard", "8a7c6e3c-0000-7000-8000-000000000000");
//! assert!(err.is_not_found());
//! ```

use crate::application::serializer::ValidationError;
use crate::domain::value_objects::InvalidIdError;
use crate::infrastructure::persistence::{CodecError, StoreError};
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The identifier is not a UUID.
    #[error(transparent)]
    InvalidId(#[from] InvalidIdError),

    /// Inbound payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// The operation is not defined for this entity type.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A record could not be encoded or a stored row could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The store could not be reached or rejected the request.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ApplicationError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates an unsupported operation error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Creates a store unavailable error.
    #[must_use]
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is an invalid id error.
    #[must_use]
    pub fn is_invalid_id(&self) -> bool {
        matches!(self, Self::InvalidId(_))
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an unsupported operation error.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Returns true if the store could not serve the request.
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Returns a stable machine-readable code for the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId(_) => "INVALID_ID",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unsupported(_) => "UNSUPPORTED",
            Self::Codec(_) => "CODEC_ERROR",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::KeyNotFound { collection, key } => {
                Self::not_found(collection, key.to_string())
            }
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{FieldType, RecordId};

    #[test]
    fn not_found() {
        let err = ApplicationError::not_found("PhraseDeck", "deck-123");
        assert!(err.to_string().contains("PhraseDeck"));
        assert!(err.to_string().contains("deck-123"));
        assert!(err.is_not_found());
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn from_invalid_id() {
        let err: ApplicationError = InvalidIdError::new("not-a-uuid").into();
        assert!(err.is_invalid_id());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("not-a-uuid"));
    }

    #[test]
    fn from_validation_error() {
        let validation = ValidationError::new(vec!["term".to_owned()], vec!["order".to_owned()]);
        let err: ApplicationError = validation.into();
        assert!(err.is_validation());
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn from_codec_error() {
        let codec = CodecError::TypeMismatch {
            entity: "PhraseCard",
            field: "order",
            expected: FieldType::Integer,
            actual: FieldType::Text,
        };
        let err: ApplicationError = codec.into();
        assert_eq!(err.code(), "CODEC_ERROR");
        assert!(err.to_string().contains("order"));
    }

    #[test]
    fn key_not_found_becomes_not_found() {
        let key = RecordId::generate();
        let err: ApplicationError = StoreError::key_not_found("phrase_card", key).into();
        assert!(err.is_not_found());
        assert!(err.to_string().contains(&key.to_string()));
    }

    #[test]
    fn transport_failure_becomes_store_unavailable() {
        let err: ApplicationError = StoreError::unavailable("connection refused").into();
        assert!(err.is_store_unavailable());
        assert!(err.to_string().contains("connection refused"));

        let err: ApplicationError = StoreError::query("syntax error").into();
        assert!(err.is_store_unavailable());
    }

    #[test]
    fn unsupported() {
        let err = ApplicationError::unsupported("PhraseDeck has no random selection");
        assert!(err.is_unsupported());
        assert_eq!(err.code(), "UNSUPPORTED");
    }
}
