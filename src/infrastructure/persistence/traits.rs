//! # Store Traits
//!
//! Port definition for the column-family store.
//!
//! The store is an opaque key-value service. Each collection (column
//! family) holds rows addressed by a single UUID key, and every row is a
//! map of column name to raw bytes. Three operations are required:
//!
//! - point lookup of one row
//! - point write of one row
//! - filtered scan over equality predicates on secondary-indexed columns,
//!   capped to a row count
//!
//! # Examples
//!
//! ```ignore
//! use rememerme_cards::infrastructure::persistence::{ColumnFamilyStore, IndexClause, IndexExpression};
//!
//! async fn first_in_deck(store: &impl ColumnFamilyStore, deck: bytes::Bytes) {
//!     let clause = IndexClause::new(vec![IndexExpression::eq("deck", deck)], 1).unwrap();
//!     let rows = store.get_indexed_slices("phrase_card", &clause).await.unwrap();
//!     println!("matched {} rows", rows.len());
//! }
//! ```

use crate::domain::value_objects::RecordId;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Column name → raw column value for one row.
pub type ColumnMap = BTreeMap<String, Bytes>;

/// One row returned by a scan.
pub type KeyedRow = (RecordId, ColumnMap);

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row exists for the key.
    #[error("Key not found: {collection} has no row {key}")]
    KeyNotFound {
        /// Collection name.
        collection: String,
        /// Row key.
        key: RecordId,
    },

    /// The store could not be reached or the connection failed.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the request.
    #[error("Query error: {0}")]
    Query(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a key not found error.
    #[must_use]
    pub fn key_not_found(collection: impl Into<String>, key: RecordId) -> Self {
        Self::KeyNotFound {
            collection: collection.into(),
            key,
        }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is a key not found error.
    #[must_use]
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    /// Returns true if this is an unavailable error.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Equality predicate on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpression {
    column: String,
    value: Bytes,
}

impl IndexExpression {
    /// Matches rows whose `column` equals `value` byte-for-byte.
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Returns the column name.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the encoded value.
    #[must_use]
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Returns true if `columns` satisfies this predicate.
    #[must_use]
    pub fn matches(&self, columns: &ColumnMap) -> bool {
        columns.get(&self.column) == Some(&self.value)
    }
}

/// A conjunction of index expressions with a row cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexClause {
    expressions: Vec<IndexExpression>,
    count: usize,
}

impl IndexClause {
    /// Creates a clause returning at most `count` rows matching every expression.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Query` if `expressions` is empty or `count` is zero.
    pub fn new(expressions: Vec<IndexExpression>, count: usize) -> StoreResult<Self> {
        if expressions.is_empty() {
            return Err(StoreError::query(
                "index clause requires at least one expression",
            ));
        }
        if count == 0 {
            return Err(StoreError::query("index clause count must be positive"));
        }
        Ok(Self { expressions, count })
    }

    /// Returns the expressions.
    #[must_use]
    pub fn expressions(&self) -> &[IndexExpression] {
        &self.expressions
    }

    /// Returns the row cap.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns true if `columns` satisfies every expression.
    #[must_use]
    pub fn matches(&self, columns: &ColumnMap) -> bool {
        self.expressions.iter().all(|e| e.matches(columns))
    }
}

/// Column-family store shared by every entity client.
///
/// One handle is opened at startup, shared for the process lifetime and
/// closed at shutdown. Writes are last-write-wins per column.
#[async_trait]
pub trait ColumnFamilyStore: Send + Sync + fmt::Debug {
    /// Reads every column of one row.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::KeyNotFound` if the row has no columns, or
    /// `StoreError::Unavailable` on transport failure.
    async fn get(&self, collection: &str, key: &RecordId) -> StoreResult<ColumnMap>;

    /// Writes the given columns to one row, replacing existing values.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` on transport failure.
    async fn insert(&self, collection: &str, key: &RecordId, columns: ColumnMap)
    -> StoreResult<()>;

    /// Returns up to `clause.count()` rows matching every expression.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` on transport failure.
    async fn get_indexed_slices(
        &self,
        collection: &str,
        clause: &IndexClause,
    ) -> StoreResult<Vec<KeyedRow>>;

    /// Releases the underlying connections.
    async fn close(&self) {}
}
