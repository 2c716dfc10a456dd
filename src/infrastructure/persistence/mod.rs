//! # Persistence Layer
//!
//! The column-family store port, its backends, and the record codec.
//!
//! ## Store Trait (Port)
//!
//! - [`ColumnFamilyStore`]: point get, point insert, indexed scan
//!
//! ## Implementations
//!
//! - `in_memory`: in-process store for tests and database-free runs
//! - `postgres`: PostgreSQL-backed store using sqlx
//!
//! ## Codec
//!
//! - [`RecordCodec`]: record ↔ column map, driven by an entity descriptor

pub mod codec;
pub mod in_memory;
pub mod postgres;
pub mod traits;

pub use codec::{CodecError, CodecResult, RecordCodec};
pub use traits::{
    ColumnFamilyStore, ColumnMap, IndexClause, IndexExpression, KeyedRow, StoreError,
    StoreResult,
};
