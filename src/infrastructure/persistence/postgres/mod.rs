//! # PostgreSQL Store
//!
//! Column-family store backed by a single PostgreSQL table.

pub mod column_family_store;

pub use column_family_store::{PostgresColumnFamilyStore, PostgresStoreConfig};
