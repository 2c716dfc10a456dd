//! # In-Memory Store
//!
//! In-memory [`ColumnFamilyStore`](super::ColumnFamilyStore) for tests
//! and database-free runs.
//!
//! ## Thread Safety
//!
//! Storage is an `Arc<RwLock<HashMap>>` shared between clones.

pub mod column_family_store;

pub use column_family_store::InMemoryColumnFamilyStore;
