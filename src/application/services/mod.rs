//! # Application Services
//!
//! Services that orchestrate the codec and the store.
//!
//! This module provides application-level services including:
//! - [`EntityStoreClient`]: get by id, insert and random selection for one entity type
//! - [`EntityClients`]: one client per entity kind over a shared store
//! - [`OrderPicker`]: sources of the order value drawn by random selection

pub mod entity_client;
pub mod order_picker;

pub use entity_client::{EntityClients, EntityStoreClient};
pub use order_picker::{FixedOrderPicker, OrderPicker, ThreadRngOrderPicker};
