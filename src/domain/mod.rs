//! # Domain Layer
//!
//! Records, entity descriptors and value objects. Nothing in this layer
//! talks to the store or the network.

pub mod entities;
pub mod value_objects;
