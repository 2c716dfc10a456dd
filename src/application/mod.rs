//! # Application Layer
//!
//! Use cases over the store and the mapping of records to the wire.
//!
//! - [`services`]: entity store clients and order pickers
//! - [`serializer`]: wire serializer and inbound validation
//! - [`schema`]: JSON Schema documents for the wire form
//! - [`error`]: the application error taxonomy

pub mod error;
pub mod schema;
pub mod serializer;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use serializer::{ValidationError, WireSerializer};
pub use services::{EntityClients, EntityStoreClient};
