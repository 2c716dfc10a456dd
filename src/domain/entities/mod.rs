//! # Domain Entities
//!
//! Generic records and the descriptors that give them shape.
//!
//! - [`Record`]: field name → typed value
//! - [`EntityDescriptor`]: collection, id field, schema, wire allow-list
//! - [`EntityKind`]: phrase/nomination decks and cards

pub mod catalog;
pub mod descriptor;
pub mod record;

pub use catalog::{
    EntityKind, NOMINATION_CARD, NOMINATION_DECK, PHRASE_CARD, PHRASE_DECK,
    UnknownEntityKindError,
};
pub use descriptor::{EntityDescriptor, FieldSchema, FieldSpec, RandomSelection};
pub use record::Record;
