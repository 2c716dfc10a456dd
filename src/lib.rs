//! # Rememerme Cards
//!
//! Deck and card persistence for a party card game over a column-family
//! store.
//!
//! Four entity types (phrase decks, phrase cards, nomination decks and
//! nomination cards) share one descriptor-driven implementation:
//!
//! - [`domain`]: records, entity descriptors and value objects
//! - [`infrastructure`]: the store port, its backends, the record codec
//!   and tracing setup
//! - [`application`]: per-entity store clients, the wire serializer and
//!   the error taxonomy
//! - [`api`]: REST endpoints
//! - [`config`]: layered settings
//!
//! # Example
//!
//! ```
//! use rememerme_cards::application::EntityClients;
//! use rememerme_cards::domain::entities::{EntityKind, Record};
//! use rememerme_cards::infrastructure::persistence::in_memory::InMemoryColumnFamilyStore;
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let clients = EntityClients::new(Arc::new(InMemoryColumnFamilyStore::new()));
//! let deck = clients
//!     .get(EntityKind::PhraseDeck)
//!     .insert(Record::new().with("name", "Classics").with("description", "The originals"))
//!     .await
//!     .unwrap();
//! assert!(deck.contains("deck_id"));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
