//! # REST API
//!
//! REST endpoints using axum for deck and card storage.
//!
//! # Endpoints
//!
//! ## Records
//! - `POST /api/v1/{kind}` - Create a record, generating its id when absent
//! - `GET /api/v1/{kind}/{id}` - Get a record by id
//! - `GET /api/v1/{kind}/random?deck={deck_id}` - Pick a random card from a deck
//!
//! `{kind}` is `phrase-decks`, `phrase-cards`, `nomination-decks` or
//! `nomination-cards`.
//!
//! ## Health
//! - `GET /api/v1/health` - Health check endpoint
//!
//! # Errors
//!
//! Failures return `{ "error": code, "message": text, "fields": [..] }`,
//! with `fields` present only for validation failures.
//!
//! | error               | status |
//! |---------------------|--------|
//! | `INVALID_ID`        | 400    |
//! | `VALIDATION_ERROR`  | 400    |
//! | `UNSUPPORTED`       | 400    |
//! | `NOT_FOUND`         | 404    |
//! | `CODEC_ERROR`       | 500    |
//! | `STORE_UNAVAILABLE` | 503    |
//!
//! # Usage
//!
//! ```ignore
//! use rememerme_cards::api::rest::{create_router, AppState};
//! use rememerme_cards::application::EntityClients;
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(EntityClients::new(store)));
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AppState, ErrorResponse, HealthResponse, RandomQuery};
pub use routes::create_router;
