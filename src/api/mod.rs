//! # API Layer
//!
//! External interfaces of the service.
//!
//! - [`rest`]: REST endpoints using axum

pub mod rest;
