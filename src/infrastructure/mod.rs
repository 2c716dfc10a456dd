//! # Infrastructure Layer
//!
//! Adapters to the outside world: the column-family store backends and
//! the tracing subscriber.

pub mod persistence;
pub mod telemetry;
