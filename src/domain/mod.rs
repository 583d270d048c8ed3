//! Domain layer for the habit-rhythm engine
//!
//! This module contains the core models, their pure state transitions,
//! and the port traits adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
