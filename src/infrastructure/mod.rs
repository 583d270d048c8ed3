//! Infrastructure layer module
//!
//! Configuration loading and logging setup. Storage and oracle adapters
//! live in [`crate::adapters`].

pub mod config;
pub mod logging;
