//! Adapters for storage and the rewrite oracle.

pub mod memory;
pub mod oracle;
pub mod sqlite;
