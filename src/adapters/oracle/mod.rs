//! Rewrite oracle adapters.

pub mod http;

pub use http::HttpRewriteOracle;

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::OracleConfig;
use crate::domain::ports::{NullRewriteOracle, RewriteOracle};

/// Build the configured oracle, or the null oracle when disabled.
pub fn oracle_from_config(config: &OracleConfig) -> DomainResult<Arc<dyn RewriteOracle>> {
    if config.enabled {
        Ok(Arc::new(HttpRewriteOracle::new(config.clone())?))
    } else {
        Ok(Arc::new(NullRewriteOracle::new()))
    }
}
