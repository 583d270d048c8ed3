//! Null rewrite oracle implementation.
//!
//! Used when no oracle is configured but the type system requires a
//! RewriteOracle implementation.

use async_trait::async_trait;

use super::rewrite_oracle::{RewriteOracle, RewriteRequest, RewriteSuggestion};
use crate::domain::errors::{DomainError, DomainResult};

/// An oracle that never has a suggestion.
#[derive(Debug, Clone, Default)]
pub struct NullRewriteOracle;

impl NullRewriteOracle {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RewriteOracle for NullRewriteOracle {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn rewrite(&self, _request: &RewriteRequest) -> DomainResult<RewriteSuggestion> {
        Err(DomainError::OracleUnavailable("no rewrite oracle configured".to_string()))
    }
}
