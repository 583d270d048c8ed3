//! Text-rewrite oracle port.
//!
//! The oracle turns an overdue todo into a smaller, easier-to-start one.
//! It is optional and unreliable by nature: callers map every failure to
//! "no suggestion available".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::MissedReason;

/// Structured input for a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub original_text: String,
    pub reason: MissedReason,
    /// Reflection questions shown to the user, if any
    #[serde(default)]
    pub context_questions: Vec<String>,
}

/// Structured output of a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSuggestion {
    /// Short acknowledgement of the user's situation
    pub condition_message: String,
    pub rewritten_todo: String,
}

#[async_trait]
pub trait RewriteOracle: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Request a rewrite.
    async fn rewrite(&self, request: &RewriteRequest) -> DomainResult<RewriteSuggestion>;
}
