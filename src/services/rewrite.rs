//! Rewrite suggestions for overdue todos.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Todo;
use crate::domain::ports::{RewriteOracle, RewriteRequest, RewriteSuggestion};
use crate::services::missed_reason::{is_ai_eligible, pick_reflection_questions};

/// Inline message shown when the oracle cannot help.
pub const UNAVAILABLE_MESSAGE: &str = "Couldn't get a suggestion. Try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Todo is not overdue or its reason does not allow a rewrite
    NotEligible,
    Suggested(RewriteSuggestion),
    Unavailable { message: String },
}

struct CachedSuggestion {
    original_text: String,
    suggestion: RewriteSuggestion,
}

pub struct RewriteService<O: RewriteOracle + ?Sized> {
    oracle: Arc<O>,
    cache: RwLock<HashMap<String, CachedSuggestion>>,
}

impl<O: RewriteOracle + ?Sized> RewriteService<O> {
    pub fn new(oracle: Arc<O>) -> Self {
        Self {
            oracle,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Ask the oracle for a smaller version of an eligible todo.
    ///
    /// Oracle failures are logged and reported as `Unavailable`, never
    /// returned as errors.
    pub async fn suggest(&self, todo: &Todo, now: DateTime<Utc>) -> RewriteOutcome {
        let Some(reason) = todo.missed_reason.filter(|_| is_ai_eligible(todo, now)) else {
            return RewriteOutcome::NotEligible;
        };

        if let Some(cached) = self.cache.read().await.get(&todo.id) {
            if cached.original_text == todo.text {
                debug!(todo_id = %todo.id, "rewrite served from cache");
                return RewriteOutcome::Suggested(cached.suggestion.clone());
            }
        }

        let request = RewriteRequest {
            original_text: todo.text.clone(),
            reason,
            context_questions: pick_reflection_questions(&todo.id, reason),
        };

        match self.oracle.rewrite(&request).await {
            Ok(suggestion) => {
                self.cache.write().await.insert(
                    todo.id.clone(),
                    CachedSuggestion {
                        original_text: todo.text.clone(),
                        suggestion: suggestion.clone(),
                    },
                );
                RewriteOutcome::Suggested(suggestion)
            }
            Err(err) => {
                warn!(todo_id = %todo.id, oracle = self.oracle.name(), error = %err, "rewrite failed");
                RewriteOutcome::Unavailable {
                    message: UNAVAILABLE_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Replace the todo's text with the suggestion and drop its cached entry.
    pub async fn accept(&self, todo: &mut Todo, suggestion: &RewriteSuggestion) -> DomainResult<()> {
        if suggestion.rewritten_todo.trim().is_empty() {
            return Err(DomainError::ValidationFailed("Rewritten todo cannot be empty".to_string()));
        }
        todo.apply_rewrite(suggestion.rewritten_todo.trim());
        self.cache.write().await.remove(&todo.id);
        Ok(())
    }

    /// Drop any cached suggestion for a deleted todo.
    pub async fn forget(&self, todo_id: &str) -> bool {
        self.cache.write().await.remove(todo_id).is_some()
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}
