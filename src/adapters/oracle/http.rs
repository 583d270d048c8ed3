//! HTTP rewrite oracle.
//!
//! Posts the todo text, the missed reason and the reflection questions to
//! `{base_url}/rewrite` and expects a `{condition_message, rewritten_todo}`
//! JSON body back. Any OpenAI-style gateway that exposes that route works.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::OracleConfig;
use crate::domain::ports::{RewriteOracle, RewriteRequest, RewriteSuggestion};

pub const API_KEY_ENV_VAR: &str = "HABIT_RHYTHM_ORACLE_API_KEY";

fn api_key(config: &OracleConfig) -> DomainResult<String> {
    config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| std::env::var(API_KEY_ENV_VAR).ok())
        .ok_or_else(|| {
            DomainError::OracleUnavailable(format!(
                "API key not set. Set {API_KEY_ENV_VAR} or configure oracle.api_key."
            ))
        })
}

pub struct HttpRewriteOracle {
    config: OracleConfig,
    client: Arc<reqwest::Client>,
}

impl HttpRewriteOracle {
    pub fn new(config: OracleConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::OracleUnavailable(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }
}

#[derive(Serialize)]
struct RewriteBody<'a> {
    model: &'a str,
    original_text: &'a str,
    reason: &'a str,
    questions: &'a [String],
}

#[derive(Deserialize)]
struct RewriteResponse {
    condition_message: String,
    rewritten_todo: String,
}

#[async_trait]
impl RewriteOracle for HttpRewriteOracle {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn rewrite(&self, request: &RewriteRequest) -> DomainResult<RewriteSuggestion> {
        let api_key = api_key(&self.config)?;
        let url = format!("{}/rewrite", self.config.base_url.trim_end_matches('/'));

        let body = RewriteBody {
            model: &self.config.model,
            original_text: &request.original_text,
            reason: request.reason.as_str(),
            questions: &request.context_questions,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::OracleUnavailable(format!("Rewrite request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(DomainError::OracleUnavailable(format!("Rewrite API returned {status}: {text}")));
        }

        let parsed: RewriteResponse = response
            .json()
            .await
            .map_err(|e| DomainError::SerializationError(format!("Failed to parse rewrite response: {e}")))?;

        let rewritten_todo = parsed.rewritten_todo.trim().to_string();
        if rewritten_todo.is_empty() {
            return Err(DomainError::OracleUnavailable("Rewrite API returned an empty todo".to_string()));
        }

        Ok(RewriteSuggestion {
            condition_message: parsed.condition_message.trim().to_string(),
            rewritten_todo,
        })
    }
}
