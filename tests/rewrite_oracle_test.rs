/// Integration tests for the HTTP rewrite oracle
///
/// Runs the oracle against a mock server, both directly and through the
/// rewrite service that turns failures into an inline message.
use chrono::{Duration, Utc};
use habit_rhythm::adapters::oracle::http::API_KEY_ENV_VAR;
use habit_rhythm::adapters::oracle::{oracle_from_config, HttpRewriteOracle};
use habit_rhythm::domain::models::OracleConfig;
use habit_rhythm::domain::ports::{RewriteOracle, RewriteRequest};
use habit_rhythm::services::{pick_reflection_questions, RewriteOutcome, RewriteService, UNAVAILABLE_MESSAGE};
use habit_rhythm::{DomainError, MissedReason, Todo};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;

fn oracle_config(base_url: String) -> OracleConfig {
    OracleConfig {
        enabled: true,
        base_url,
        api_key: Some("test-key".to_string()),
        timeout_secs: 5,
        ..OracleConfig::default()
    }
}

fn overdue_todo(reason: MissedReason) -> Todo {
    let mut todo = Todo::new("Write the quarterly report")
        .with_id("todo-42")
        .with_due_at(Utc::now() - Duration::hours(3));
    todo.missed_reason = Some(reason);
    todo
}

fn suggestion_body() -> String {
    json!({
        "condition_message": "Big tasks are easier to start when they are small.",
        "rewritten_todo": "  Outline three headings for the report  "
    })
    .to_string()
}

#[tokio::test]
async fn test_rewrite_success_with_mock() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rewrite")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "original_text": "Write the quarterly report",
            "reason": "hard_to_start"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(suggestion_body())
        .create_async()
        .await;

    let oracle = HttpRewriteOracle::new(oracle_config(server.url())).unwrap();
    let request = RewriteRequest {
        original_text: "Write the quarterly report".to_string(),
        reason: MissedReason::HardToStart,
        context_questions: pick_reflection_questions("todo-42", MissedReason::HardToStart),
    };

    let suggestion = oracle.rewrite(&request).await.unwrap();
    assert_eq!(suggestion.rewritten_todo, "Outline three headings for the report");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_becomes_inline_message() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rewrite")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let service = RewriteService::new(oracle_from_config(&oracle_config(server.url())).unwrap());
    let outcome = service.suggest(&overdue_todo(MissedReason::NotEnoughTime), Utc::now()).await;

    assert_eq!(
        outcome,
        RewriteOutcome::Unavailable {
            message: UNAVAILABLE_MESSAGE.to_string()
        }
    );
    assert_eq!(service.cached_count().await, 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_rewrite_is_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/rewrite")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"condition_message": "ok", "rewritten_todo": "   "}).to_string())
        .create_async()
        .await;

    let oracle = HttpRewriteOracle::new(oracle_config(server.url())).unwrap();
    let request = RewriteRequest {
        original_text: "Call the bank".to_string(),
        reason: MissedReason::HardToStart,
        context_questions: Vec::new(),
    };

    assert!(matches!(
        oracle.rewrite(&request).await,
        Err(DomainError::OracleUnavailable(_))
    ));
}

#[tokio::test]
async fn test_accepting_suggestion_rewrites_todo() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rewrite")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(suggestion_body())
        .expect(1)
        .create_async()
        .await;

    let oracle: Arc<dyn RewriteOracle> = Arc::new(HttpRewriteOracle::new(oracle_config(server.url())).unwrap());
    let service = RewriteService::new(oracle);
    let mut todo = overdue_todo(MissedReason::HardToStart);

    let RewriteOutcome::Suggested(suggestion) = service.suggest(&todo, Utc::now()).await else {
        panic!("expected a suggestion");
    };
    // Served from cache, no second request
    assert_eq!(
        service.suggest(&todo, Utc::now()).await,
        RewriteOutcome::Suggested(suggestion.clone())
    );

    service.accept(&mut todo, &suggestion).await.unwrap();
    assert_eq!(todo.text, "Outline three headings for the report");
    assert!(todo.missed_reason.is_none());
    assert_eq!(service.suggest(&todo, Utc::now()).await, RewriteOutcome::NotEligible);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rest_reason_never_reaches_server() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/rewrite").expect(0).create_async().await;

    let service = RewriteService::new(oracle_from_config(&oracle_config(server.url())).unwrap());
    let outcome = service.suggest(&overdue_todo(MissedReason::WantToRest), Utc::now()).await;

    assert_eq!(outcome, RewriteOutcome::NotEligible);
    mock.assert_async().await;
}

#[test]
fn test_missing_api_key_is_unavailable() {
    let config = OracleConfig {
        api_key: None,
        ..oracle_config("http://127.0.0.1:9".to_string())
    };
    let request = RewriteRequest {
        original_text: "Stretch".to_string(),
        reason: MissedReason::HardToStart,
        context_questions: Vec::new(),
    };

    let result = temp_env::with_var_unset(API_KEY_ENV_VAR, || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let oracle = HttpRewriteOracle::new(config).unwrap();
            oracle.rewrite(&request).await
        })
    });

    match result {
        Err(DomainError::OracleUnavailable(message)) => assert!(message.contains(API_KEY_ENV_VAR)),
        other => panic!("expected missing key error, got {other:?}"),
    }
}
