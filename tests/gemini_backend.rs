//! Mock HTTP server tests for `GeminiBackend::generate()` and failover over HTTP.
//!
//! Coverage:
//! - Successful generation, request shape and API key header
//! - 429 quota exhaustion aborting the failover pass
//! - 404 model not found skipped in favour of the next candidate
//! - 500 server error, malformed JSON, empty candidates
//! - Per-candidate timeout

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ats_analyzer::error::AtsError;
use ats_analyzer::llm::backend::{BackendError, GenerationBackend, ModelCandidate};
use ats_analyzer::llm::failover::FailoverClient;
use ats_analyzer::llm::gemini::{GeminiBackend, GeminiSettings};

const API_KEY: &str = "test-key";

fn backend(server: &MockServer) -> GeminiBackend {
    backend_with_timeout(server, Duration::from_secs(5))
}

fn backend_with_timeout(server: &MockServer, timeout: Duration) -> GeminiBackend {
    GeminiBackend::with_api_key(
        GeminiSettings {
            base_url: server.uri(),
            api_key_env: "ATS_ANALYZER_MOCK_UNUSED_KEY".into(),
            timeout,
        },
        API_KEY.into(),
    )
}

fn endpoint(model: &str) -> String {
    format!("/models/{}:generateContent", model)
}

fn text_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    })
}


#[tokio::test]
async fn generate_success_sends_prompt_and_config() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("gemini-2.5-pro")))
        .and(header("x-goog-api-key", API_KEY))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "parts": [{ "text": "Analyze this" }] }],
            "generationConfig": { "topK": 40, "maxOutputTokens": 2048 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ATS Score: 77%")))
        .expect(1)
        .mount(&server)
        .await;

    let text = backend(&server)
        .generate(&ModelCandidate::new("gemini-2.5-pro"), "Analyze this")
        .await
        .unwrap();

    assert_eq!(text, "ATS Score: 77%");
}

#[tokio::test]
async fn multiple_parts_are_concatenated() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": "ATS Score: " }, { "text": "61%" }] }
        }]
    });

    Mock::given(method("POST"))
        .and(path(endpoint("m")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let text = backend(&server)
        .generate(&ModelCandidate::new("m"), "prompt")
        .await
        .unwrap();
    assert_eq!(text, "ATS Score: 61%");
}

#[tokio::test]
async fn rate_limit_is_quota_exceeded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("m")))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate(&ModelCandidate::new("m"), "prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::QuotaExceeded(_)), "got: {err}");
}

#[tokio::test]
async fn unknown_model_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("gemini-9")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": 404, "message": "models/gemini-9 is not found", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate(&ModelCandidate::new("gemini-9"), "prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::ModelNotFound(_)), "got: {err}");
}

#[tokio::test]
async fn server_error_is_request_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("m")))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate(&ModelCandidate::new("m"), "prompt")
        .await
        .unwrap_err();
    match err {
        BackendError::RequestFailed(msg) => assert!(msg.contains("500"), "{msg}"),
        other => panic!("expected RequestFailed, got: {other}"),
    }
}

#[tokio::test]
async fn malformed_json_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("m")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate(&ModelCandidate::new("m"), "prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::InvalidResponse(_)), "got: {err}");
}

#[tokio::test]
async fn empty_candidates_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("m")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate(&ModelCandidate::new("m"), "prompt")
        .await
        .unwrap_err();
    assert_eq!(err, BackendError::EmptyResponse);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("m")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response("too late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = backend_with_timeout(&server, Duration::from_millis(100))
        .generate(&ModelCandidate::new("m"), "prompt")
        .await
        .unwrap_err();
    assert_eq!(err, BackendError::Timeout);
}


fn client(server: &MockServer, models: &[&str]) -> FailoverClient {
    FailoverClient::new(
        Arc::new(backend(server)),
        models.iter().map(|m| ModelCandidate::new(m)).collect(),
    )
}

#[tokio::test]
async fn failover_skips_missing_model_and_never_calls_later_ones() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("a")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(endpoint("b")))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ATS Score: 70%")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(endpoint("c")))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let generation = client(&server, &["a", "b", "c"])
        .call_online("prompt")
        .await
        .unwrap();

    assert_eq!(generation.text, "ATS Score: 70%");
    assert_eq!(generation.candidate, "b");
}

#[tokio::test]
async fn failover_aborts_on_quota() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("a")))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(endpoint("b")))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, &["a", "b"])
        .call_online("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, AtsError::QuotaExceeded(_)), "got: {err}");
}

#[tokio::test]
async fn failover_exhausts_all_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint("a")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(endpoint("b")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client(&server, &["a", "b"])
        .call_online("prompt")
        .await
        .unwrap_err();
    match err {
        AtsError::AllCandidatesExhausted { attempts } => assert_eq!(attempts.len(), 2),
        other => panic!("expected AllCandidatesExhausted, got: {other}"),
    }
}
