//! Gemini adapter tests against a local HTTP stub.

use neuromap_service::services::providers::gemini::{GeminiConfig, GeminiProvider};
use neuromap_service::services::{ContentProvider, Prompt, ProviderError};
use secrecy::Secret;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const GENERATE_PATH: &str = "/models/gemini-test:generateContent";

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(GeminiConfig {
        api_key: Secret::new("test-key".to_string()),
        model: MODEL.to_string(),
        api_base: server.uri(),
        timeout: Some(Duration::from_secs(5)),
    })
    .expect("Failed to create provider")
}

fn reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
    })
}

#[tokio::test]
async fn sends_prompt_parts_and_returns_reply_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Four chambers.")))
        .expect(1)
        .mount(&server)
        .await;

    let prompt = Prompt::builder()
        .text("How many chambers?")
        .image("image/png", vec![1, 2, 3])
        .build();
    let answer = provider(&server).generate(&prompt).await.unwrap();

    assert_eq!(answer.text(), "Four chambers.");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "How many chambers?");
    assert_eq!(
        body["contents"][0]["parts"][1]["inlineData"],
        json!({"mimeType": "image/png", "data": "AQID"})
    );
}

#[tokio::test]
async fn invalid_key_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&Prompt::text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Auth(_)));
}

#[tokio::test]
async fn rate_limiting_is_reported_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&Prompt::text("hi"))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::RateLimited);
}

#[tokio::test]
async fn server_errors_are_transport_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&Prompt::text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Transport(msg) if msg.contains("overloaded")));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let server = MockServer::start().await;
    let provider = provider(&server);
    drop(server);

    let err = provider.generate(&Prompt::text("hi")).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn empty_candidates_are_invalid_responses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
        )
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&Prompt::text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(msg) if msg.contains("SAFETY")));
}
