//! Integration tests for neuromap-service.
//!
//! Spawns the real server on a random port with a scripted model client.

use neuromap_service::config::NeuromapConfig;
use neuromap_service::services::providers::mock::MockProvider;
use neuromap_service::startup::{AppState, Application, Providers};
use reqwest::Client;
use serde_json::json;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the application on a random port and return the port number.
async fn spawn_app(state: AppState) -> u16 {
    let mut common = CoreConfig::default();
    common.port = 0; // Random port
    let config =
        NeuromapConfig::from_lookup(common, |_| None).expect("Failed to build config");

    let app = Application::build_with_state(&config, state)
        .await
        .expect("Failed to build application");

    let port = app.port();

    // Spawn the server in the background
    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    port
}

#[tokio::test]
async fn health_check_returns_ok() {
    let port = spawn_app(AppState::default()).await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "neuromap-service");
}

#[tokio::test]
async fn chat_round_trip_over_http() {
    let provider = Arc::new(MockProvider::replying("The heart has four chambers."));
    let port = spawn_app(AppState::new(Some(Providers::shared(provider.clone())))).await;

    let response = Client::new()
        .post(format!("http://127.0.0.1:{}/api/chat", port))
        .json(&json!({"message": "How many chambers does the heart have?"}))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["response"], "The heart has four chambers.");
    assert_eq!(provider.calls(), 1);
}
