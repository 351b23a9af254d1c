//! Application startup and lifecycle management.

use crate::config::NeuromapConfig;
use crate::error::ServiceError;
use crate::handlers;
use crate::services::providers::gemini::{self, GeminiConfig, GeminiProvider};
use crate::services::{ContentProvider, ProviderError};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, request_span, security_headers_middleware,
};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Four base64 photographs comfortably fit.
const LABEL_BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Model clients, constructed once at startup and shared by every request.
#[derive(Clone)]
pub struct Providers {
    pub text: Arc<dyn ContentProvider>,
    pub vision: Arc<dyn ContentProvider>,
}

impl Providers {
    /// One client for every use case.
    pub fn shared(provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            text: provider.clone(),
            vision: provider,
        }
    }

    /// Gemini clients for the configured models, or `None` without credentials.
    pub fn from_config(config: &NeuromapConfig) -> Result<Option<Self>, ProviderError> {
        let Some(api_key) = config.google.api_key.clone() else {
            return Ok(None);
        };

        let text_config = GeminiConfig {
            api_key,
            model: config.models.text_model.clone(),
            api_base: config.google.api_base.clone(),
            timeout: config.google.request_timeout,
        };
        let vision_config = GeminiConfig {
            model: config.models.vision_model.clone(),
            ..text_config.clone()
        };

        let client = gemini::http_client(config.google.request_timeout)?;
        let text = GeminiProvider::with_client(text_config, client.clone());
        let vision = GeminiProvider::with_client(vision_config, client);

        Ok(Some(Self {
            text: Arc::new(text),
            vision: Arc::new(vision),
        }))
    }
}

/// Shared application state.
#[derive(Clone, Default)]
pub struct AppState {
    providers: Option<Providers>,
}

impl AppState {
    pub fn new(providers: Option<Providers>) -> Self {
        Self { providers }
    }

    pub fn is_configured(&self) -> bool {
        self.providers.is_some()
    }

    pub fn text_provider(&self) -> Result<Arc<dyn ContentProvider>, ServiceError> {
        self.providers
            .as_ref()
            .map(|p| p.text.clone())
            .ok_or(ServiceError::Configuration)
    }

    pub fn vision_provider(&self) -> Result<Arc<dyn ContentProvider>, ServiceError> {
        self.providers
            .as_ref()
            .map(|p| p.vision.clone())
            .ok_or(ServiceError::Configuration)
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/quiz", post(handlers::generate_quiz))
        .route(
            "/api/label",
            post(handlers::label_organ).layer(DefaultBodyLimit::max(LABEL_BODY_LIMIT_BYTES)),
        )
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .merge(api)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build from configuration, creating Gemini clients when a key is present.
    pub async fn build(config: NeuromapConfig) -> Result<Self, AppError> {
        let providers = Providers::from_config(&config)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        match &providers {
            Some(_) => tracing::info!(
                text_model = %config.models.text_model,
                vision_model = %config.models.vision_model,
                "Initialized Gemini providers"
            ),
            None => tracing::warn!(
                "GEMINI_API_KEY not found; model-backed endpoints will report a configuration error"
            ),
        }

        Self::build_with_state(&config, AppState::new(providers)).await
    }

    /// Build around an existing state, e.g. one holding mock providers.
    pub async fn build_with_state(
        config: &NeuromapConfig,
        state: AppState,
    ) -> Result<Self, AppError> {
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, build_router(state))
            .with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
