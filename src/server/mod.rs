//! HTTP surface: router construction and the server loop.

pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::settings::ServerSettings;
use crate::engine::game_service::GameService;
use crate::server::handlers::{generate_story, health_check, status, ApiState};

/// Build the application router. CORS allows only `allowed_origin`, GET and
/// POST, and the `Content-Type` header.
pub fn router(service: Arc<GameService>, allowed_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin)
        .with_context(|| format!("invalid allowed origin '{}'", allowed_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let state = Arc::new(ApiState { service });

    Ok(Router::new()
        .route("/", get(status).post(generate_story))
        .route("/api/story", post(generate_story))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub struct ApiServer {
    settings: ServerSettings,
    service: Arc<GameService>,
}

impl ApiServer {
    pub fn new(settings: ServerSettings, service: Arc<GameService>) -> Self {
        Self { settings, service }
    }

    /// Serve until Ctrl-C.
    pub async fn start(&self) -> Result<()> {
        let app = router(self.service.clone(), &self.settings.allowed_origin)?;
        let addr = self.settings.bind_addr()?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        info!(
            %addr,
            origin = %self.settings.allowed_origin,
            model = %self.settings.model,
            "story server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("story server failed")?;

        info!("story server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
