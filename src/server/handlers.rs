//! Request handlers for the story API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use tracing::warn;

use crate::engine::errors::GameError;
use crate::engine::game_service::GameService;
use crate::engine::protocol::{StoryRequest, StoryResponse};

/// Message returned for every provider or parse failure.
pub const GENERIC_FAILURE: &str = "Failed to generate story";

/// Shared state of the API server
pub struct ApiState {
    pub service: Arc<GameService>,
}

/// Error body `{ "error": ... }`. Every failure is reported as HTTP 500;
/// only the message tells causes apart.
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::Validation(reason) => Self::new(format!("Invalid request: {}", reason)),
            GameError::GameOver => Self::new("Game is over, start a new game"),
            GameError::Provider(_) | GameError::Parse(_) => Self::new(GENERIC_FAILURE),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Generate the next scene for a player's choice
pub async fn generate_story(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<StoryRequest>, JsonRejection>,
) -> Result<Json<StoryResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected story request body");
        ApiError::new(format!("Invalid request: {}", rejection.body_text()))
    })?;

    match state.service.play(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!(error = %e, "story request failed");
            Err(ApiError::from(e))
        }
    }
}

/// Liveness message on `GET /`
pub async fn status() -> Json<Value> {
    Json(json!({
        "message": "Server is running! Send a POST request to the root to generate a story."
    }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<ApiState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "ventura",
        "sessions": state.service.sessions().len().await,
    }))
}
