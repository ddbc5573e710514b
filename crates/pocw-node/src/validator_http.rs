//! HTTP surface for a validator process: `/api/v1/validate`, the health
//! check the deployment's load balancer polls, and a read-only config
//! dump for operators. This is the only network-reachable side of
//! [`pocw_validator::ValidatorService`] — everything else about the
//! validator is a library call.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use pocw_validator::{ValidationError, ValidatorService};
use shared_types::entities::ValidatorRole;
use shared_types::ipc::{MinerOutputRequest, ValidationResponse};

#[derive(Clone)]
struct AppState {
    service: Arc<ValidatorService>,
    validator_id: u32,
    role: ValidatorRole,
}

pub fn router(service: Arc<ValidatorService>, validator_id: u32, role: ValidatorRole) -> Router {
    let state = AppState { service, validator_id, role };

    Router::new()
        .route("/api/v1/validate", post(handle_validate))
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/config", get(handle_config))
        .with_state(state)
}

async fn handle_validate(State(state): State<AppState>, Json(request): Json<MinerOutputRequest>) -> impl IntoResponse {
    match state.service.validate(&request).await {
        Ok(vote) => (
            StatusCode::OK,
            Json(ValidationResponse { success: true, vote: Some(vote), error: None }),
        ),
        Err(e) => (
            validation_error_status(&e),
            Json(ValidationResponse { success: false, vote: None, error: Some(e.to_string()) }),
        ),
    }
}

fn validation_error_status(e: &ValidationError) -> StatusCode {
    match e {
        ValidationError::Replay(_) => StatusCode::CONFLICT,
        ValidationError::TimeWindow(_) => StatusCode::BAD_REQUEST,
        ValidationError::UnknownMinerKey(_) => StatusCode::BAD_REQUEST,
        ValidationError::SignatureInvalid => StatusCode::UNAUTHORIZED,
        ValidationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "pocw-validator",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "validator_id": state.validator_id,
        "role": role_label(state.role),
    }))
}

fn role_label(role: ValidatorRole) -> &'static str {
    match role {
        ValidatorRole::Ui => "ui",
        ValidatorRole::Format => "format",
        ValidatorRole::Semantic => "semantic",
    }
}
