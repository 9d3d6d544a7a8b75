//! HTTP routes.
//!
//! Routes are organized by domain:
//! - `rules`: rules document and per-project compliance
//! - `monitoring`: monitoring state, passes and remote inventory views

pub mod monitoring;
pub mod rules;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Response wrapper for every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// A response whose success flag follows `success` and still carries data.
    pub fn with_outcome(success: bool, message: impl Into<String>, data: T) -> Self {
        Self {
            success,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/srx/rules", get(rules::get_rules))
        .route("/srx/status/:project_id", get(rules::project_status))
        .route("/monitoring/status", get(monitoring::status))
        .route("/monitoring/toggle", post(monitoring::toggle))
        .route("/monitoring/check", post(monitoring::check))
        .route("/monitoring/projects", get(monitoring::list_projects))
        .route("/monitoring/projects/:id/files", get(monitoring::list_files))
        .route("/monitoring/projects/:id/status", get(rules::project_status))
        .route("/monitoring/projects/:id/configure", post(monitoring::configure_project))
        .route("/monitoring/configure-all", post(monitoring::configure_all))
        .route("/monitoring/divergent", get(monitoring::divergent))
        .route("/monitoring/history", get(monitoring::history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub version: &'static str,
}

pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(
        "Service is healthy",
        HealthResponse {
            version: env!("CARGO_PKG_VERSION"),
        },
    ))
}
