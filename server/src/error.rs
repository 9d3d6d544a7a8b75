//! Error responses for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use srxsync::{RemoteError, RulesError, SrxSyncError};
use thiserror::Error;

use crate::routes::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SrxSyncError> for ApiError {
    fn from(err: SrxSyncError) -> Self {
        match err {
            SrxSyncError::Rules(e) => ApiError::Rules(e),
            SrxSyncError::Remote(e) => ApiError::Remote(e),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Rules(RulesError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Rules(RulesError::Invalid { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rules(RulesError::Read { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Remote(RemoteError::Status { status: 404, .. }) => StatusCode::NOT_FOUND,
            ApiError::Remote(RemoteError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Remote(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = ApiResponse::<()>::err(self.to_string());
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
