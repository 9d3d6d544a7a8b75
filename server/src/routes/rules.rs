use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use srxsync::ProjectStatus;

use super::ApiResponse;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesInfo {
    pub path: String,
    pub valid: bool,
    pub size: usize,
    pub content: String,
}

/// Loads the rules document and reports whether it validates.
pub async fn get_rules(State(state): State<Arc<AppState>>) -> ApiResult<RulesInfo> {
    let document = state.rules.load().await?;
    let valid = document.is_valid();
    let message = if valid {
        "Rules file is valid"
    } else {
        "Rules file failed validation"
    };

    Ok(Json(ApiResponse::with_outcome(
        valid,
        message,
        RulesInfo {
            path: document.source_path().display().to_string(),
            valid,
            size: document.content().len(),
            content: document.content().to_string(),
        },
    )))
}

pub async fn project_status(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<u64>,
) -> ApiResult<ProjectStatus> {
    let status = state.reconciler.project_status(project_id).await?;
    let message = format!(
        "Project {}: {}/{} files configured",
        project_id, status.configured_files, status.total_files
    );
    Ok(Json(ApiResponse::ok(message, status)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{TestApp, RULES};

    #[tokio::test]
    async fn test_get_rules() {
        let app = TestApp::new();
        let (status, body) = app.send("GET", "/srx/rules", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["valid"], true);
        assert_eq!(body["data"]["content"], RULES);
    }

    #[tokio::test]
    async fn test_invalid_rules_reported() {
        let app = TestApp::new();
        std::fs::write(app.dir.path().join("rules.srx"), "<srx/>").unwrap();

        let (status, body) = app.send("GET", "/srx/rules", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["valid"], false);
    }

    #[tokio::test]
    async fn test_missing_rules_is_not_found() {
        let app = TestApp::new();
        std::fs::remove_file(app.dir.path().join("rules.srx")).unwrap();

        let (status, body) = app.send("GET", "/srx/rules", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_project_status_routes() {
        let app = TestApp::new();
        for uri in ["/srx/status/1", "/monitoring/projects/1/status"] {
            let (status, body) = app.send("GET", uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["totalFiles"], 2);
            assert_eq!(body["data"]["isConfigured"], false);
        }
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let app = TestApp::new();
        let (status, body) = app.send("GET", "/srx/status/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }
}
