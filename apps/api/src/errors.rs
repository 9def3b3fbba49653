use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::advisor::AskError;
use crate::pdf::RenderError;
use crate::plan::store::PlanError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Detail is logged here and never sent to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Plan unavailable: {0}")]
    PlanUnavailable(#[from] PlanError),

    #[error("Render failed: {0}")]
    RenderFailed(#[from] RenderError),

    #[error("Finance question failed: {0}")]
    Ask(#[from] AskError),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PlanUnavailable(e) => {
                tracing::error!("Plan error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PLAN_UNAVAILABLE",
                    "plan.json not found/invalid".to_string(),
                )
            }
            AppError::RenderFailed(e) => {
                tracing::error!("PDF error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_FAILED",
                    "PDF generation failed".to_string(),
                )
            }
            // The AI route keeps its own body shape: the site shows `answer` verbatim.
            AppError::Ask(e) => {
                let body = Json(json!({
                    "answer": e.user_message(),
                    "source": e.source_tag(),
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests, please try again later.".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
