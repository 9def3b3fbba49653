//! Axum route handlers for the plan API.

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::plan::PlanDocument;
use crate::state::AppState;

const PDF_FILENAME: &str = "BlueSparrow-Plan.pdf";

/// GET /api/plan
///
/// Returns the stored document exactly as parsed.
pub async fn handle_get_plan(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let plan = state.plans.load().await?;
    Ok(Json(plan))
}

/// POST /api/plan/pdf
///
/// Renders the request body as a plan when one is supplied, otherwise the
/// stored plan.
pub async fn handle_plan_pdf(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let raw = match override_plan(&body)? {
        Some(plan) => plan,
        None => state.plans.load().await?,
    };

    let pdf = state.pdf.render(&PlanDocument::from_value(&raw)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

/// An empty body, `null`, `{}` or `[]` means "use the stored plan".
/// A bare scalar is not a plan document and is rejected.
fn override_plan(body: &[u8]) -> Result<Option<Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Request body is not valid JSON: {e}")))?;

    match &value {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Array(items) if items.is_empty() => Ok(None),
        Value::Object(_) | Value::Array(_) => Ok(Some(value)),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Err(AppError::Validation(
            "Request body must be a JSON object".to_string(),
        )),
    }
}
