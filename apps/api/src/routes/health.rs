use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Liveness plus whether a credential is configured. Never the credential itself.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "port": state.config.port,
        "hasKey": state.config.has_api_key(),
    }))
}
