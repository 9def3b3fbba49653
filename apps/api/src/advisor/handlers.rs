use axum::{extract::State, Json};
use serde::Deserialize;

use crate::advisor::{ask_finance_question, AskResponse};
use crate::errors::AppError;
use crate::plan::model::Scalar;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub query: Option<serde_json::Value>,
}

impl AskRequest {
    /// The question as text. A value that is not present (missing, `null`,
    /// `""`, `0`, `false`) is an empty question; arrays and objects are
    /// passed through in their JSON form.
    fn query_text(&self) -> String {
        match &self.query {
            None => String::new(),
            Some(value @ (serde_json::Value::Array(_) | serde_json::Value::Object(_))) => {
                value.to_string()
            }
            Some(value) => Scalar::from(value.clone()).or("").to_string(),
        }
    }
}

/// POST /api/ai-finance
pub async fn handle_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let answer = ask_finance_question(&state.llm, &request.query_text()).await?;
    Ok(Json(answer))
}
