//! `POST /ask`: resolves one question through the lexical, keyword and generative tiers.

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

/// Inbound body. `question` may be absent or `null`; both are treated as empty.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Every client error uses the same `{"error": ...}` body.
fn client_error(status: StatusCode, message: String) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({ "error": message })))
}

pub async fn ask(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(target: "ilm::gateway", error = %rejection, "Rejected malformed /ask body");
            return client_error(rejection.status(), rejection.body_text());
        }
    };
    let question = req.question.as_deref().unwrap_or("");
    match state.resolver.resolve(question).await {
        Ok(answer) => (
            StatusCode::OK,
            Json(json!({
                "answer": answer.text,
                "source": answer.source.label(),
            })),
        ),
        Err(e) => {
            tracing::debug!(target: "ilm::gateway", error = %e, "Rejected question");
            client_error(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}
