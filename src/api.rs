//! HTTP API for the query endpoint

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::models::Turn;
use crate::orchestrator::ConversationOrchestrator;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<Turn>>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub response: String,
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

pub fn router(orchestrator: Arc<ConversationOrchestrator>) -> Router {
    Router::new()
        .route("/query", post(process_query))
        .route("/health", get(health))
        .with_state(orchestrator)
}

async fn process_query(
    State(orchestrator): State<Arc<ConversationOrchestrator>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = request.query.ok_or_else(|| bad_request("No query provided"))?;
    let query = query.trim();
    if query.is_empty() {
        return Err(bad_request("Query cannot be empty"));
    }

    let history = request.history.unwrap_or_default();
    let (reply, history) = orchestrator.process(query, history).await;

    Ok(Json(QueryResponse {
        success: true,
        response: reply,
        history,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "tourguide",
    }))
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            success: false,
            error: message.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_accepts_missing_fields() {
        let request: QueryRequest = serde_json::from_str("{}").unwrap();
        assert!(request.query.is_none());
        assert!(request.history.is_none());

        let request: QueryRequest =
            serde_json::from_str(r#"{"query": "weather in Kyoto"}"#).unwrap();
        assert_eq!(request.query.as_deref(), Some("weather in Kyoto"));
    }

    #[test]
    fn test_query_request_parses_history() {
        let body = r#"{"query": "and places?", "history": [
            {"role": "user", "content": "weather in Kyoto"},
            {"role": "assistant", "content": "In Kyoto it's currently 20°C with a chance of 0% to rain."}
        ]}"#;
        let request: QueryRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.history.unwrap().len(), 2);
    }
}
