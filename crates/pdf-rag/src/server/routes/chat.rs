//! Question answering endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{query::INVALID_QUERY_MESSAGE, ChatResponse, QueryRequest};

/// POST /chat - answer a question from the indexed PDFs
pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected chat body: {}", e);
        Error::invalid_input(INVALID_QUERY_MESSAGE)
    })?;

    let question = request.question()?;
    let outcome = state.orchestrator().answer(question).await?;

    Ok(Json(outcome.to_chat_response()))
}
