use crate::core::{AppError, ServerName};
use crate::services::history::HistoryPoint;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HistoryResponse {
    pub server: String,
    pub history: Vec<HistoryPoint>,
}

pub async fn server_history(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    let server = ServerName::parse(&server)?;
    Ok(Json(HistoryResponse {
        server: server.to_string(),
        history: state.history.get(server),
    }))
}
