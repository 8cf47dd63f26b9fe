use super::common::OkMessage;
use crate::core::{AppError, ServerName};
use crate::services::servers::ServerStatus;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use std::collections::BTreeMap;
use std::sync::Arc;

pub async fn start_server(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
) -> Result<Json<OkMessage>, AppError> {
    let server = ServerName::parse(&server)?;
    state.servers.start(server).await?;
    Ok(OkMessage::new(format!("{server} started")))
}

pub async fn stop_server(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
) -> Result<Json<OkMessage>, AppError> {
    let server = ServerName::parse(&server)?;
    state.servers.stop(server).await?;
    Ok(OkMessage::new(format!("{server} stopped")))
}

pub async fn restart_server(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
) -> Result<Json<OkMessage>, AppError> {
    let server = ServerName::parse(&server)?;
    state.servers.restart(server).await?;
    Ok(OkMessage::new(format!("{server} restarted")))
}

pub async fn server_status(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
) -> Result<Json<ServerStatus>, AppError> {
    let server = ServerName::parse(&server)?;
    Ok(Json(state.servers.status(server).await?))
}

pub async fn all_server_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, ServerStatus>>, AppError> {
    Ok(Json(state.servers.all_status().await?))
}
