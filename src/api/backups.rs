use super::common::OkMessage;
use crate::core::{AppError, ServerName};
use crate::services::backups::{BackupEntry, BackupReceipt};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub async fn create_backup(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
) -> Result<Json<BackupReceipt>, AppError> {
    let server = ServerName::parse(&server)?;
    Ok(Json(state.backups.create(server).await?))
}

#[derive(Serialize)]
pub struct ListResponse {
    pub server: String,
    pub backups: Vec<BackupEntry>,
}

pub async fn list_backups(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
) -> Result<Json<ListResponse>, AppError> {
    let server = ServerName::parse(&server)?;
    let backups = state.backups.list(server).await?;
    Ok(Json(ListResponse {
        server: server.to_string(),
        backups,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRequest {
    backup_name: Option<String>,
}

impl BackupRequest {
    fn backup_name(self) -> Result<String, AppError> {
        self.backup_name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Validation(vec!["backupName is required".to_string()]))
    }
}

pub async fn restore_backup(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
    Json(body): Json<BackupRequest>,
) -> Result<Json<OkMessage>, AppError> {
    let server = ServerName::parse(&server)?;
    let backup_name = body.backup_name()?;
    state.backups.restore(server, &backup_name).await?;
    Ok(OkMessage::new(format!(
        "Restored {server} from {backup_name}"
    )))
}

pub async fn delete_backup(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
    Json(body): Json<BackupRequest>,
) -> Result<Json<OkMessage>, AppError> {
    let server = ServerName::parse(&server)?;
    let backup_name = body.backup_name()?;
    state.backups.delete(server, &backup_name).await?;
    Ok(OkMessage::new(format!("Deleted backup {backup_name}")))
}
