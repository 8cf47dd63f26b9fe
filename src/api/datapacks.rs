use super::common::OkMessage;
use crate::core::datapack::{search_catalog, CatalogEntry};
use crate::core::{AppError, ServerName};
use crate::services::datapacks::InstalledDatapack;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub datapacks: Vec<&'static CatalogEntry>,
    pub total: usize,
}

pub async fn search_datapacks(Query(params): Query<SearchQuery>) -> Json<SearchResponse> {
    let datapacks = search_catalog(params.query.as_deref());
    let total = datapacks.len();
    Json(SearchResponse { datapacks, total })
}

#[derive(Serialize)]
pub struct ListResponse {
    pub server: String,
    pub datapacks: Vec<InstalledDatapack>,
}

pub async fn list_datapacks(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
) -> Result<Json<ListResponse>, AppError> {
    let server = ServerName::parse(&server)?;
    let datapacks = state.datapacks.installed(server).await?;
    Ok(Json(ListResponse {
        server: server.to_string(),
        datapacks,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRequest {
    datapack_name: Option<String>,
    version: Option<String>,
}

pub async fn install_datapack(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
    Json(body): Json<InstallRequest>,
) -> Result<Json<OkMessage>, AppError> {
    let server = ServerName::parse(&server)?;

    let name = body.datapack_name.unwrap_or_default();
    let version = body.version.unwrap_or_default();
    let mut details = Vec::new();
    if name.is_empty() {
        details.push("datapackName is required".to_string());
    }
    if version.is_empty() {
        details.push("version is required".to_string());
    }
    if !details.is_empty() {
        return Err(AppError::Validation(details));
    }

    let entry = state.datapacks.install(server, &name, &version).await?;
    Ok(OkMessage::new(format!(
        "Successfully installed {} v{} to {server}",
        entry.name, entry.version
    )))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallRequest {
    datapack_dir: Option<String>,
}

pub async fn uninstall_datapack(
    State(state): State<Arc<AppState>>,
    Path(server): Path<String>,
    Json(body): Json<UninstallRequest>,
) -> Result<Json<OkMessage>, AppError> {
    let server = ServerName::parse(&server)?;
    let directory = body
        .datapack_dir
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::Validation(vec!["datapackDir is required".to_string()]))?;

    state.datapacks.uninstall(server, &directory).await?;
    Ok(OkMessage::new(format!(
        "Successfully uninstalled {directory} from {server}"
    )))
}
