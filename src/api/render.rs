use crate::core::{AppError, ServerName};
use crate::services::render::{self, PublicMap, RenderJob};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CreateJobRequest {
    server: Option<String>,
    world: Option<String>,
}

pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<RenderJob>), AppError> {
    let server = body
        .server
        .ok_or_else(|| AppError::Validation(vec!["server is required".to_string()]))?;
    let server = ServerName::parse(&server)?;

    let job = state.render_jobs.create(server, body.world);
    render::spawn_driver(state.render_jobs.clone(), state.workers.clone(), job.id);
    Ok((StatusCode::CREATED, Json(job)))
}

#[derive(Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<RenderJob>,
    pub total: usize,
}

pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<JobsResponse> {
    let jobs = state.render_jobs.list();
    let total = jobs.len();
    Json(JobsResponse { jobs, total })
}

pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderJob>, AppError> {
    state
        .render_jobs
        .get(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Render job {id} not found")))
}

pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderJob>, AppError> {
    Ok(Json(state.render_jobs.cancel(id)?))
}

#[derive(Serialize)]
pub struct MapsResponse {
    pub maps: Vec<PublicMap>,
    pub total: usize,
}

pub async fn public_maps(State(state): State<Arc<AppState>>) -> Json<MapsResponse> {
    let maps = state.render_jobs.public_maps();
    let total = maps.len();
    Json(MapsResponse { maps, total })
}
