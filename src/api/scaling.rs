use crate::core::AppError;
use crate::services::scaling::{ScalingDecision, ScalingStatus, Worker};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub async fn scaling_status(State(state): State<Arc<AppState>>) -> Json<ScalingStatus> {
    Json(state.workers.status())
}

#[derive(Deserialize, Default)]
pub struct CreateWorkerRequest {
    capacity: Option<u32>,
}

pub async fn create_worker(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateWorkerRequest>>,
) -> Json<Worker> {
    let Json(body) = body.unwrap_or_default();
    Json(state.workers.register(body.capacity))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveWorkerResponse {
    pub success: bool,
    pub worker: Worker,
}

pub async fn remove_worker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RemoveWorkerResponse>, AppError> {
    let worker = state.workers.remove(id).await?;
    Ok(Json(RemoveWorkerResponse {
        success: true,
        worker,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub decision: ScalingDecision,
    pub pending_jobs: usize,
}

/// Evaluate the scaling thresholds against the current pool and render queue.
/// Reports the decision; it does not apply it.
pub async fn evaluate_scaling(State(state): State<Arc<AppState>>) -> Json<EvaluateResponse> {
    let pending_jobs = state.render_jobs.pending_count();
    Json(EvaluateResponse {
        decision: state.workers.evaluate(pending_jobs),
        pending_jobs,
    })
}

#[derive(Deserialize, Default)]
pub struct ScaleRequest {
    count: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleUpResponse {
    pub added: Vec<Worker>,
    pub total_workers: usize,
}

pub async fn scale_up(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ScaleRequest>>,
) -> Json<ScaleUpResponse> {
    let Json(body) = body.unwrap_or_default();
    let added = state.workers.scale_up(body.count.unwrap_or(1));
    Json(ScaleUpResponse {
        added,
        total_workers: state.workers.status().total_workers,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleDownResponse {
    pub removed: Vec<Uuid>,
    pub total_workers: usize,
}

pub async fn scale_down(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ScaleRequest>>,
) -> Json<ScaleDownResponse> {
    let Json(body) = body.unwrap_or_default();
    let removed = state.workers.scale_down(body.count.unwrap_or(1)).await;
    Json(ScaleDownResponse {
        removed,
        total_workers: state.workers.status().total_workers,
    })
}
