//! Map render jobs and published maps.
//!
//! Jobs are transient in-memory records; they do not survive a restart.
//! Cancellation is a status flip, not an interrupt of in-flight work. The
//! driver that advances a job through `pending → rendering → completed` is a
//! placeholder on a timer; no real renderer is wired up yet.

use crate::core::error::AppError;
use crate::core::ServerName;
use crate::services::scaling::WorkerPool;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

const QUEUE_DELAY: Duration = Duration::from_secs(2);
const RENDER_DURATION: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Rendering,
    Completed,
    Error,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub id: Uuid,
    pub server: String,
    pub world: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMap {
    pub id: Uuid,
    pub server: String,
    pub world: String,
    pub url: String,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Default)]
pub struct RenderJobStore {
    jobs: DashMap<Uuid, RenderJob>,
    maps: DashMap<Uuid, PublicMap>,
}

impl RenderJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, server: ServerName, world: Option<String>) -> RenderJob {
        let job = RenderJob {
            id: Uuid::new_v4(),
            server: server.to_string(),
            world: world.unwrap_or_else(|| "world".into()),
            status: JobStatus::Pending,
            worker_id: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            finished_at: None,
            error: None,
        };
        self.jobs.insert(job.id, job.clone());
        job
    }

    pub fn get(&self, id: Uuid) -> Option<RenderJob> {
        self.jobs.get(&id).map(|j| j.clone())
    }

    /// Newest first.
    pub fn list(&self) -> Vec<RenderJob> {
        let mut jobs: Vec<RenderJob> = self.jobs.iter().map(|j| j.clone()).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    pub fn pending_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.status == JobStatus::Pending)
            .count()
    }

    /// Flip a non-terminal job to `cancelled`. In-flight work is not
    /// interrupted; the driver observes the flag at its next step.
    pub fn cancel(&self, id: Uuid) -> Result<RenderJob, AppError> {
        let mut job = self
            .jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Render job {id} not found")))?;
        if job.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Render job {id} already finished"
            )));
        }
        job.status = JobStatus::Cancelled;
        job.finished_at = Some(chrono::Utc::now());
        Ok(job.clone())
    }

    pub fn public_maps(&self) -> Vec<PublicMap> {
        let mut maps: Vec<PublicMap> = self.maps.iter().map(|m| m.clone()).collect();
        maps.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        maps
    }

    /// Advance `pending → rendering`, unless the job was cancelled meanwhile.
    /// Returns false if the transition did not happen.
    fn begin(&self, id: Uuid, worker_id: Option<Uuid>) -> bool {
        match self.jobs.get_mut(&id) {
            Some(mut job) if job.status == JobStatus::Pending => {
                job.status = JobStatus::Rendering;
                job.worker_id = worker_id;
                job.started_at = Some(chrono::Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Advance `rendering → completed` and publish the map record.
    fn finish(&self, id: Uuid) -> bool {
        let published = match self.jobs.get_mut(&id) {
            Some(mut job) if job.status == JobStatus::Rendering => {
                job.status = JobStatus::Completed;
                job.finished_at = Some(chrono::Utc::now());
                Some(PublicMap {
                    id: job.id,
                    server: job.server.clone(),
                    world: job.world.clone(),
                    url: format!("/maps/{}/{}/", job.server, job.world),
                    published_at: chrono::Utc::now(),
                })
            }
            _ => None,
        };
        match published {
            Some(map) => {
                self.maps.insert(map.id, map);
                true
            }
            None => false,
        }
    }
}

/// Placeholder render driver: advances the job on a timer instead of running
/// an actual map renderer, and keeps the worker pool's load bookkeeping
/// honest while doing so.
pub fn spawn_driver(store: Arc<RenderJobStore>, pool: Arc<WorkerPool>, job_id: Uuid) {
    tokio::spawn(async move {
        sleep(QUEUE_DELAY).await;

        let worker_id = pool.assign_job();
        if worker_id.is_none() {
            tracing::debug!("No render worker available for job {job_id}, running unassigned");
        }
        if !store.begin(job_id, worker_id) {
            // Cancelled while queued.
            if let Some(worker) = worker_id {
                pool.complete_job(worker);
            }
            return;
        }

        sleep(RENDER_DURATION).await;

        if store.finish(job_id) {
            tracing::info!("Render job {job_id} completed");
        }
        if let Some(worker) = worker_id {
            pool.complete_job(worker);
        }
    });
}
