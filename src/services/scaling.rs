//! Render-worker pool bookkeeping and scaling decisions.
//!
//! Every number in a scaling decision is derived from the pool itself.
//! Worker registration is bookkeeping only; real container provisioning is
//! not wired up yet (placeholder, like the renderer).

use crate::core::error::AppError;
use dashmap::DashMap;
use serde::Serialize;
use tokio::time::{sleep, Duration, Instant};
use uuid::Uuid;

const DEFAULT_CAPACITY: u32 = 2;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Ready,
    Draining,
    Stopped,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerHealth {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: Uuid,
    pub status: WorkerStatus,
    pub capacity: u32,
    pub current_jobs: u32,
    pub health_status: WorkerHealth,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerView {
    pub id: Uuid,
    pub status: WorkerStatus,
    pub capacity: u32,
    pub current_jobs: u32,
    /// Percent, rounded.
    pub utilization: u32,
    pub health_status: WorkerHealth,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthHistogram {
    pub healthy: usize,
    pub degraded: usize,
    pub unhealthy: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingStatus {
    pub timestamp: String,
    pub total_workers: usize,
    pub total_capacity: u32,
    pub current_load: u32,
    /// Percent, two decimals.
    pub utilization: f64,
    pub status: &'static str,
    pub health_status: HealthHistogram,
    pub workers: Vec<WorkerView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingDecision {
    pub should_scale_up: bool,
    pub should_scale_down: bool,
    pub workers_to_add: u32,
    pub workers_to_remove: u32,
    pub reason: &'static str,
}

#[derive(Default)]
pub struct WorkerPool {
    workers: DashMap<Uuid, Worker>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, capacity: Option<u32>) -> Worker {
        let worker = Worker {
            id: Uuid::new_v4(),
            status: WorkerStatus::Ready,
            capacity: capacity.unwrap_or(DEFAULT_CAPACITY).max(1),
            current_jobs: 0,
            health_status: WorkerHealth::Healthy,
            created_at: chrono::Utc::now(),
        };
        self.workers.insert(worker.id, worker.clone());
        tracing::info!("Registered worker {}", worker.id);
        worker
    }

    /// Drain a worker (wait for its jobs, bounded) and drop it from the pool.
    pub async fn remove(&self, id: Uuid) -> Result<Worker, AppError> {
        {
            let mut entry = self
                .workers
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Worker {id} not found")))?;
            entry.status = WorkerStatus::Draining;
        }

        let deadline = Instant::now() + DRAIN_TIMEOUT;
        loop {
            let jobs = self.workers.get(&id).map(|w| w.current_jobs).unwrap_or(0);
            if jobs == 0 || Instant::now() >= deadline {
                if jobs > 0 {
                    tracing::warn!("Force-stopping worker {id} with {jobs} running jobs");
                }
                break;
            }
            sleep(Duration::from_secs(1)).await;
        }

        let (_, mut worker) = self
            .workers
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Worker {id} not found")))?;
        worker.status = WorkerStatus::Stopped;
        tracing::info!("Removed worker {id}");
        Ok(worker)
    }

    /// Least-utilized ready healthy worker with free capacity, if any.
    pub fn assign_job(&self) -> Option<Uuid> {
        let chosen = self
            .workers
            .iter()
            .filter(|w| {
                w.status == WorkerStatus::Ready
                    && w.health_status == WorkerHealth::Healthy
                    && w.current_jobs < w.capacity
            })
            .min_by(|a, b| {
                let ua = a.current_jobs as f64 / a.capacity as f64;
                let ub = b.current_jobs as f64 / b.capacity as f64;
                ua.total_cmp(&ub)
            })
            .map(|w| w.id)?;

        self.workers.get_mut(&chosen).map(|mut w| {
            w.current_jobs += 1;
            w.id
        })
    }

    pub fn complete_job(&self, id: Uuid) {
        if let Some(mut worker) = self.workers.get_mut(&id) {
            worker.current_jobs = worker.current_jobs.saturating_sub(1);
        }
    }

    pub fn scale_up(&self, count: u32) -> Vec<Worker> {
        tracing::info!("Scaling up: adding {count} workers");
        (0..count).map(|_| self.register(None)).collect()
    }

    /// Remove up to `count` idle ready workers, worst health first, then
    /// oldest first.
    pub async fn scale_down(&self, count: u32) -> Vec<Uuid> {
        tracing::info!("Scaling down: removing {count} workers");
        let mut candidates: Vec<_> = self
            .workers
            .iter()
            .filter(|w| w.status == WorkerStatus::Ready && w.current_jobs == 0)
            .map(|w| (w.health_status, w.created_at, w.id))
            .collect();
        candidates.sort_by(|a, b| {
            health_priority(b.0)
                .cmp(&health_priority(a.0))
                .then(a.1.cmp(&b.1))
        });

        let mut removed = Vec::new();
        for (_, _, id) in candidates.into_iter().take(count as usize) {
            if self.remove(id).await.is_ok() {
                removed.push(id);
            }
        }
        removed
    }

    pub fn status(&self) -> ScalingStatus {
        let workers: Vec<Worker> = self.workers.iter().map(|w| w.clone()).collect();
        let total_capacity: u32 = workers.iter().map(|w| w.capacity).sum();
        let current_load: u32 = workers.iter().map(|w| w.current_jobs).sum();
        let utilization = if total_capacity > 0 {
            (current_load as f64 / total_capacity as f64) * 100.0
        } else {
            0.0
        };

        ScalingStatus {
            timestamp: chrono::Utc::now().to_rfc3339(),
            total_workers: workers.len(),
            total_capacity,
            current_load,
            utilization: (utilization * 100.0).round() / 100.0,
            status: if utilization > 80.0 {
                "high_load"
            } else if utilization < 20.0 {
                "low_load"
            } else {
                "normal"
            },
            health_status: HealthHistogram {
                healthy: count_health(&workers, WorkerHealth::Healthy),
                degraded: count_health(&workers, WorkerHealth::Degraded),
                unhealthy: count_health(&workers, WorkerHealth::Unhealthy),
            },
            workers: workers
                .into_iter()
                .map(|w| WorkerView {
                    utilization: ((w.current_jobs as f64 / w.capacity as f64) * 100.0).round()
                        as u32,
                    id: w.id,
                    status: w.status,
                    capacity: w.capacity,
                    current_jobs: w.current_jobs,
                    health_status: w.health_status,
                    created_at: w.created_at,
                })
                .collect(),
        }
    }

    /// Apply the scaling thresholds to pool-derived numbers only.
    ///
    /// `queue_size` is the count of pending render jobs.
    pub fn evaluate(&self, queue_size: usize) -> ScalingDecision {
        let status = self.status();
        let utilization = status.utilization;

        if utilization > 80.0 || queue_size > 5 {
            ScalingDecision {
                should_scale_up: true,
                should_scale_down: false,
                workers_to_add: if utilization > 90.0 { 2 } else { 1 },
                workers_to_remove: 0,
                reason: "High utilization or large job queue",
            }
        } else if utilization < 30.0 && queue_size == 0 && status.total_workers > 0 {
            ScalingDecision {
                should_scale_up: false,
                should_scale_down: true,
                workers_to_add: 0,
                workers_to_remove: 1,
                reason: "Low utilization and no job queue",
            }
        } else {
            ScalingDecision {
                should_scale_up: false,
                should_scale_down: false,
                workers_to_add: 0,
                workers_to_remove: 0,
                reason: "Within thresholds",
            }
        }
    }
}

fn health_priority(health: WorkerHealth) -> u8 {
    match health {
        WorkerHealth::Healthy => 0,
        WorkerHealth::Degraded => 1,
        WorkerHealth::Unhealthy => 2,
    }
}

fn count_health(workers: &[Worker], health: WorkerHealth) -> usize {
    workers.iter().filter(|w| w.health_status == health).count()
}
