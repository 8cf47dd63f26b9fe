//! Rolling status history, sampled from the real status endpoint.
//!
//! One point per server per minute, 24 h retention. Only measured values are
//! stored; nothing is synthesized for missed samples.

use crate::core::ServerName;
use crate::services::servers::ServersService;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::time::{self, Duration};

/// 24 hours at one sample per minute.
const MAX_HISTORY_POINTS: usize = 24 * 60;
const SAMPLE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub timestamp: i64,
    pub player_count: u32,
    pub cpu: String,
    pub memory: String,
}

#[derive(Default)]
pub struct HistoryStore {
    buffers: DashMap<&'static str, VecDeque<HistoryPoint>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        let buffers = DashMap::new();
        for server in ServerName::all() {
            buffers.insert(server.as_str(), VecDeque::new());
        }
        Self { buffers }
    }

    pub fn push(&self, server: ServerName, point: HistoryPoint) {
        let mut buffer = self.buffers.entry(server.as_str()).or_default();
        if buffer.len() >= MAX_HISTORY_POINTS {
            buffer.pop_front();
        }
        buffer.push_back(point);
    }

    pub fn get(&self, server: ServerName) -> Vec<HistoryPoint> {
        self.buffers
            .get(server.as_str())
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Background sampler: every minute, record each server's measured status.
pub fn spawn_sampler(servers: Arc<ServersService>, store: Arc<HistoryStore>) {
    tokio::spawn(async move {
        tracing::info!("History sampler started ({SAMPLE_INTERVAL:?} interval)");
        let mut interval = time::interval(SAMPLE_INTERVAL);
        loop {
            interval.tick().await;
            let statuses = match servers.all_status().await {
                Ok(s) => s,
                Err(err) => {
                    tracing::warn!("History sample skipped: {err}");
                    continue;
                }
            };
            let timestamp = chrono::Utc::now().timestamp_millis();
            for server in ServerName::all() {
                if let Some(status) = statuses.get(server.as_str()) {
                    store.push(
                        server,
                        HistoryPoint {
                            timestamp,
                            player_count: status.player_count,
                            cpu: status.cpu.clone(),
                            memory: status.memory.clone(),
                        },
                    );
                }
            }
        }
    });
}
