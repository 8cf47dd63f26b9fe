//! Server lifecycle and status, via the docker-proxy.

use crate::core::error::AppError;
use crate::core::ServerName;
use crate::proxy::DockerProxyClient;
use crate::services::cache::TtlCache;
use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const STATUS_TTL: Duration = Duration::from_secs(120);
const ALL_STATUS_TTL: Duration = Duration::from_secs(60);
const ALL_STATUS_KEY: &str = "all_servers_status";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub server: String,
    pub status: String,
    pub raw_status: Value,
    pub players: Vec<String>,
    pub player_count: u32,
    pub memory: String,
    pub cpu: String,
}

impl ServerStatus {
    /// The Engine not knowing the container means it was never created or was
    /// removed; the dashboards treat both as a stopped server.
    fn stopped(server: ServerName) -> Self {
        Self {
            server: server.to_string(),
            status: "Stopped".into(),
            raw_status: json!("container not found"),
            players: Vec::new(),
            player_count: 0,
            memory: "N/A".into(),
            cpu: "N/A".into(),
        }
    }
}

pub struct ServersService {
    proxy: Arc<DockerProxyClient>,
    status_cache: TtlCache<ServerStatus>,
    all_cache: TtlCache<BTreeMap<String, ServerStatus>>,
}

impl ServersService {
    pub fn new(proxy: Arc<DockerProxyClient>) -> Self {
        Self {
            proxy,
            status_cache: TtlCache::new(),
            all_cache: TtlCache::new(),
        }
    }

    pub async fn start(&self, server: ServerName) -> Result<(), AppError> {
        self.proxy.start(server).await?;
        self.invalidate(server);
        Ok(())
    }

    pub async fn stop(&self, server: ServerName) -> Result<(), AppError> {
        self.proxy.stop(server).await?;
        self.invalidate(server);
        Ok(())
    }

    pub async fn restart(&self, server: ServerName) -> Result<(), AppError> {
        self.proxy.restart(server).await?;
        self.invalidate(server);
        Ok(())
    }

    fn invalidate(&self, server: ServerName) {
        self.status_cache.remove(server.as_str());
        self.all_cache.remove(ALL_STATUS_KEY);
    }

    pub async fn status(&self, server: ServerName) -> Result<ServerStatus, AppError> {
        if let Some(hit) = self.status_cache.get(server.as_str()) {
            return Ok(hit);
        }
        let status = self.fetch_status(server).await?;
        self.status_cache
            .insert(server.as_str(), status.clone(), STATUS_TTL);
        Ok(status)
    }

    async fn fetch_status(&self, server: ServerName) -> Result<ServerStatus, AppError> {
        let Some(inspect) = self.proxy.status(server).await? else {
            return Ok(ServerStatus::stopped(server));
        };

        let stats = self.proxy.stats(server).await?;
        let cpu_delta = stats
            .cpu_stats
            .cpu_usage
            .total_usage
            .saturating_sub(stats.precpu_stats.cpu_usage.total_usage);
        let system_delta = stats
            .cpu_stats
            .system_cpu_usage
            .saturating_sub(stats.precpu_stats.system_cpu_usage);
        let cpu = if system_delta > 0 {
            (cpu_delta as f64 / system_delta as f64) * stats.cpu_stats.online_cpus as f64 * 100.0
        } else {
            0.0
        };
        let memory_mb = stats.memory_stats.usage as f64 / 1024.0 / 1024.0;

        Ok(ServerStatus {
            server: server.to_string(),
            status: inspect.status.clone(),
            raw_status: json!({
                "status": inspect.status,
                "running": inspect.running,
                "paused": inspect.paused,
                "restarting": inspect.restarting,
                "startedAt": inspect.started_at,
                "finishedAt": inspect.finished_at,
                "health": inspect.health,
            }),
            // Player lists come from the game-server side integrations, which
            // are out of scope here; the fields stay in the contract.
            players: Vec::new(),
            player_count: 0,
            memory: format!("{memory_mb:.2}MB"),
            cpu: format!("{cpu:.2}%"),
        })
    }

    /// Status of every allow-listed server, keyed by name.
    pub async fn all_status(&self) -> Result<BTreeMap<String, ServerStatus>, AppError> {
        if let Some(hit) = self.all_cache.get(ALL_STATUS_KEY) {
            return Ok(hit);
        }
        let statuses = join_all(ServerName::all().map(|s| self.fetch_status(s))).await;
        let mut map = BTreeMap::new();
        for (server, status) in ServerName::all().zip(statuses) {
            map.insert(server.to_string(), status?);
        }
        self.all_cache
            .insert(ALL_STATUS_KEY, map.clone(), ALL_STATUS_TTL);
        Ok(map)
    }
}
