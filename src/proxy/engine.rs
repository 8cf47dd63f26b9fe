//! Minimal Docker Engine API client.
//!
//! The proxy reaches the Engine over a configurable base URL
//! (`DOCKER_HOST`-style, e.g. `http://localhost:2375` or a socket proxy in
//! front of `/var/run/docker.sock`). Only the fixed operation set the admin
//! platform needs is exposed; there is no generic passthrough.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("container not found")]
    NotFound,
    #[error("engine request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("engine returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// `GET /containers/{id}/json`, reduced to the fields the platform reports.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerInspect {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "State")]
    pub state: ContainerState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerState {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Running")]
    pub running: bool,
    #[serde(rename = "Paused", default)]
    pub paused: bool,
    #[serde(rename = "Restarting", default)]
    pub restarting: bool,
    #[serde(rename = "StartedAt", default)]
    pub started_at: String,
    #[serde(rename = "FinishedAt", default)]
    pub finished_at: String,
    #[serde(rename = "Health", default)]
    pub health: Option<Value>,
}

/// `GET /containers/{id}/stats?stream=false`, reduced to the blocks used for
/// the status report and the stats endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerStats {
    #[serde(default)]
    pub cpu_stats: CpuStats,
    #[serde(default)]
    pub precpu_stats: CpuStats,
    #[serde(default)]
    pub memory_stats: MemoryStats,
    // The Engine calls this block `networks`; the proxy re-exposes it as
    // `network_stats`.
    #[serde(default, alias = "network_stats")]
    pub networks: Option<Value>,
    #[serde(default)]
    pub blkio_stats: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CpuStats {
    #[serde(default)]
    pub cpu_usage: CpuUsage,
    #[serde(default)]
    pub system_cpu_usage: u64,
    #[serde(default)]
    pub online_cpus: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CpuUsage {
    #[serde(default)]
    pub total_usage: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryStats {
    #[serde(default)]
    pub usage: u64,
    #[serde(default)]
    pub limit: u64,
}

#[derive(Debug, Deserialize)]
struct ExecCreated {
    #[serde(rename = "Id")]
    id: String,
}

pub struct DockerEngine {
    http: reqwest::Client,
    base_url: String,
}

impl DockerEngine {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, EngineError> {
        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(EngineError::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    pub async fn inspect(&self, name: &str) -> Result<ContainerInspect, EngineError> {
        let resp = self
            .http
            .get(self.url(&format!("/containers/{name}/json")))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn start(&self, name: &str) -> Result<(), EngineError> {
        self.lifecycle(name, "start").await
    }

    pub async fn stop(&self, name: &str) -> Result<(), EngineError> {
        self.lifecycle(name, "stop").await
    }

    pub async fn restart(&self, name: &str) -> Result<(), EngineError> {
        self.lifecycle(name, "restart").await
    }

    async fn lifecycle(&self, name: &str, op: &str) -> Result<(), EngineError> {
        let resp = self
            .http
            .post(self.url(&format!("/containers/{name}/{op}")))
            .send()
            .await?;
        // 304 means "already in the requested state", which is fine.
        if resp.status().as_u16() == 304 {
            return Ok(());
        }
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn stats(&self, name: &str) -> Result<ContainerStats, EngineError> {
        let resp = self
            .http
            .get(self.url(&format!("/containers/{name}/stats")))
            .query(&[("stream", "false")])
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Tail the last `tail` lines of stdout+stderr. The Engine's stream
    /// multiplexing headers are left in place; consumers strip them.
    pub async fn logs(&self, name: &str, tail: usize) -> Result<String, EngineError> {
        let resp = self
            .http
            .get(self.url(&format!("/containers/{name}/logs")))
            .query(&[
                ("stdout", "true"),
                ("stderr", "true"),
                ("follow", "false"),
                ("tail", &tail.to_string()),
            ])
            .send()
            .await?;
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Run a fixed argument array inside the container and collect its
    /// output. The command is never passed through a shell.
    pub async fn exec(&self, name: &str, cmd: &[String]) -> Result<String, EngineError> {
        let resp = self
            .http
            .post(self.url(&format!("/containers/{name}/exec")))
            .json(&serde_json::json!({
                "Cmd": cmd,
                "AttachStdout": true,
                "AttachStderr": true,
            }))
            .send()
            .await?;
        let created: ExecCreated = Self::check(resp).await?.json().await?;

        let resp = self
            .http
            .post(self.url(&format!("/exec/{}/start", created.id)))
            .json(&serde_json::json!({ "Detach": false, "Tty": false }))
            .send()
            .await?;
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
