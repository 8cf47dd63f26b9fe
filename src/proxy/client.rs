//! HTTP client for the docker-proxy, used by the admin services.
//!
//! The admin API never talks to the Docker Engine directly; everything goes
//! through the proxy with the static bearer token.

use crate::core::error::AppError;
use crate::core::ServerName;
use crate::proxy::engine::ContainerStats;
use serde::Deserialize;
use serde_json::Value;

/// The proxy's `/containers/:id/status` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectSummary {
    pub id: String,
    pub status: String,
    pub running: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub restarting: bool,
    #[serde(default)]
    pub started_at: String,
    #[serde(default)]
    pub finished_at: String,
    #[serde(default)]
    pub health: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ExecResponse {
    #[serde(default)]
    output: String,
}

pub struct DockerProxyClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl DockerProxyClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<Option<reqwest::Response>, AppError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| AppError::Unavailable(format!("docker-proxy: {e}")))?;
        match resp.status().as_u16() {
            404 => Ok(None),
            s if (200..300).contains(&s) => Ok(Some(resp)),
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(AppError::Docker(format!("proxy returned {s}: {body}")))
            }
        }
    }

    /// `None` means the Engine does not know the container (proxy 404).
    pub async fn status(&self, server: ServerName) -> Result<Option<InspectSummary>, AppError> {
        let path = format!("/containers/{server}/status");
        match self.send(self.request(reqwest::Method::GET, &path)).await? {
            None => Ok(None),
            Some(resp) => Ok(Some(resp.json().await.map_err(|e| {
                AppError::Docker(format!("invalid proxy status body: {e}"))
            })?)),
        }
    }

    pub async fn start(&self, server: ServerName) -> Result<(), AppError> {
        self.lifecycle(server, "start").await
    }

    pub async fn stop(&self, server: ServerName) -> Result<(), AppError> {
        self.lifecycle(server, "stop").await
    }

    pub async fn restart(&self, server: ServerName) -> Result<(), AppError> {
        self.lifecycle(server, "restart").await
    }

    async fn lifecycle(&self, server: ServerName, op: &str) -> Result<(), AppError> {
        let path = format!("/containers/{server}/{op}");
        self.send(self.request(reqwest::Method::POST, &path))
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::Docker(format!("container {server} not found")))
    }

    pub async fn stats(&self, server: ServerName) -> Result<ContainerStats, AppError> {
        let path = format!("/containers/{server}/stats");
        let resp = self
            .send(self.request(reqwest::Method::GET, &path))
            .await?
            .ok_or_else(|| AppError::Docker(format!("container {server} not found")))?;
        resp.json()
            .await
            .map_err(|e| AppError::Docker(format!("invalid proxy stats body: {e}")))
    }

    /// Run a fixed argument array inside the container via the proxy.
    pub async fn exec(&self, server: ServerName, cmd: &[&str]) -> Result<String, AppError> {
        let path = format!("/containers/{server}/exec");
        let resp = self
            .send(
                self.request(reqwest::Method::POST, &path)
                    .json(&serde_json::json!({ "cmd": cmd })),
            )
            .await?
            .ok_or_else(|| AppError::Docker(format!("container {server} not found")))?;
        let body: ExecResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Docker(format!("invalid proxy exec body: {e}")))?;
        Ok(body.output)
    }
}
