//! The docker-proxy HTTP surface.
//!
//! This router is the only component permitted to talk to the Docker Engine.
//! Every request (except `/health`) must carry the static bearer token, and
//! every container name is checked against the allow-list before any Engine
//! call is made.

use crate::core::ServerName;
use crate::proxy::engine::{DockerEngine, EngineError};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProxyState {
    pub token: String,
    pub engine: Arc<DockerEngine>,
}

pub fn build_proxy_routes(state: ProxyState) -> Router {
    let authed = Router::new()
        .route("/containers/:id/status", get(container_status))
        .route("/containers/:id/start", post(container_start))
        .route("/containers/:id/stop", post(container_stop))
        .route("/containers/:id/restart", post(container_restart))
        .route("/containers/:id/stats", get(container_stats))
        .route("/containers/:id/logs", get(container_logs))
        .route("/containers/:id/exec", post(container_exec))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(authed)
        .with_state(state)
}

/// Bearer-token gate. On mismatch the request is rejected before any Engine
/// call can happen.
async fn require_bearer(
    State(state): State<ProxyState>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(token) = header.and_then(|v| v.strip_prefix("Bearer ")) else {
        return unauthorized("Missing or invalid authorization header");
    };
    if token != state.token {
        return unauthorized("Invalid token");
    }

    next.run(req).await
}

fn unauthorized(msg: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg }))).into_response()
}

fn invalid_name() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid container name" })),
    )
        .into_response()
}

fn command_array_required() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Command array required" })),
    )
        .into_response()
}

/// Engine failures are logged with full detail but surfaced generically, so
/// internal endpoints and socket paths never leak to clients.
fn engine_error(op: &str, name: &str, err: EngineError) -> Response {
    match err {
        EngineError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "container not found" })),
        )
            .into_response(),
        other => {
            tracing::error!("Error during {op} for {name}: {other}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Docker operation failed" })),
            )
                .into_response()
        }
    }
}

async fn container_status(
    State(state): State<ProxyState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(name) = ServerName::parse(&id) else {
        return invalid_name();
    };
    match state.engine.inspect(name.as_str()).await {
        Ok(data) => Json(json!({
            "id": data.id,
            "status": data.state.status,
            "running": data.state.running,
            "paused": data.state.paused,
            "restarting": data.state.restarting,
            "startedAt": data.state.started_at,
            "finishedAt": data.state.finished_at,
            "health": data.state.health,
        }))
        .into_response(),
        Err(err) => engine_error("status", name.as_str(), err),
    }
}

async fn container_start(State(state): State<ProxyState>, Path(id): Path<String>) -> Response {
    lifecycle(state, id, "start").await
}

async fn container_stop(State(state): State<ProxyState>, Path(id): Path<String>) -> Response {
    lifecycle(state, id, "stop").await
}

async fn container_restart(State(state): State<ProxyState>, Path(id): Path<String>) -> Response {
    lifecycle(state, id, "restart").await
}

async fn lifecycle(state: ProxyState, id: String, op: &'static str) -> Response {
    let Ok(name) = ServerName::parse(&id) else {
        return invalid_name();
    };
    let result = match op {
        "start" => state.engine.start(name.as_str()).await,
        "stop" => state.engine.stop(name.as_str()).await,
        _ => state.engine.restart(name.as_str()).await,
    };
    match result {
        Ok(()) => Json(json!({
            "success": true,
            "message": format!("Container {name} {op}{}ed", if op == "stop" { "p" } else { "" }),
        }))
        .into_response(),
        Err(err) => engine_error(op, name.as_str(), err),
    }
}

async fn container_stats(State(state): State<ProxyState>, Path(id): Path<String>) -> Response {
    let Ok(name) = ServerName::parse(&id) else {
        return invalid_name();
    };
    match state.engine.stats(name.as_str()).await {
        Ok(stats) => Json(json!({
            "cpu_stats": {
                "cpu_usage": { "total_usage": stats.cpu_stats.cpu_usage.total_usage },
                "system_cpu_usage": stats.cpu_stats.system_cpu_usage,
                "online_cpus": stats.cpu_stats.online_cpus,
            },
            "precpu_stats": {
                "cpu_usage": { "total_usage": stats.precpu_stats.cpu_usage.total_usage },
                "system_cpu_usage": stats.precpu_stats.system_cpu_usage,
                "online_cpus": stats.precpu_stats.online_cpus,
            },
            "memory_stats": {
                "usage": stats.memory_stats.usage,
                "limit": stats.memory_stats.limit,
            },
            "network_stats": stats.networks.unwrap_or_else(|| json!({})),
            "blkio_stats": stats.blkio_stats,
        }))
        .into_response(),
        Err(err) => engine_error("stats", name.as_str(), err),
    }
}

#[derive(Deserialize)]
struct LogsQuery {
    lines: Option<usize>,
}

async fn container_logs(
    State(state): State<ProxyState>,
    Path(id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Response {
    let Ok(name) = ServerName::parse(&id) else {
        return invalid_name();
    };
    let tail = query.lines.unwrap_or(100);
    match state.engine.logs(name.as_str(), tail).await {
        Ok(logs) => ([(header::CONTENT_TYPE, "text/plain")], logs).into_response(),
        Err(err) => engine_error("logs", name.as_str(), err),
    }
}

/// `cmd` must be a non-empty array of strings. The body is taken as a raw
/// JSON value so a wrong-typed `cmd` still gets the 400, not an extractor
/// rejection.
async fn container_exec(
    State(state): State<ProxyState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let Ok(name) = ServerName::parse(&id) else {
        return invalid_name();
    };
    let cmd: Vec<String> = match body.get("cmd").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => {
            match items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
            {
                Some(cmd) => cmd,
                None => return command_array_required(),
            }
        }
        _ => return command_array_required(),
    };
    match state.engine.exec(name.as_str(), &cmd).await {
        Ok(output) => Json(json!({ "success": true, "output": output })).into_response(),
        Err(err) => engine_error("exec", name.as_str(), err),
    }
}

async fn health() -> Response {
    Json(json!({
        "status": "healthy",
        "service": "docker-proxy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}
