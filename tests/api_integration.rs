//! Admin API tests, driven through the full stack: admin router, a real
//! docker-proxy instance, and a stub Docker Engine on an ephemeral port.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use http_body_util::BodyExt;
use mc_admin_server::api::build_routes;
use mc_admin_server::core::config::AppConfig;
use mc_admin_server::proxy::{build_proxy_routes, DockerEngine, ProxyState};
use mc_admin_server::state::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const TOKEN: &str = "test-proxy-token";
const USER: &str = "admin";
const PASS: &str = "hunter2";

struct Harness {
    app: Router,
    _data: tempfile::TempDir,
    _backups: tempfile::TempDir,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Stub Engine where `mc-ilias` is running with fixed stats and every other
/// container is unknown.
fn engine_stub() -> Router {
    Router::new()
        .route(
            "/containers/mc-ilias/json",
            get(|| async {
                Json(json!({
                    "Id": "abc123",
                    "State": {
                        "Status": "running",
                        "Running": true,
                        "Paused": false,
                        "Restarting": false,
                        "StartedAt": "2026-01-01T00:00:00Z",
                        "FinishedAt": "0001-01-01T00:00:00Z",
                    }
                }))
            }),
        )
        .route(
            "/containers/mc-ilias/stats",
            get(|| async {
                // cpu delta 100 over system delta 1000 on 2 cpus: 20.00%.
                // 512 MiB of memory: 512.00MB.
                Json(json!({
                    "cpu_stats": {
                        "cpu_usage": { "total_usage": 300u64 },
                        "system_cpu_usage": 2000u64,
                        "online_cpus": 2,
                    },
                    "precpu_stats": {
                        "cpu_usage": { "total_usage": 200u64 },
                        "system_cpu_usage": 1000u64,
                        "online_cpus": 2,
                    },
                    "memory_stats": { "usage": 536870912u64, "limit": 1073741824u64 },
                    "networks": {},
                }))
            }),
        )
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "No such container" })),
            )
        })
}

async fn harness() -> Harness {
    harness_with(engine_stub()).await
}

async fn harness_with(engine: Router) -> Harness {
    let engine_url = serve(engine).await;
    let proxy_url = serve(build_proxy_routes(ProxyState {
        token: TOKEN.to_string(),
        engine: Arc::new(DockerEngine::new(engine_url.clone())),
    }))
    .await;

    let data = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();
    let config = AppConfig {
        admin_user: USER.to_string(),
        admin_pass: PASS.to_string(),
        proxy_token: TOKEN.to_string(),
        proxy_base_url: proxy_url,
        docker_host: engine_url,
        data_dir: data.path().to_path_buf(),
        backup_dir: backups.path().to_path_buf(),
    };
    Harness {
        app: build_routes(Arc::new(AppState::new(config))),
        _data: data,
        _backups: backups,
    }
}

fn basic_auth() -> String {
    format!("Basic {}", BASE64.encode(format!("{USER}:{PASS}")))
}

fn get_req(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_req(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

#[tokio::test]
async fn rejects_missing_and_bad_credentials() {
    let h = harness().await;

    let resp = h
        .app
        .clone()
        .oneshot(get_req("/api/servers/status/mc-ilias", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert_eq!(
        challenge.to_str().unwrap(),
        "Basic realm=\"Minecraft Admin Area\""
    );

    let bad = format!("Basic {}", BASE64.encode("admin:wrong"));
    let (status, body) = send(&h.app, get_req("/api/servers/status/mc-ilias", Some(&bad))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn status_of_running_server_reports_computed_stats() {
    let h = harness().await;
    let (status, body) = send(
        &h.app,
        get_req("/api/servers/status/mc-ilias", Some(&basic_auth())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["server"], "mc-ilias");
    assert_eq!(body["status"], "running");
    assert_eq!(body["cpu"], "20.00%");
    assert_eq!(body["memory"], "512.00MB");
    assert_eq!(body["playerCount"], 0);
}

#[tokio::test]
async fn status_of_unknown_container_reports_stopped() {
    let h = harness().await;
    let (status, body) = send(
        &h.app,
        get_req("/api/servers/status/mc-niilo", Some(&basic_auth())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["server"], "mc-niilo");
    assert_eq!(body["status"], "Stopped");
    assert_eq!(body["rawStatus"], "container not found");
    assert_eq!(body["memory"], "N/A");
    assert_eq!(body["cpu"], "N/A");
}

#[tokio::test]
async fn lifecycle_ops_invalidate_the_status_cache() {
    // Engine stub whose knowledge of mc-niilo can be flipped mid-test.
    let running = Arc::new(AtomicBool::new(false));
    let inspect_flag = running.clone();
    let start_flag = running.clone();
    let engine = Router::new()
        .route(
            "/containers/mc-niilo/json",
            get(move || {
                let flag = inspect_flag.clone();
                async move {
                    if flag.load(Ordering::SeqCst) {
                        Json(json!({
                            "Id": "def456",
                            "State": { "Status": "running", "Running": true }
                        }))
                        .into_response()
                    } else {
                        (
                            StatusCode::NOT_FOUND,
                            Json(json!({ "message": "No such container" })),
                        )
                            .into_response()
                    }
                }
            }),
        )
        .route(
            "/containers/mc-niilo/stats",
            get(|| async {
                Json(json!({
                    "cpu_stats": {
                        "cpu_usage": { "total_usage": 100u64 },
                        "system_cpu_usage": 1000u64,
                        "online_cpus": 1,
                    },
                    "precpu_stats": {
                        "cpu_usage": { "total_usage": 100u64 },
                        "system_cpu_usage": 1000u64,
                        "online_cpus": 1,
                    },
                    "memory_stats": { "usage": 0u64, "limit": 0u64 },
                    "networks": {},
                }))
            }),
        )
        .route(
            "/containers/mc-niilo/start",
            post(move || {
                let flag = start_flag.clone();
                async move {
                    flag.store(true, Ordering::SeqCst);
                    StatusCode::NO_CONTENT
                }
            }),
        )
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "No such container" })),
            )
        });
    let h = harness_with(engine).await;

    // First read caches the stopped record.
    let (_, body) = send(
        &h.app,
        get_req("/api/servers/status/mc-niilo", Some(&basic_auth())),
    )
    .await;
    assert_eq!(body["status"], "Stopped");

    // The Engine now knows the container, but the cached entry still wins.
    running.store(true, Ordering::SeqCst);
    let (_, body) = send(
        &h.app,
        get_req("/api/servers/status/mc-niilo", Some(&basic_auth())),
    )
    .await;
    assert_eq!(body["status"], "Stopped");

    // A lifecycle operation evicts the entry; the next read is fresh.
    let (status, _) = send(&h.app, post_req("/api/servers/start/mc-niilo", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(
        &h.app,
        get_req("/api/servers/status/mc-niilo", Some(&basic_auth())),
    )
    .await;
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn short_server_name_is_normalized() {
    let h = harness().await;
    let (status, body) = send(
        &h.app,
        get_req("/api/servers/status/niilo", Some(&basic_auth())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["server"], "mc-niilo");
}

#[tokio::test]
async fn unknown_server_name_is_rejected() {
    let h = harness().await;
    for name in ["mc-other", "evil", "..%2F..%2Fetc%2Fpasswd"] {
        let uri = format!("/api/servers/status/{name}");
        let (status, _) = send(&h.app, get_req(&uri, Some(&basic_auth()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{name}");
    }
}

#[tokio::test]
async fn all_server_status_covers_the_whole_fleet() {
    let h = harness().await;
    let (status, body) = send(&h.app, get_req("/api/servers/status", Some(&basic_auth()))).await;
    assert_eq!(status, StatusCode::OK);
    let map = body.as_object().unwrap();
    assert_eq!(map.len(), 8);
    assert_eq!(map["mc-ilias"]["status"], "running");
    assert_eq!(map["mc-play"]["status"], "Stopped");
}

#[tokio::test]
async fn datapack_search_filters_the_catalog() {
    let h = harness().await;
    let (status, body) = send(
        &h.app,
        get_req("/api/datapacks/search?query=cauldron", Some(&basic_auth())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (_, all) = send(&h.app, get_req("/api/datapacks/search", Some(&basic_auth()))).await;
    assert_eq!(all["total"], 17);
}

#[tokio::test]
async fn datapack_install_list_uninstall_flow() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        post_req(
            "/api/datapacks/install/mc-play",
            json!({ "datapackName": "graves", "version": "4.0.4" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // Second install of the same pack conflicts.
    let (status, _) = send(
        &h.app,
        post_req(
            "/api/datapacks/install/mc-play",
            json!({ "datapackName": "graves", "version": "4.0.4" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, listing) = send(&h.app, get_req("/api/datapacks/mc-play", Some(&basic_auth()))).await;
    assert_eq!(listing["datapacks"][0]["name"], "graves");
    assert_eq!(listing["datapacks"][0]["version"], "4.0.4");

    let directory = listing["datapacks"][0]["directory"].as_str().unwrap();
    let (status, _) = send(
        &h.app,
        post_req(
            "/api/datapacks/uninstall/mc-play",
            json!({ "datapackDir": directory }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = send(&h.app, get_req("/api/datapacks/mc-play", Some(&basic_auth()))).await;
    assert_eq!(listing["datapacks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn datapack_install_requires_name_and_version() {
    let h = harness().await;
    let (status, body) = send(
        &h.app,
        post_req("/api/datapacks/install/mc-play", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
}

#[tokio::test]
async fn datapack_uninstall_rejects_traversal() {
    let h = harness().await;
    for dir in ["../../etc", "..", "a/b", "a\\b"] {
        let (status, _) = send(
            &h.app,
            post_req(
                "/api/datapacks/uninstall/mc-play",
                json!({ "datapackDir": dir }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{dir:?}");
    }
}

#[tokio::test]
async fn unknown_datapack_is_not_found() {
    let h = harness().await;
    let (status, _) = send(
        &h.app,
        post_req(
            "/api/datapacks/install/mc-play",
            json!({ "datapackName": "no such pack", "version": "0.0.1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn backup_restore_rejects_foreign_and_traversal_names() {
    let h = harness().await;
    for name in [
        "../../etc/shadow",
        "mc-niilo_backup_2026.tar.gz",
        "random.tar.gz",
    ] {
        let (status, _) = send(
            &h.app,
            post_req(
                "/api/backups/restore/mc-play",
                json!({ "backupName": name }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{name:?}");
    }
}

#[tokio::test]
async fn backup_list_starts_empty() {
    let h = harness().await;
    let (status, body) = send(
        &h.app,
        get_req("/api/backups/list/mc-play", Some(&basic_auth())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["server"], "mc-play");
    assert_eq!(body["backups"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn analytics_history_starts_empty() {
    let h = harness().await;
    let (status, body) = send(
        &h.app,
        get_req("/api/analytics/history/mc-ilias", Some(&basic_auth())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["server"], "mc-ilias");
    assert_eq!(body["history"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn render_job_lifecycle_via_api() {
    let h = harness().await;

    let (status, job) = send(
        &h.app,
        post_req("/api/render/jobs", json!({ "server": "mc-play" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["server"], "mc-play");
    assert_eq!(job["world"], "world");
    assert_eq!(job["status"], "pending");
    let id = job["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(
        &h.app,
        get_req(&format!("/api/render/jobs/{id}"), Some(&basic_auth())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id.as_str());

    let (status, cancelled) = send(
        &h.app,
        post_req(&format!("/api/render/jobs/{id}/cancel"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    // Cancelling a terminal job conflicts.
    let (status, _) = send(
        &h.app,
        post_req(&format!("/api/render/jobs/{id}/cancel"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn render_job_requires_an_allow_listed_server() {
    let h = harness().await;
    let (status, _) = send(
        &h.app,
        post_req("/api/render/jobs", json!({ "server": "mc-other" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&h.app, post_req("/api/render/jobs", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scaling_workers_round_trip() {
    let h = harness().await;

    let (status, worker) = send(&h.app, post_req("/api/scaling/workers", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(worker["status"], "ready");
    let id = worker["id"].as_str().unwrap().to_string();

    let (_, pool) = send(&h.app, get_req("/api/scaling/status", Some(&basic_auth()))).await;
    assert_eq!(pool["totalWorkers"], 1);

    let (status, body) = send(&h.app, post_req("/api/scaling/evaluate", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pendingJobs"], 0);

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/scaling/workers/{id}"))
        .header(header::AUTHORIZATION, basic_auth())
        .body(Body::empty())
        .unwrap();
    let (status, removed) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["success"], true);

    let (_, pool) = send(&h.app, get_req("/api/scaling/status", Some(&basic_auth()))).await;
    assert_eq!(pool["totalWorkers"], 0);
}

#[tokio::test]
async fn removing_an_unknown_worker_is_not_found() {
    let h = harness().await;
    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/scaling/workers/{}", uuid::Uuid::new_v4()))
        .header(header::AUTHORIZATION, basic_auth())
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn healthz_is_open() {
    let h = harness().await;
    let resp = h
        .app
        .clone()
        .oneshot(get_req("/healthz", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
