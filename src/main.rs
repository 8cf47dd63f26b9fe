use clap::Parser;
use mc_admin_server::api::{build_routes, common};
use mc_admin_server::core::config::AppConfig;
use mc_admin_server::proxy::{build_proxy_routes, DockerEngine, ProxyState};
use mc_admin_server::services::history;
use mc_admin_server::state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Admin API port
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Docker proxy port
    #[arg(long, default_value_t = 3001)]
    proxy_port: u16,

    /// Root directory holding the per-server data trees
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory where backup archives land (the containers' /backups mount)
    #[arg(long, env = "BACKUP_DIR", default_value = "backups")]
    backup_dir: PathBuf,

    /// Directory containing static frontend files (for production)
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,

    #[arg(long, env = "ADMIN_USER", default_value = "admin")]
    admin_user: String,

    #[arg(long, env = "ADMIN_PASS", default_value = "admin123")]
    admin_pass: String,

    /// Static bearer token shared between the admin API and the docker proxy
    #[arg(long, env = "DOCKER_PROXY_TOKEN", default_value = "docker-proxy-secret-token")]
    proxy_token: String,

    /// Base URL the admin services use to reach the docker proxy; defaults to
    /// the in-process proxy listener
    #[arg(long, env = "DOCKER_PROXY_URL")]
    proxy_url: Option<String>,

    /// Docker Engine API endpoint the proxy forwards to
    #[arg(long, env = "DOCKER_HOST", default_value = "http://localhost:2375")]
    docker_host: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = AppConfig {
        admin_user: args.admin_user,
        admin_pass: args.admin_pass,
        proxy_token: args.proxy_token,
        proxy_base_url: args
            .proxy_url
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", args.proxy_port)),
        docker_host: args.docker_host,
        data_dir: args.data_dir,
        backup_dir: args.backup_dir,
    };

    let state = Arc::new(AppState::new(config));

    // Background status sampler feeding the analytics history buffers.
    history::spawn_sampler(state.servers.clone(), state.history.clone());

    let cors = CorsLayer::permissive();

    let app = build_routes(state.clone())
        .layer(cors.clone())
        .layer(axum::middleware::from_fn(common::request_logger));

    // Add static file serving if STATIC_DIR is provided (production mode)
    let app = if let Some(static_dir) = &args.static_dir {
        let index_path = static_dir.join("index.html");
        if static_dir.exists() && index_path.exists() {
            tracing::info!("Serving static files from {:?}", static_dir);
            // ServeDir with fallback to index.html for SPA routing
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_path));
            app.fallback_service(serve_dir)
        } else {
            tracing::warn!("Static directory {:?} or index.html not found", static_dir);
            app
        }
    } else {
        app
    };

    let proxy_app = build_proxy_routes(ProxyState {
        token: state.config.proxy_token.clone(),
        engine: Arc::new(DockerEngine::new(state.config.docker_host.clone())),
    })
    .layer(cors)
    .layer(axum::middleware::from_fn(common::request_logger));

    let admin_addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let proxy_addr = SocketAddr::from(([0, 0, 0, 0], args.proxy_port));
    tracing::info!("Admin API listening on {admin_addr}");
    tracing::info!("Docker proxy listening on {proxy_addr}");

    let admin_listener = tokio::net::TcpListener::bind(admin_addr)
        .await
        .expect("Failed to bind admin port");
    let proxy_listener = tokio::net::TcpListener::bind(proxy_addr)
        .await
        .expect("Failed to bind proxy port");

    let admin = axum::serve(admin_listener, app.into_make_service());
    let proxy = axum::serve(proxy_listener, proxy_app.into_make_service());

    tokio::select! {
        result = admin => result.expect("Admin API server failed"),
        result = proxy => result.expect("Docker proxy server failed"),
    }
}
