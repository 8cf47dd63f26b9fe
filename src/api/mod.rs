use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;

mod analytics;
mod auth;
mod backups;
pub mod common;
mod datapacks;
mod render;
mod scaling;
mod servers;

pub fn build_routes(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Servers
        .route("/api/servers/start/:server", post(servers::start_server))
        .route("/api/servers/stop/:server", post(servers::stop_server))
        .route(
            "/api/servers/restart/:server",
            post(servers::restart_server),
        )
        .route("/api/servers/status", get(servers::all_server_status))
        .route("/api/servers/status/:server", get(servers::server_status))
        // Datapacks (specific routes before the parametrized ones)
        .route("/api/datapacks/search", get(datapacks::search_datapacks))
        .route(
            "/api/datapacks/install/:server",
            post(datapacks::install_datapack),
        )
        .route(
            "/api/datapacks/uninstall/:server",
            post(datapacks::uninstall_datapack),
        )
        .route("/api/datapacks/:server", get(datapacks::list_datapacks))
        // Backups
        .route("/api/backups/create/:server", post(backups::create_backup))
        .route("/api/backups/list/:server", get(backups::list_backups))
        .route(
            "/api/backups/restore/:server",
            post(backups::restore_backup),
        )
        .route("/api/backups/delete/:server", post(backups::delete_backup))
        // Analytics
        .route(
            "/api/analytics/history/:server",
            get(analytics::server_history),
        )
        // Scaling
        .route("/api/scaling/status", get(scaling::scaling_status))
        .route("/api/scaling/workers", post(scaling::create_worker))
        .route("/api/scaling/workers/:id", delete(scaling::remove_worker))
        .route("/api/scaling/up", post(scaling::scale_up))
        .route("/api/scaling/down", post(scaling::scale_down))
        .route("/api/scaling/evaluate", post(scaling::evaluate_scaling))
        // Render jobs / public maps
        .route(
            "/api/render/jobs",
            get(render::list_jobs).post(render::create_job),
        )
        .route("/api/render/jobs/:id", get(render::get_job))
        .route("/api/render/jobs/:id/cancel", post(render::cancel_job))
        .route("/api/render/maps", get(render::public_maps))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    Router::new()
        .merge(api)
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}
