//! Runtime configuration, assembled from CLI flags and environment in `main`.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Basic-Auth credentials for the admin API.
    pub admin_user: String,
    pub admin_pass: String,
    /// Static bearer token required by the docker proxy.
    pub proxy_token: String,
    /// Base URL the admin services use to reach the docker proxy.
    pub proxy_base_url: String,
    /// Docker Engine API endpoint the proxy forwards to.
    pub docker_host: String,
    /// Root directory holding `{server}/datapacks/...` trees.
    pub data_dir: PathBuf,
    /// Directory where backup archives land (mounted as `/backups` in the
    /// containers).
    pub backup_dir: PathBuf,
}
