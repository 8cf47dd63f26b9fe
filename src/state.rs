use crate::core::config::AppConfig;
use crate::proxy::DockerProxyClient;
use crate::services::backups::BackupsService;
use crate::services::datapacks::DatapacksService;
use crate::services::history::HistoryStore;
use crate::services::render::RenderJobStore;
use crate::services::scaling::WorkerPool;
use crate::services::servers::ServersService;
use std::sync::Arc;

/// Shared application state. Every dependency is constructed once at process
/// start and handed to the routers; there are no module-level singletons.
pub struct AppState {
    pub config: AppConfig,
    pub servers: Arc<ServersService>,
    pub datapacks: DatapacksService,
    pub backups: BackupsService,
    pub history: Arc<HistoryStore>,
    pub render_jobs: Arc<RenderJobStore>,
    pub workers: Arc<WorkerPool>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let proxy = Arc::new(DockerProxyClient::new(
            config.proxy_base_url.clone(),
            config.proxy_token.clone(),
        ));

        Self {
            servers: Arc::new(ServersService::new(proxy.clone())),
            datapacks: DatapacksService::new(config.data_dir.clone()),
            backups: BackupsService::new(proxy, config.backup_dir.clone()),
            history: Arc::new(HistoryStore::new()),
            render_jobs: Arc::new(RenderJobStore::new()),
            workers: Arc::new(WorkerPool::new()),
            config,
        }
    }
}
