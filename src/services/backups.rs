//! Server backups: `tar` runs inside the container via the docker-proxy exec
//! endpoint, writing to a `/backups` volume that is also mounted locally as
//! the backup directory.

use crate::core::datapack::is_safe_dir_component;
use crate::core::error::AppError;
use crate::core::ServerName;
use crate::proxy::DockerProxyClient;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct BackupEntry {
    pub name: String,
    pub timestamp: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupReceipt {
    pub server: String,
    pub backup: String,
    pub timestamp: String,
}

pub struct BackupsService {
    proxy: Arc<DockerProxyClient>,
    backup_dir: PathBuf,
}

impl BackupsService {
    pub fn new(proxy: Arc<DockerProxyClient>, backup_dir: PathBuf) -> Self {
        Self { proxy, backup_dir }
    }

    fn backup_prefix(server: ServerName) -> String {
        format!("{server}_backup_")
    }

    /// A backup name argument must belong to the server and be a plain file
    /// name; anything else is rejected before a path is built from it.
    fn validate_backup_name(server: ServerName, name: &str) -> Result<(), AppError> {
        if !is_safe_dir_component(name) || !name.starts_with(&Self::backup_prefix(server)) {
            return Err(AppError::Validation(vec![format!(
                "backupName must reference a backup of {server}"
            )]));
        }
        Ok(())
    }

    async fn ensure_backup_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.backup_dir).await?;
        Ok(())
    }

    /// Create a consistent backup: stop the server if running, tar `/data`
    /// into the shared backup volume, then bring the server back.
    pub async fn create(&self, server: ServerName) -> Result<BackupReceipt, AppError> {
        self.ensure_backup_dir().await?;

        let timestamp = chrono::Utc::now()
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        let backup_name = format!("{}{timestamp}.tar.gz", Self::backup_prefix(server));

        let was_running = self
            .proxy
            .status(server)
            .await?
            .map(|s| s.running)
            .unwrap_or(false);
        if was_running {
            tracing::info!("Stopping {server} for backup");
            self.proxy.stop(server).await?;
        }

        let archive = format!("/backups/{backup_name}");
        let result = self
            .proxy
            .exec(server, &["tar", "-czf", &archive, "-C", "/data", "."])
            .await;

        if was_running {
            tracing::info!("Restarting {server} after backup");
            if let Err(err) = self.proxy.start(server).await {
                tracing::error!("Failed to restart {server} after backup: {err}");
            }
        }
        result?;

        tracing::info!("Backup completed: {backup_name}");
        Ok(BackupReceipt {
            server: server.to_string(),
            backup: backup_name,
            timestamp,
        })
    }

    /// Backups for this server, newest first.
    pub async fn list(&self, server: ServerName) -> Result<Vec<BackupEntry>, AppError> {
        self.ensure_backup_dir().await?;
        let prefix = Self::backup_prefix(server);

        let mut dir = tokio::fs::read_dir(&self.backup_dir).await?;
        let mut backups = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&prefix) || !name.ends_with(".tar.gz") {
                continue;
            }
            let timestamp = name[prefix.len()..name.len() - ".tar.gz".len()].to_string();
            let size = entry.metadata().await?.len();
            backups.push(BackupEntry {
                name,
                timestamp,
                size,
            });
        }
        // The encoded timestamps sort lexicographically.
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    /// Restore a backup archive into the server's `/data`, restarting the
    /// server around the extraction.
    pub async fn restore(&self, server: ServerName, backup_name: &str) -> Result<(), AppError> {
        Self::validate_backup_name(server, backup_name)?;
        if !tokio::fs::try_exists(self.backup_dir.join(backup_name)).await? {
            return Err(AppError::NotFound(format!(
                "Backup file not found: {backup_name}"
            )));
        }

        tracing::info!("Stopping {server} for restore");
        self.proxy.stop(server).await?;

        let archive = format!("/backups/{backup_name}");
        let result = self
            .proxy
            .exec(server, &["tar", "-xzf", &archive, "-C", "/data"])
            .await;

        tracing::info!("Restarting {server} after restore");
        if let Err(err) = self.proxy.start(server).await {
            tracing::error!("Failed to restart {server} after restore: {err}");
        }
        result?;
        Ok(())
    }

    pub async fn delete(&self, server: ServerName, backup_name: &str) -> Result<(), AppError> {
        Self::validate_backup_name(server, backup_name)?;
        let path = self.backup_dir.join(backup_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!("Deleted backup {backup_name}");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                format!("Backup file not found: {backup_name}"),
            )),
            Err(err) => Err(err.into()),
        }
    }
}
