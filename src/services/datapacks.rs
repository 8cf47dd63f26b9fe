//! Datapack filesystem operations under `{data_dir}/{server}/datapacks/`.
//!
//! Server names are allow-listed before they become path segments, and every
//! directory-name argument is traversal-checked before any filesystem call.

use crate::core::datapack::{
    find_in_catalog, is_safe_dir_component, DatapackDirName, CatalogEntry,
};
use crate::core::error::AppError;
use crate::core::ServerName;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledDatapack {
    pub name: String,
    pub version: String,
    pub game_version: String,
    pub directory: String,
}

pub struct DatapacksService {
    data_dir: PathBuf,
}

impl DatapacksService {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn datapacks_dir(&self, server: ServerName) -> PathBuf {
        self.data_dir.join(server.as_str()).join("datapacks")
    }

    /// List installed datapacks. Directory names that do not match the
    /// `{name} v{version} (MC ...)` grammar are still listed, with unknown
    /// version fields, so stray folders stay visible in the dashboard.
    pub async fn installed(&self, server: ServerName) -> Result<Vec<InstalledDatapack>, AppError> {
        let dir = self.datapacks_dir(server);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut datapacks = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let directory = entry.file_name().to_string_lossy().into_owned();
            let datapack = match DatapackDirName::parse(&directory) {
                Ok(parsed) => InstalledDatapack {
                    name: parsed.name,
                    version: parsed.version,
                    game_version: parsed.game_version,
                    directory,
                },
                Err(_) => InstalledDatapack {
                    name: directory.clone(),
                    version: "unknown".into(),
                    game_version: "unknown".into(),
                    directory,
                },
            };
            datapacks.push(datapack);
        }
        datapacks.sort_by(|a, b| a.directory.cmp(&b.directory));
        Ok(datapacks)
    }

    /// Install a catalog datapack: creates the directory and writes its
    /// `pack.mcmeta` descriptor.
    pub async fn install(
        &self,
        server: ServerName,
        name: &str,
        version: &str,
    ) -> Result<&'static CatalogEntry, AppError> {
        let datapack = find_in_catalog(name, version).ok_or_else(|| {
            AppError::NotFound(format!("Datapack {name} v{version} not found in repository"))
        })?;

        let parent = self.datapacks_dir(server);
        tokio::fs::create_dir_all(&parent).await?;

        let target = parent.join(datapack.directory_name());
        if tokio::fs::try_exists(&target).await? {
            return Err(AppError::Conflict(format!(
                "Datapack {} v{} is already installed",
                datapack.name, datapack.version
            )));
        }
        tokio::fs::create_dir_all(&target).await?;

        let pack_mcmeta = json!({
            "pack": {
                "pack_format": 15,
                "description": datapack.description,
            }
        });
        tokio::fs::write(
            target.join("pack.mcmeta"),
            serde_json::to_string_pretty(&pack_mcmeta).expect("static descriptor"),
        )
        .await?;

        Ok(datapack)
    }

    /// Recursive force-remove of an installed datapack directory.
    pub async fn uninstall(&self, server: ServerName, directory: &str) -> Result<(), AppError> {
        if !is_safe_dir_component(directory) {
            return Err(AppError::InvalidDatapackDir);
        }
        let target = self.datapacks_dir(server).join(directory);
        match tokio::fs::remove_dir_all(&target).await {
            Ok(()) => Ok(()),
            // rm -rf semantics: removing something absent is not an error.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                tracing::error!("Failed to remove datapack directory: {err}");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (tempfile::TempDir, DatapacksService) {
        let dir = tempfile::tempdir().unwrap();
        let service = DatapacksService::new(dir.path().to_path_buf());
        (dir, service)
    }

    #[tokio::test]
    async fn install_then_list() {
        let (_dir, service) = service();
        let server = ServerName::parse("mc-play").unwrap();

        service
            .install(server, "fast leaf decay", "2.0.19")
            .await
            .unwrap();

        let installed = service.installed(server).await.unwrap();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].name, "fast leaf decay");
        assert_eq!(installed[0].version, "2.0.19");
    }

    #[tokio::test]
    async fn install_writes_pack_mcmeta() {
        let (dir, service) = service();
        let server = ServerName::parse("mc-play").unwrap();
        let entry = service.install(server, "graves", "4.0.4").await.unwrap();

        let mcmeta = dir
            .path()
            .join("mc-play/datapacks")
            .join(entry.directory_name())
            .join("pack.mcmeta");
        let body: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(mcmeta).unwrap()).unwrap();
        assert_eq!(body["pack"]["pack_format"], 15);
        assert_eq!(body["pack"]["description"], entry.description);
    }

    #[tokio::test]
    async fn second_install_reports_already_installed() {
        let (_dir, service) = service();
        let server = ServerName::parse("mc-play").unwrap();
        service.install(server, "graves", "4.0.4").await.unwrap();

        let err = service.install(server, "graves", "4.0.4").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains("already installed")));
    }

    #[tokio::test]
    async fn unknown_datapack_is_rejected() {
        let (_dir, service) = service();
        let server = ServerName::parse("mc-play").unwrap();
        let err = service
            .install(server, "no such pack", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn uninstall_rejects_traversal_before_touching_fs() {
        let (dir, service) = service();
        let server = ServerName::parse("mc-play").unwrap();

        // Plant a file outside the datapacks tree; a traversal bug would
        // reach it.
        let outside = dir.path().join("sentinel");
        std::fs::write(&outside, b"keep").unwrap();

        for attempt in ["../../sentinel", "..\\..\\sentinel", "..", "../"] {
            let err = service.uninstall(server, attempt).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidDatapackDir), "{attempt:?}");
        }
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn uninstall_removes_directory() {
        let (dir, service) = service();
        let server = ServerName::parse("mc-play").unwrap();
        let entry = service.install(server, "graves", "4.0.4").await.unwrap();

        service
            .uninstall(server, &entry.directory_name())
            .await
            .unwrap();
        assert!(!dir
            .path()
            .join("mc-play/datapacks")
            .join(entry.directory_name())
            .exists());
    }

    #[tokio::test]
    async fn listing_unknown_layout_marks_versions_unknown() {
        let (dir, service) = service();
        let server = ServerName::parse("mc-play").unwrap();
        std::fs::create_dir_all(dir.path().join("mc-play/datapacks/random folder")).unwrap();

        let installed = service.installed(server).await.unwrap();
        assert_eq!(installed[0].name, "random folder");
        assert_eq!(installed[0].version, "unknown");
    }
}
