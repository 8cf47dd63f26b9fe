//! Datapack naming: the directory-name grammar and the static catalog.
//!
//! An installed datapack lives in a directory named
//! `{name} v{version} (MC {gameVersion})`, e.g.
//! `fast leaf decay v2.0.19 (MC 1.21-1.21.10)`.

use serde::Serialize;

/// A parsed datapack directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatapackDirName {
    pub name: String,
    pub version: String,
    /// Includes the `MC ` prefix, e.g. `MC 1.21-1.21.10`.
    pub game_version: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirNameError {
    #[error("missing `(MC ...)` game version suffix")]
    MissingGameVersion,
    #[error("missing ` v{{version}}` marker")]
    MissingVersion,
    #[error("empty datapack name")]
    EmptyName,
}

impl DatapackDirName {
    /// Parse `{name} v{version} (MC {gameVersion})`.
    pub fn parse(dir: &str) -> Result<Self, DirNameError> {
        let stripped = dir
            .strip_suffix(')')
            .ok_or(DirNameError::MissingGameVersion)?;
        let open = stripped
            .rfind(" (MC ")
            .ok_or(DirNameError::MissingGameVersion)?;
        let game_version = stripped[open + 2..].to_string();
        if game_version == "MC " {
            return Err(DirNameError::MissingGameVersion);
        }

        let head = &dir[..open];
        let marker = head.rfind(" v").ok_or(DirNameError::MissingVersion)?;
        let version = &head[marker + 2..];
        if version.is_empty() || !version.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(DirNameError::MissingVersion);
        }

        let name = &head[..marker];
        if name.is_empty() {
            return Err(DirNameError::EmptyName);
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            game_version,
        })
    }
}

/// Reject anything that could escape the `datapacks/` directory before it is
/// joined onto a filesystem path. A directory name must be a single path
/// component with no traversal tokens.
pub fn is_safe_dir_component(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with("..")
        && !name.contains("../")
        && !name.contains("..\\")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// One entry of the static datapack repository.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub version: &'static str,
    #[serde(rename = "gameVersion")]
    pub game_version: &'static str,
    pub description: &'static str,
}

impl CatalogEntry {
    /// The directory name this entry installs into.
    pub fn directory_name(&self) -> String {
        format!("{} v{} ({})", self.name, self.version, self.game_version)
    }
}

pub const DATAPACK_CATALOG: [CatalogEntry; 17] = [
    CatalogEntry { name: "afk display", version: "1.1.14", game_version: "MC 1.21-1.21.10", description: "Shows AFK status for players" },
    CatalogEntry { name: "armor statues", version: "2.8.20", game_version: "MC 1.21-1.21.10", description: "Create armor stand statues" },
    CatalogEntry { name: "cauldron concrete", version: "3.0.7", game_version: "MC 1.21-1.21.10", description: "New concrete crafting with cauldrons" },
    CatalogEntry { name: "cauldron mud", version: "1.0.7", game_version: "MC 1.21-1.21.10", description: "Mud creation using cauldrons" },
    CatalogEntry { name: "chunk loaders", version: "1.0.15", game_version: "MC 1.21-1.21.10", description: "Keep chunks loaded automatically" },
    CatalogEntry { name: "custom nether portals", version: "2.3.17", game_version: "MC 1.21-1.21.10", description: "Custom nether portal shapes and sizes" },
    CatalogEntry { name: "ender chest always drops", version: "1.0.6", game_version: "MC 1.21-1.21.10", description: "Ender chests always drop when broken" },
    CatalogEntry { name: "fast leaf decay", version: "2.0.19", game_version: "MC 1.21-1.21.10", description: "Leaves decay faster when trees are cut" },
    CatalogEntry { name: "graves", version: "4.0.4", game_version: "MC 1.21-1.21.10", description: "Player graves automatically created on death" },
    CatalogEntry { name: "more effective tools", version: "1.0.8", game_version: "MC 1.21-1.21.10", description: "More effective tools with enhanced abilities" },
    CatalogEntry { name: "name colors", version: "1.0.12", game_version: "MC 1.21-1.21.10", description: "Colorize player names in chat" },
    CatalogEntry { name: "painting picker", version: "1.1.1", game_version: "MC 1.21-1.21.10", description: "Pick up paintings without destroying them" },
    CatalogEntry { name: "silk touch budding amethyst", version: "1.0.6", game_version: "MC 1.21-1.21.10", description: "Silk touch can be used on budding amethyst" },
    CatalogEntry { name: "storm channeling", version: "1.0.6", game_version: "MC 1.21-1.21.10", description: "Tridents gain channeling during storms" },
    CatalogEntry { name: "track raw statistics", version: "1.7.10", game_version: "MC 1.21-1.21.10", description: "Track raw player statistics" },
    CatalogEntry { name: "villager workstation highlights", version: "1.1.14", game_version: "MC 1.21-1.21.10", description: "Highlight villager workstation blocks" },
    CatalogEntry { name: "wandering trader announcements", version: "1.0.7", game_version: "MC 1.21-1.21.10", description: "Announce wandering trader arrivals" },
];

/// Look up a catalog entry by case-insensitive name and exact version.
pub fn find_in_catalog(name: &str, version: &str) -> Option<&'static CatalogEntry> {
    DATAPACK_CATALOG
        .iter()
        .find(|dp| dp.name.eq_ignore_ascii_case(name) && dp.version == version)
}

/// Case-insensitive substring search over the catalog. An empty query returns
/// everything.
pub fn search_catalog(query: Option<&str>) -> Vec<&'static CatalogEntry> {
    match query {
        Some(q) if !q.is_empty() => {
            let q = q.to_lowercase();
            DATAPACK_CATALOG
                .iter()
                .filter(|dp| dp.name.to_lowercase().contains(&q))
                .collect()
        }
        _ => DATAPACK_CATALOG.iter().collect(),
    }
}
