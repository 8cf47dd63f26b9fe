pub mod backups;
pub mod cache;
pub mod datapacks;
pub mod history;
pub mod render;
pub mod scaling;
pub mod servers;
