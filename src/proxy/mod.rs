//! The docker-proxy: the only component allowed to reach the Docker Engine.

pub mod client;
pub mod engine;
pub mod routes;

pub use client::DockerProxyClient;
pub use engine::DockerEngine;
pub use routes::{build_proxy_routes, ProxyState};
