//! Allow-listed server identities.
//!
//! A server name doubles as a Docker container name and as a filesystem path
//! segment, so nothing outside the fixed allow-list may ever reach either.
//! `ServerName::parse` is the single validation point; every service takes a
//! `ServerName`, not a raw string.

use crate::core::error::AppError;
use serde::Serialize;
use std::fmt;

/// The fixed set of permitted container names.
pub const ALLOWED_SERVERS: [&str; 8] = [
    "mc-ilias",
    "mc-niilo",
    "mc-bgstpoelten",
    "mc-htlstp",
    "mc-borgstpoelten",
    "mc-hakstpoelten",
    "mc-basop-bafep-stp",
    "mc-play",
];

/// A validated, canonical server name drawn from [`ALLOWED_SERVERS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServerName(&'static str);

impl ServerName {
    /// Validate a candidate against the allow-list.
    ///
    /// An exact match is accepted as-is; otherwise the `mc-` prefix is tried
    /// (so `ilias` normalizes to `mc-ilias`). Anything else is rejected.
    pub fn parse(candidate: &str) -> Result<Self, AppError> {
        if let Some(name) = ALLOWED_SERVERS.iter().find(|n| **n == candidate) {
            return Ok(Self(name));
        }
        let prefixed = format!("mc-{candidate}");
        if let Some(name) = ALLOWED_SERVERS.iter().find(|n| **n == prefixed) {
            return Ok(Self(name));
        }
        Err(AppError::InvalidServerName)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// All allow-listed servers, in declaration order.
    pub fn all() -> impl Iterator<Item = ServerName> {
        ALLOWED_SERVERS.iter().map(|n| Self(n))
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
