//! Environment-driven configuration.
//!
//! All settings are read once at process start; there is no hot reload.

use std::path::PathBuf;

use crate::container::FilterConfig;
use crate::{Error, Result};

/// Secret used when `JWT_SECRET` is not configured. Development only.
const DEFAULT_JWT_SECRET: &str = "dockwatch-dev-secret";

/// Default HTTP listen port.
const DEFAULT_PORT: u16 = 3001;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Docker socket path override (`DOCKER_SOCKET_PATH`).
    pub docker_socket: Option<String>,
    /// Container name/state allow-lists.
    pub filter: FilterConfig,
    /// Token signing secret.
    pub jwt_secret: String,
    /// Configured login username.
    pub username: String,
    /// Configured login password.
    pub password: String,
    /// HTTP listen port.
    pub port: u16,
    /// Optional directory of built frontend assets to serve.
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docker_socket: None,
            filter: FilterConfig::default(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT value: {raw}")))?,
            Err(_) => DEFAULT_PORT,
        };

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let names = std::env::var("MONITORED_CONTAINERS")
            .ok()
            .as_deref()
            .and_then(parse_allow_list);
        let states = std::env::var("MONITORED_STATES")
            .ok()
            .as_deref()
            .and_then(parse_allow_list)
            .map(|entries| entries.iter().map(|s| s.to_lowercase()).collect());

        Ok(Self {
            docker_socket: std::env::var("DOCKER_SOCKET_PATH").ok(),
            filter: FilterConfig { names, states },
            jwt_secret,
            username: std::env::var("AUTH_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            password: std::env::var("AUTH_PASSWORD").unwrap_or_else(|_| {
                tracing::warn!("AUTH_PASSWORD not set, using development default");
                "admin".to_string()
            }),
            port,
            static_dir: std::env::var("STATIC_DIR").ok().map(PathBuf::from),
        })
    }
}

/// Parse a comma-separated allow-list.
///
/// An empty string or the literal `all` (case-insensitive) means no
/// filtering and yields `None`. Entries are trimmed; empty entries are
/// dropped.
pub fn parse_allow_list(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return None;
    }

    let entries: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();

    if entries.is_empty() { None } else { Some(entries) }
}
