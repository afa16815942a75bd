//! Configuration data types.

use crate::resolver::DEFAULT_LOOKUP_PREFIX;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// Metrics server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Access control settings
    #[serde(default)]
    pub access: AccessConfig,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Metrics server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_server_address")]
    pub address: SocketAddr,

    /// Path of the gated metrics endpoint
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_server_address(),
            path: default_metrics_path(),
        }
    }
}

/// Access control configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessConfig {
    /// Swarm service whose tasks may scrape. Empty disables access control.
    #[serde(default)]
    pub service: String,

    /// Prefix turning the service name into its task lookup name
    #[serde(default = "default_lookup_prefix")]
    pub lookup_prefix: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            service: String::new(),
            lookup_prefix: default_lookup_prefix(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_server_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9090))
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_lookup_prefix() -> String {
    DEFAULT_LOOKUP_PREFIX.to_string()
}
