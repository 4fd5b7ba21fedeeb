//! Application configuration
//!
//! Loaded once from the environment in `main` and handed to each
//! component at construction time. There is no global config state:
//! everything that needs a setting receives it explicitly.

use config::{Config, Environment};
use serde::Deserialize;

use crate::errors::{QrLinkError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub links: LinkConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Counter store for the rate limiter. When no URL is configured the
/// limiter falls back to in-process fixed windows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_redis_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests admitted per client per window on the public redirect route
    #[serde(default = "default_redirect_limit")]
    pub redirect_limit: u64,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecorderConfig {
    #[serde(default = "default_recorder_workers")]
    pub workers: usize,
    /// Bounded dispatch queue; events beyond this are dropped and counted
    #[serde(default = "default_recorder_queue")]
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    /// Public base URL used to build trackable scan content
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://qrlink.db?mode=rwc".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_redis_prefix() -> String {
    "qrlink".to_string()
}

fn default_redirect_limit() -> u64 {
    60
}

fn default_window_secs() -> u64 {
    60
}

fn default_recorder_workers() -> usize {
    2
}

fn default_recorder_queue() -> usize {
    4096
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_code_length() -> usize {
    6
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            pool_size: default_pool_size(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            redirect_limit: default_redirect_limit(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            workers: default_recorder_workers(),
            queue_capacity: default_recorder_queue(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            code_length: default_code_length(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            rate_limit: RateLimitConfig::default(),
            recorder: RecorderConfig::default(),
            links: LinkConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `QRLINK_*` environment variables, e.g.
    /// `QRLINK_SERVER__PORT=9000` or `QRLINK_DATABASE__URL=postgres://...`
    pub fn from_env() -> Result<Self> {
        Config::builder()
            .add_source(Environment::with_prefix("QRLINK").separator("__"))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| QrLinkError::validation(format!("Invalid configuration: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.links.code_length, 6);
        assert!(cfg.redis.url.is_none());
        assert!(cfg.recorder.queue_capacity > 0);
    }
}
