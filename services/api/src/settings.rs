//! HTTP server settings

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::{net::SocketAddr, time::Duration};

/// Server settings, read from the environment with defaults
///
/// - `PORT` (default: 3000)
/// - `MAX_UPLOAD_BYTES` (default: 100 MiB)
/// - `REQUEST_TIMEOUT_SECS` (default: 60)
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("port", 3000)?
            .set_default("max_upload_bytes", 100 * 1024 * 1024)?
            .set_default("request_timeout_secs", 60)?
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 3000,
            max_upload_bytes: 100 * 1024 * 1024,
            request_timeout_secs: 60,
        }
    }
}
