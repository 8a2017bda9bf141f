//! Environment-driven configuration

use serde::Deserialize;

use crate::{ApiError, Result};

/// Service configuration, read from the process environment.
///
/// `DATABASE_URL` is required; `HOST`, `PORT` and
/// `DATABASE_MAX_CONNECTIONS` fall back to defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    pub fn from_env() -> Result<Self> {
        envy::from_env().map_err(|e| ApiError::Config(e.to_string()))
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
