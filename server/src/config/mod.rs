use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::SecurityHeadersLayer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/voyage";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_QR_MIN_SIZE: u32 = 240;
const DEV_JWT_SECRET: &str = "voyage-development-secret";

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8081,http://localhost:19006";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub production: bool,
    pub cors_allowed_origins: Vec<String>,
    pub qr_min_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            production: false,
            cors_allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            qr_min_size: DEFAULT_QR_MIN_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = lookup("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if production => return Err(ConfigError::Missing("JWT_SECRET")),
            None => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let bind_addr = parse_or("BIND_ADDR", lookup("BIND_ADDR"), DEFAULT_BIND_ADDR)?;
        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            lookup("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        let qr_min_size = parse_or("QR_MIN_SIZE", lookup("QR_MIN_SIZE"), DEFAULT_QR_MIN_SIZE)?;

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            max_connections,
            jwt_secret,
            production,
            cors_allowed_origins: split_origins(
                &lookup("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
            qr_min_size,
        })
    }
}

fn parse_or<T, D>(key: &'static str, raw: Option<String>, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    D: ToString,
{
    let value = raw.unwrap_or_else(|| default.to_string());
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::Invalid { key, value }),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
