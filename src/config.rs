//! Environment configuration for the binaries.
//!
//! Values come from the process environment, with a `.env` file loaded first
//! when present.

use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WEB_PORT: u16 = 5173;
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

impl DatabaseConfig {
    /// Database settings alone, for the seed binary.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        database_from_lookup(&|name: &str| dotenvy::var(name).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Postgres(DatabaseConfig),
    Memory,
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return AllowedOrigins::Any;
        }
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: Storage,
    pub allowed_origins: AllowedOrigins,
    pub port: u16,
    pub seed_if_empty: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = storage_from_lookup(&lookup)?;
        let allowed_origins = lookup("CLIENT_ORIGIN")
            .map(|raw| AllowedOrigins::parse(&raw))
            .unwrap_or(AllowedOrigins::Any);
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let seed_if_empty = lookup("SEED_IF_EMPTY").is_some();

        Ok(Config {
            storage,
            allowed_origins,
            port,
            seed_if_empty,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Settings for the standalone viewer, which talks to a remote API.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub api_base_url: String,
    pub port: u16,
}

impl WebConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "API_BASE_URL",
                value: api_base_url,
            });
        }
        let port = parse_or("WEB_PORT", lookup("WEB_PORT"), DEFAULT_WEB_PORT)?;
        Ok(WebConfig { api_base_url, port })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn storage_from_lookup<F>(lookup: &F) -> Result<Storage, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("STORAGE").as_deref().map(str::trim) {
        None | Some("") | Some("postgres") => database_from_lookup(lookup).map(Storage::Postgres),
        Some("memory") => Ok(Storage::Memory),
        Some(other) => Err(ConfigError::Invalid {
            name: "STORAGE",
            value: other.to_string(),
        }),
    }
}

fn database_from_lookup<F>(lookup: &F) -> Result<DatabaseConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
    let pool_size = parse_or("DATABASE_POOL_SIZE", lookup("DATABASE_POOL_SIZE"), DEFAULT_POOL_SIZE)?;
    if pool_size == 0 {
        return Err(ConfigError::Invalid {
            name: "DATABASE_POOL_SIZE",
            value: "0".into(),
        });
    }
    Ok(DatabaseConfig { url, pool_size })
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
