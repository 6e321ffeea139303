use std::{env, str::FromStr, time::Duration};

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_PORT: u16 = 5432;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
    #[error("invalid value for environment variable `{0}`")]
    InvalidVar(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local state, lost on restart.
    Memory,
}

/// Where the Postgres connection comes from.
#[derive(Debug, Clone)]
pub enum DatabaseTarget {
    Url(SecretString),
    /// Individual settings, passed to the driver as-is so credentials need no escaping.
    Parts {
        host: String,
        port: u16,
        user: String,
        password: SecretString,
        name: String,
    },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// `SERVER_DATABASE_URL` or `DATABASE_URL` win; otherwise the connection is
    /// described by the individual `DB_*` variables.
    fn from_env() -> Result<Self, ConfigError> {
        let target = match env::var("SERVER_DATABASE_URL").or_else(|_| env::var("DATABASE_URL")) {
            Ok(url) if !url.is_empty() => {
                if PgConnectOptions::from_str(&url).is_err() {
                    return Err(ConfigError::InvalidVar("DATABASE_URL"));
                }
                DatabaseTarget::Url(SecretString::new(url.into()))
            }
            _ => DatabaseTarget::Parts {
                host: required_var("DB_HOST")?,
                port: match env::var("DB_PORT") {
                    Ok(v) if !v.is_empty() => {
                        v.parse().map_err(|_| ConfigError::InvalidVar("DB_PORT"))?
                    }
                    _ => DEFAULT_DB_PORT,
                },
                user: required_var("DB_USER")?,
                password: SecretString::new(env::var("DB_PASSWORD").unwrap_or_default().into()),
                name: required_var("DB_NAME")?,
            },
        };

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidVar("DB_MAX_CONNECTIONS"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            target,
            max_connections,
        })
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match &self.target {
            DatabaseTarget::Url(url) => PgConnectOptions::from_str(url.expose_secret()),
            DatabaseTarget::Parts {
                host,
                port,
                user,
                password,
                name,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password.expose_secret())
                .database(name)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub request_timeout: Duration,
    pub backend: StoreBackend,
    /// Only present for the Postgres backend.
    pub database: Option<DatabaseConfig>,
    /// Fixed seed for reviewer sampling; OS randomness when unset.
    pub reviewer_seed: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match env::var("SERVER_LISTEN_ADDR") {
            Ok(addr) if !addr.is_empty() => addr,
            _ => match (env::var("HTTP_SERVER_ADDRESS"), env::var("HTTP_SERVER_PORT")) {
                (Ok(host), Ok(port)) if !port.is_empty() => format!("{host}:{port}"),
                (Err(_), Ok(port)) if !port.is_empty() => format!("0.0.0.0:{port}"),
                _ => DEFAULT_LISTEN_ADDR.to_string(),
            },
        };

        let request_timeout = match env::var("HTTP_SERVER_TIMEOUT") {
            Ok(v) => parse_request_timeout(&v)?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT,
        };

        let backend = match env::var("STORE_BACKEND") {
            Ok(v) if v.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            Ok(v) if v.is_empty() || v.eq_ignore_ascii_case("postgres") => StoreBackend::Postgres,
            Ok(_) => return Err(ConfigError::InvalidVar("STORE_BACKEND")),
            Err(_) => StoreBackend::Postgres,
        };

        let database = match backend {
            StoreBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        let reviewer_seed = match env::var("REVIEWER_SEED") {
            Ok(v) => Some(
                v.parse()
                    .map_err(|_| ConfigError::InvalidVar("REVIEWER_SEED"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            listen_addr,
            request_timeout,
            backend,
            database,
            reviewer_seed,
        })
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn parse_request_timeout(value: &str) -> Result<Duration, ConfigError> {
    parse_duration(value)
        .filter(|timeout| !timeout.is_zero())
        .ok_or(ConfigError::InvalidVar("HTTP_SERVER_TIMEOUT"))
}

/// Accepts plain seconds (`15`) or a value suffixed with `ms`, `s` or `m`.
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Some(ms) = value.strip_suffix("ms") {
        return ms.trim().parse().ok().map(Duration::from_millis);
    }
    if let Some(secs) = value.strip_suffix('s') {
        return secs.trim().parse().ok().map(Duration::from_secs);
    }
    if let Some(mins) = value.strip_suffix('m') {
        return mins
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs);
    }
    value.parse().ok().map(Duration::from_secs)
}
