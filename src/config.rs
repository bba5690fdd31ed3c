//! Runtime configuration read from the environment.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::retry::RetryPolicy;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Inactivity window of a session.
    pub session_ttl: Duration,
    /// Lifetime of a staged section; never shorter than `session_ttl`.
    pub staging_ttl: Duration,
    pub cleanup_interval: Duration,
    pub store_retry: RetryPolicy,
    pub commit_retry: RetryPolicy,
    pub cors_origins: Vec<String>,
    /// Enables SQL statement logging.
    pub debug: bool,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8000)))?;
        let session_ttl = Duration::from_secs(parse_or(&lookup, "SESSION_TTL_SECS", 3600u64)?);
        let mut staging_ttl = Duration::from_secs(parse_or(&lookup, "STAGING_TTL_SECS", 3600u64)?);
        if staging_ttl < session_ttl {
            warn!(
                staging_ttl_secs = staging_ttl.as_secs(),
                session_ttl_secs = session_ttl.as_secs(),
                "staging TTL shorter than session TTL, raising it"
            );
            staging_ttl = session_ttl;
        }

        let cleanup_interval =
            Duration::from_secs(parse_or(&lookup, "CLEANUP_INTERVAL_SECS", 300u64)?.max(1));
        let attempt_timeout = Duration::from_millis(parse_or(&lookup, "STORE_TIMEOUT_MS", 5000u64)?);
        let commit_attempts: u32 = parse_or(&lookup, "COMMIT_MAX_ATTEMPTS", 3u32)?;
        let commit_backoff = Duration::from_millis(parse_or(&lookup, "COMMIT_BACKOFF_MS", 200u64)?);

        let store_retry = RetryPolicy {
            attempt_timeout,
            ..RetryPolicy::default()
        };
        let commit_retry = RetryPolicy {
            max_attempts: commit_attempts.max(1),
            initial_backoff: commit_backoff,
            max_backoff: commit_backoff * 10,
            attempt_timeout,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let debug = match lookup("DEBUG") {
            Some(value) => value.trim().eq_ignore_ascii_case("true"),
            None => false,
        };

        Ok(Self {
            database_url,
            bind_addr,
            session_ttl,
            staging_ttl,
            cleanup_interval,
            store_retry,
            commit_retry,
            cors_origins,
            debug,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
