//! Environment configuration.
//!
//! Every service reads:
//!   BIND_ADDR          — listen address (default per service)
//!   STORE_BACKEND      — `postgres` (default) or `memory`
//!   DATABASE_URL       — required for the postgres backend
//!   DATABASE_POOL_SIZE — max pool connections (default: 10)
//!
//! The bank service additionally reads:
//!   DETAILS_SERVICE_URLS, DOCUMENTS_SERVICE_URLS — comma-separated base URLs
//!   DOWNSTREAM_BACKOFF_MS, DOWNSTREAM_MAX_ATTEMPTS, DOWNSTREAM_TIMEOUT_MS
//!   CIRCUIT_FAILURE_THRESHOLD, CIRCUIT_OPEN_SECS
//!   DETAILS_ON_FAILURE, DOCUMENTS_ON_FAILURE — `fail-open` or `propagate`
//!
//! Values are read through a lookup function so tests can supply them
//! without touching the process environment. A value that is set but does
//! not parse is an error, never a silent default.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use url::Url;

use registry_client::HttpClientConfig;
use registry_core::circuit::{CircuitConfig, DEFAULT_FAILURE_THRESHOLD, DEFAULT_OPEN_SECS};
use registry_core::downstream::{DownstreamPolicy, FailurePolicy};
use registry_core::retry::{RetryConfig, DEFAULT_BACKOFF_MILLIS, DEFAULT_MAX_ATTEMPTS};
use registry_postgres::DatabaseConfig;

pub const BANK_SERVICE_ADDR: &str = "0.0.0.0:8080";
pub const DETAILS_SERVICE_ADDR: &str = "0.0.0.0:8081";
pub const DOCUMENTS_SERVICE_ADDR: &str = "0.0.0.0:8082";

const DEFAULT_DETAILS_URL: &str = "http://localhost:8081/api/bank-details";
const DEFAULT_DOCUMENTS_URL: &str = "http://localhost:8082/api/documents";
const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown store backend '{other}' (expected 'postgres' or 'memory')"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Postgres(DatabaseConfig),
    Memory,
}

/// Settings shared by all three services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl ServiceConfig {
    pub fn from_env(default_bind: &str) -> Result<Self> {
        Self::from_lookup(env_lookup, default_bind)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, default_bind: &str) -> Result<Self> {
        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => parse_value("BIND_ADDR", &raw)?,
            None => default_bind
                .parse()
                .with_context(|| format!("invalid default bind address {default_bind}"))?,
        };

        let backend = parsed(&lookup, "STORE_BACKEND", StoreBackend::Postgres)?;
        let store = match backend {
            StoreBackend::Memory => StoreConfig::Memory,
            StoreBackend::Postgres => {
                let database_url = lookup("DATABASE_URL").ok_or_else(|| {
                    anyhow!("DATABASE_URL must be set when STORE_BACKEND=postgres")
                })?;
                let defaults = DatabaseConfig::default();
                let max_connections =
                    parsed(&lookup, "DATABASE_POOL_SIZE", defaults.max_connections)?;
                StoreConfig::Postgres(DatabaseConfig {
                    database_url,
                    max_connections,
                    ..defaults
                })
            }
        };

        Ok(Self { bind_addr, store })
    }
}

/// Where the bank service finds its downstream dependencies and how it
/// treats their failures.
#[derive(Debug, Clone)]
pub struct DownstreamConfig {
    pub details_urls: Vec<Url>,
    pub documents_urls: Vec<Url>,
    pub http: HttpClientConfig,
    pub details: DownstreamPolicy,
    pub documents: DownstreamPolicy,
}

impl DownstreamConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let details_urls = url_list(&lookup, "DETAILS_SERVICE_URLS", DEFAULT_DETAILS_URL)?;
        let documents_urls = url_list(&lookup, "DOCUMENTS_SERVICE_URLS", DEFAULT_DOCUMENTS_URL)?;

        let retry = RetryConfig {
            backoff_millis: parsed(&lookup, "DOWNSTREAM_BACKOFF_MS", DEFAULT_BACKOFF_MILLIS)?,
            max_attempts: parsed(&lookup, "DOWNSTREAM_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
        };
        let circuit = CircuitConfig {
            failure_threshold: parsed(
                &lookup,
                "CIRCUIT_FAILURE_THRESHOLD",
                DEFAULT_FAILURE_THRESHOLD,
            )?,
            open_for: Duration::from_secs(parsed(&lookup, "CIRCUIT_OPEN_SECS", DEFAULT_OPEN_SECS)?),
        };

        let timeout = Duration::from_millis(parsed(
            &lookup,
            "DOWNSTREAM_TIMEOUT_MS",
            DEFAULT_TIMEOUT_MS,
        )?);
        if timeout.is_zero() {
            bail!("DOWNSTREAM_TIMEOUT_MS must be greater than zero");
        }
        let http = HttpClientConfig {
            timeout,
            connect_timeout: timeout.min(MAX_CONNECT_TIMEOUT),
        };

        let policy = |on_failure| DownstreamPolicy {
            retry,
            circuit,
            on_failure,
        };
        Ok(Self {
            details_urls,
            documents_urls,
            http,
            details: policy(parsed(&lookup, "DETAILS_ON_FAILURE", FailurePolicy::Propagate)?),
            documents: policy(parsed(&lookup, "DOCUMENTS_ON_FAILURE", FailurePolicy::FailOpen)?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct BankServiceConfig {
    pub service: ServiceConfig,
    pub downstream: DownstreamConfig,
}

impl BankServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            service: ServiceConfig::from_lookup(&lookup, BANK_SERVICE_ADDR)?,
            downstream: DownstreamConfig::from_lookup(&lookup)?,
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("invalid value for {key} ({raw:?}): {e}"))
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn url_list(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<Vec<Url>> {
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    let urls = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_value::<Url>(key, s))
        .collect::<Result<Vec<_>>>()?;
    if urls.is_empty() {
        bail!("{key} must list at least one base URL");
    }
    Ok(urls)
}
