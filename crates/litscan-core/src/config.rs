//! Env-var driven configuration, read once at process startup with the
//! same `from_env`-plus-fallback convention used throughout this codebase.

use std::env;
use std::time::Duration;

use crate::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Docker,
    Production,
    Test,
}

impl Environment {
    pub fn from_env() -> Self {
        match env::var("ENVIRONMENT").ok().as_deref() {
            Some("DOCKER") => Environment::Docker,
            Some("PRODUCTION") => Environment::Production,
            Some("TEST") => Environment::Test,
            _ => Environment::Local,
        }
    }
}

/// Resolves a Postgres connection URL from `DATABASE_URL` or the
/// `POSTGRES_{HOST,PORT,DATABASE,USER,PASSWORD}` quintet.
pub fn database_url() -> String {
    if let Ok(url) = env::var("DATABASE_URL") {
        return url;
    }
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let database = env::var("POSTGRES_DATABASE").unwrap_or_else(|_| "litscan".to_string());
    let user = env::var("POSTGRES_USER").unwrap_or_else(|_| "litscan".to_string());
    let password = env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "litscan".to_string());
    format!("postgres://{user}:{password}@{host}:{port}/{database}")
}

/// Whether the schema should be (re)applied at startup.
pub fn should_migrate() -> bool {
    env::var("MIGRATE")
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
        .unwrap_or(false)
}

fn parse_env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(fallback)
}

/// Shared `HOST`/`PORT` pair for the producer and consumer HTTP servers.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env_with_default_port(default_port: u16) -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env_or("PORT", default_port),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The address this consumer registers under, as reachable by the
/// producer. Distinct from `HOST` (the local bind address, often
/// `0.0.0.0`): defaults to loopback for single-machine deployments, but
/// should be set explicitly wherever producer and consumers run on
/// separate hosts.
pub fn consumer_advertised_ip() -> String {
    env::var("CONSUMER_IP").unwrap_or_else(|_| "127.0.0.1".to_string())
}

/// Europe PMC client configuration.
#[derive(Debug, Clone)]
pub struct EpmcConfig {
    pub base_url: String,
}

impl EpmcConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("EUROPE_PMC")
                .unwrap_or_else(|_| "https://www.ebi.ac.uk/europepmc/webservices/rest".to_string()),
        }
    }
}

/// Producer scheduler timing, overridable for tests that can't wait 3-4s.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub poll_interval: Duration,
    pub dispatch_timeout: Duration,
}

impl ProducerConfig {
    pub fn from_env() -> Self {
        Self {
            poll_interval: Duration::from_millis(parse_env_or(
                "PRODUCER_POLL_INTERVAL_MS",
                defaults::PRODUCER_POLL_INTERVAL_MS,
            )),
            dispatch_timeout: Duration::from_secs(parse_env_or(
                "DISPATCH_TIMEOUT_SECS",
                defaults::DISPATCH_TIMEOUT_SECS,
            )),
        }
    }
}

/// Consumer worker timing.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub registration_refresh: Duration,
    pub rate_limit_sleep: Duration,
}

impl ConsumerConfig {
    pub fn from_env() -> Self {
        Self {
            registration_refresh: Duration::from_secs(parse_env_or(
                "CONSUMER_REGISTRATION_REFRESH_SECS",
                defaults::CONSUMER_REGISTRATION_REFRESH_SECS,
            )),
            rate_limit_sleep: Duration::from_millis(parse_env_or(
                "RATE_LIMIT_SLEEP_MS",
                defaults::RATE_LIMIT_SLEEP_MS,
            )),
        }
    }
}

/// Relevance Classifier backend configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub url: Option<String>,
    pub batch_size: i64,
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        Self {
            url: env::var("CLASSIFIER_URL").ok(),
            batch_size: parse_env_or("CLASSIFIER_BATCH_SIZE", defaults::CLASSIFIER_DEFAULT_BATCH_SIZE),
        }
    }
}

/// CORS allow-list for the Producer's HTTP API.
pub fn allowed_origins() -> Vec<String> {
    env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
