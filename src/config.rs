//! Configuration loader and validator for the seat checker.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::ryanair::seatmap::RowCountMethod;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub http: Http,
    pub ryanair: Ryanair,
    pub ntfy: Ntfy,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub poll_interval_secs: u64,
    /// Deadline for one whole check; 0 disables it.
    pub check_timeout_secs: u64,
}

/// Outbound HTTP behaviour shared by every upstream call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Http {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Extra attempts for GET requests. Other methods are never retried.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

/// Airline API location and endpoint paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ryanair {
    pub base_url: String,
    pub paths: RyanairPaths,
    #[serde(default)]
    pub row_count: RowCountMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RyanairPaths {
    pub login: String,
    pub orders: String,
    pub booking: String,
    pub basket: String,
    pub seats: String,
    pub seatmap: String,
}

/// Notification sink settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ntfy {
    pub base_url: String,
}

impl App {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn check_timeout(&self) -> Option<Duration> {
        (self.check_timeout_secs > 0).then(|| Duration::from_secs(self.check_timeout_secs))
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Parse and validate a YAML document.
pub fn parse(content: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(content)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.poll_interval_secs == 0 {
        return Err(ConfigError::Invalid("app.poll_interval_secs must be > 0"));
    }

    if cfg.http.timeout_secs == 0 {
        return Err(ConfigError::Invalid("http.timeout_secs must be > 0"));
    }
    if cfg.http.connect_timeout_secs == 0 {
        return Err(ConfigError::Invalid("http.connect_timeout_secs must be > 0"));
    }
    if cfg.http.max_backoff_ms < cfg.http.retry_backoff_ms {
        return Err(ConfigError::Invalid(
            "http.max_backoff_ms must be >= http.retry_backoff_ms",
        ));
    }

    if !is_http_url(&cfg.ryanair.base_url) {
        return Err(ConfigError::Invalid("ryanair.base_url must be an http(s) URL"));
    }
    let p = &cfg.ryanair.paths;
    if p.login.trim().is_empty() {
        return Err(ConfigError::Invalid("ryanair.paths.login must be non-empty"));
    }
    if p.orders.trim().is_empty() {
        return Err(ConfigError::Invalid("ryanair.paths.orders must be non-empty"));
    }
    if p.booking.trim().is_empty() {
        return Err(ConfigError::Invalid("ryanair.paths.booking must be non-empty"));
    }
    if p.basket.trim().is_empty() {
        return Err(ConfigError::Invalid("ryanair.paths.basket must be non-empty"));
    }
    if p.seats.trim().is_empty() {
        return Err(ConfigError::Invalid("ryanair.paths.seats must be non-empty"));
    }
    if p.seatmap.trim().is_empty() {
        return Err(ConfigError::Invalid("ryanair.paths.seatmap must be non-empty"));
    }

    if !is_http_url(&cfg.ntfy.base_url) {
        return Err(ConfigError::Invalid("ntfy.base_url must be an http(s) URL"));
    }

    Ok(())
}

fn is_http_url(raw: &str) -> bool {
    reqwest::Url::parse(raw.trim())
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Returns the example YAML content.
pub fn example() -> &'static str {
    r#"app:
  poll_interval_secs: 900
  check_timeout_secs: 120

http:
  timeout_secs: 30
  connect_timeout_secs: 10
  max_retries: 2
  retry_backoff_ms: 500
  max_backoff_ms: 8000

ryanair:
  base_url: "https://www.ryanair.com"
  paths:
    login: "api/usrprof/v2/accountLogin"
    orders: "api/orders/v2/orders"
    booking: "api/bookingfa/en-gb/graphql"
    basket: "api/basketapi/en-gb/graphql"
    seats: "api/catalogapi/en-gb/graphql"
    seatmap: "api/booking/v5/en-ie/res/seatmap"
  row_count: row_list

ntfy:
  base_url: "https://ntfy.sh"
"#
}
