use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::leads::ingest::SYNTHETIC_COUNT_RANGE;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let timeline_days = match env::var("APP_TIMELINE_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| (1..=MAX_TIMELINE_DAYS).contains(days))
                .ok_or(ConfigError::InvalidTimelineDays { value: raw })?,
            Err(_) => DEFAULT_TIMELINE_DAYS,
        };

        let synthetic_count = match env::var("APP_SYNTHETIC_COUNT") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidSyntheticCount { value: raw })?,
            Err(_) => DEFAULT_SYNTHETIC_COUNT,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            analytics: AnalyticsConfig {
                timeline_days,
                synthetic_count: clamp_synthetic_count(synthetic_count),
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub const DEFAULT_TIMELINE_DAYS: u32 = 30;
pub const MAX_TIMELINE_DAYS: u32 = 365;
pub const DEFAULT_SYNTHETIC_COUNT: usize = 25;

/// Defaults applied by the analysis surfaces when a request does not override them.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub timeline_days: u32,
    pub synthetic_count: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timeline_days: DEFAULT_TIMELINE_DAYS,
            synthetic_count: DEFAULT_SYNTHETIC_COUNT,
        }
    }
}

/// Clamp a requested synthetic lead count into the supported range.
pub fn clamp_synthetic_count(count: usize) -> usize {
    count.clamp(*SYNTHETIC_COUNT_RANGE.start(), *SYNTHETIC_COUNT_RANGE.end())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimelineDays { value: String },
    InvalidSyntheticCount { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimelineDays { value } => write!(
                f,
                "APP_TIMELINE_DAYS must be between 1 and {MAX_TIMELINE_DAYS} (got '{value}')"
            ),
            ConfigError::InvalidSyntheticCount { value } => write!(
                f,
                "APP_SYNTHETIC_COUNT must be a non-negative integer (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimelineDays { .. }
            | ConfigError::InvalidSyntheticCount { .. } => None,
        }
    }
}
