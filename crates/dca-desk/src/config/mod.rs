use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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

/// Top-level configuration for the case desk.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub triage: TriageConfig,
    pub portfolio: PortfolioConfig,
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

        let model_path = env::var("APP_MODEL_PATH")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        let trend_months = match env::var("APP_TREND_MONTHS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|months| (1..=MAX_TREND_MONTHS).contains(months))
                .ok_or(ConfigError::InvalidTrendMonths)?,
            Err(_) => DEFAULT_TREND_MONTHS,
        };

        let seed_demo_portfolio = match env::var("APP_SEED_DEMO") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidSeedFlag)?,
            Err(_) => environment != AppEnvironment::Production,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            triage: TriageConfig { model_path },
            portfolio: PortfolioConfig {
                trend_months,
                seed_demo_portfolio,
            },
        })
    }
}

pub const DEFAULT_TREND_MONTHS: u32 = 3;
pub const MAX_TREND_MONTHS: u32 = 24;

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
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

/// Where to find an optional trained model artifact.
#[derive(Debug, Clone, Default)]
pub struct TriageConfig {
    pub model_path: Option<PathBuf>,
}

/// Portfolio analytics and in-memory store settings.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    pub trend_months: u32,
    pub seed_demo_portfolio: bool,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            trend_months: DEFAULT_TREND_MONTHS,
            seed_demo_portfolio: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTrendMonths,
    InvalidSeedFlag,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTrendMonths => write!(
                f,
                "APP_TREND_MONTHS must be an integer between 1 and {MAX_TREND_MONTHS}"
            ),
            ConfigError::InvalidSeedFlag => write!(f, "APP_SEED_DEMO must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTrendMonths
            | ConfigError::InvalidSeedFlag => None,
        }
    }
}
