//! Process configuration.
//!
//! Resolved once at startup and passed down; nothing reads the environment
//! during request handling.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use medthing_ai::GeminiConfig;

use crate::rate_limit::RateLimitConfig;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub gemini: GeminiConfig,
    pub rate_limit: RateLimitConfig,
    /// Selects the Postgres-backed stores when set.
    pub database_url: Option<String>,
    /// JSON fixture for the in-memory patient directory.
    pub seed_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let defaults = GeminiConfig::default();
        let gemini = GeminiConfig {
            api_key: get("GENAI_API_KEY"),
            model: get("GENAI_MODEL").unwrap_or(defaults.model),
            temperature: parse_or(&get, "GENAI_TEMPERATURE", defaults.temperature)?,
            base_url: get("GENAI_BASE_URL").unwrap_or(defaults.base_url),
        };
        if gemini.api_key.is_none() {
            warn!("GENAI_API_KEY not set; report generation will fail");
        }

        let rl = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            max: parse_or(&get, "RATE_LIMIT_MAX", rl.max)?,
            window: secs_or(&get, "RATE_LIMIT_WINDOW_SECS", rl.window)?,
            sweep_interval: secs_or(&get, "RATE_LIMIT_SWEEP_SECS", rl.sweep_interval)?,
        };
        if rate_limit.max == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_MAX",
                value: "0".to_string(),
                reason: "must admit at least one request".to_string(),
            });
        }

        Ok(Self {
            bind_host: get("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8000)?,
            jwt_secret,
            gemini,
            rate_limit,
            database_url: get("DATABASE_URL"),
            seed_file: get("MEDTHING_SEED_FILE").map(PathBuf::from),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.bind_host, self.port);
        raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key: "BIND_HOST",
            value: raw.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_or<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn secs_or<G>(get: &G, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(get, key, default.as_secs())?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
            reason: "must be at least one second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
