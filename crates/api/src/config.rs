use std::str::FromStr;

use crate::auth::jwt::{JwtConfig, DEFAULT_EXPIRY_MINS, MAX_EXPIRY_MINS};

/// Output format of the tracing fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres URL. When unset the server runs on in-memory stores.
    pub database_url: Option<String>,
    /// Pool size (default: `20`).
    pub database_max_connections: u32,
    /// Whether completed onboarding records still accept autosaves
    /// (default: `true`).
    pub allow_edits_after_completion: bool,
    /// Minimum sign-up password length (default: `8`).
    pub password_min_length: usize,
    pub log_format: LogFormat,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                                   | Default                 |
    /// |-------------------------------------------|-------------------------|
    /// | `HOST`                                    | `0.0.0.0`               |
    /// | `PORT`                                    | `5001`                  |
    /// | `CORS_ORIGINS`                            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`                    | `30`                    |
    /// | `DATABASE_URL`                            | unset (in-memory)       |
    /// | `DATABASE_MAX_CONNECTIONS`                | `20`                    |
    /// | `ONBOARDING_ALLOW_EDITS_AFTER_COMPLETION` | `true`                  |
    /// | `PASSWORD_MIN_LENGTH`                     | `8`                     |
    /// | `LOG_FORMAT`                              | `pretty`                |
    /// | `JWT_SECRET`                              | **required**            |
    /// | `JWT_EXPIRY_MINS`                         | `1440`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "PORT", 5001u16)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 20u32)?;
        let allow_edits_after_completion =
            parse_or(&lookup, "ONBOARDING_ALLOW_EDITS_AFTER_COMPLETION", true)?;
        let password_min_length = parse_or(&lookup, "PASSWORD_MIN_LENGTH", 8usize)?;
        let log_format = parse_or(&lookup, "LOG_FORMAT", LogFormat::default())?;

        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let expiry_mins = parse_or(&lookup, "JWT_EXPIRY_MINS", DEFAULT_EXPIRY_MINS)?;
        if !(1..=MAX_EXPIRY_MINS).contains(&expiry_mins) {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRY_MINS",
                value: expiry_mins.to_string(),
                reason: format!("must be between 1 and {MAX_EXPIRY_MINS}"),
            });
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            database_max_connections,
            allow_edits_after_completion,
            password_min_length,
            log_format,
            jwt: JwtConfig {
                secret,
                expiry_mins,
            },
        })
    }
}

/// Parse `key` if present, otherwise fall back to `default`.
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
