//! Curbwatch service configuration.
//!
//! Configuration is loaded from environment variables. The token signing
//! secret is redacted in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default access-token lifetime (30 minutes).
pub const DEFAULT_ACCESS_TTL_SECONDS: u64 = 1800;

/// Default refresh-token lifetime (7 days).
pub const DEFAULT_REFRESH_TTL_SECONDS: u64 = 604_800;

/// Default clock-skew tolerance applied to expiry checks (60 seconds).
///
/// Absorbs clock drift between issuing and validating hosts. Fixed per
/// process at startup; never widened per call.
pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 60;

/// Upper bound on the configurable clock-skew tolerance (5 minutes).
///
/// Prevents a misconfiguration from effectively disabling expiry.
pub const MAX_CLOCK_SKEW_SECONDS: i64 = 300;

/// Default directory served under `/uploads`.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Service configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Token signing secret as configured: base64 or literal bytes.
    /// Decoded exactly once into key material at startup.
    pub token_secret: String,

    /// Access-token lifetime in seconds.
    pub access_ttl_seconds: u64,

    /// Refresh-token lifetime in seconds.
    pub refresh_ttl_seconds: u64,

    /// Clock-skew tolerance in seconds for expiry checks.
    pub clock_skew_seconds: i64,

    /// Allowed CORS origins. Empty means allow any origin.
    pub cors_allowed_origins: Vec<String>,

    /// Optional exemption-list override (see `auth::policy::ExemptionList`).
    pub exempt_paths: Option<String>,

    /// Directory served as static uploads.
    pub upload_dir: String,
}

/// Custom Debug implementation that redacts the signing secret.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("token_secret", &"[REDACTED]")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("clock_skew_seconds", &self.clock_skew_seconds)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("exempt_paths", &self.exempt_paths)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token TTL configuration: {0}")]
    InvalidTtl(String),

    #[error("Invalid clock skew configuration: {0}")]
    InvalidClockSkew(String),

    #[error("Invalid token secret: {0}")]
    InvalidTokenSecret(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let token_secret = vars
            .get("CW_TOKEN_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("CW_TOKEN_SECRET".to_string()))?
            .clone();

        if token_secret.trim().is_empty() {
            return Err(ConfigError::InvalidTokenSecret(
                "CW_TOKEN_SECRET must not be blank".to_string(),
            ));
        }

        let access_ttl_seconds =
            parse_ttl(vars, "CW_ACCESS_TTL_SECONDS", DEFAULT_ACCESS_TTL_SECONDS)?;
        let refresh_ttl_seconds =
            parse_ttl(vars, "CW_REFRESH_TTL_SECONDS", DEFAULT_REFRESH_TTL_SECONDS)?;

        let clock_skew_seconds = match vars.get("CW_CLOCK_SKEW_SECONDS") {
            Some(value_str) => {
                let value: i64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidClockSkew(format!(
                        "CW_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                        value_str, e
                    ))
                })?;
                if !(0..=MAX_CLOCK_SKEW_SECONDS).contains(&value) {
                    return Err(ConfigError::InvalidClockSkew(format!(
                        "CW_CLOCK_SKEW_SECONDS must be between 0 and {}, got {}",
                        MAX_CLOCK_SKEW_SECONDS, value
                    )));
                }
                value
            }
            None => DEFAULT_CLOCK_SKEW_SECONDS,
        };

        let cors_allowed_origins = vars
            .get("CW_CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let exempt_paths = vars.get("CW_EXEMPT_PATHS").cloned();

        let upload_dir = vars
            .get("CW_UPLOAD_DIR")
            .cloned()
            .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string());

        Ok(Config {
            database_url,
            bind_address,
            token_secret,
            access_ttl_seconds,
            refresh_ttl_seconds,
            clock_skew_seconds,
            cors_allowed_origins,
            exempt_paths,
            upload_dir,
        })
    }
}

fn parse_ttl(
    vars: &HashMap<String, String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match vars.get(key) {
        Some(value_str) => {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTtl(format!(
                    "{} must be a positive integer, got '{}': {}",
                    key, value_str, e
                ))
            })?;
            if value == 0 {
                return Err(ConfigError::InvalidTtl(format!("{} must not be zero", key)));
            }
            Ok(value)
        }
        None => Ok(default),
    }
}
