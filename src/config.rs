// Configuration management

use crate::core::models::GatewayCredentials;
use crate::core::secret::MasterSecret;
use crate::payments::MIN_ORDER_MINOR_UNITS;
use secrecy::Secret;
use std::env;
use thiserror::Error;

/// Startup configuration failures. These never reach callers; the process
/// refuses to serve instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{0}")]
    Invalid(String),
}

/// Application configuration loaded from environment variables
///
/// Everything is parsed and validated once at startup; request handlers only
/// ever see the parsed form. In particular the master secret's shape
/// (hex vs raw) is resolved here, not re-sniffed per call.
#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub bind_address: String,
    pub port: u16,

    // Identity verification
    pub auth_jwt_secret: Secret<String>,

    // Key derivation
    pub master_secret: Option<MasterSecret>,

    // Payment gateway
    pub gateway_credentials: Option<GatewayCredentials>,
    pub gateway_api_url: String,
    pub order_max_minor_units: i64,
    pub receipt_prefix: String,

    // Group document store
    pub group_store_url: String,
    pub group_store_token: Option<Secret<String>>,

    // Outbound timeouts
    pub gateway_timeout_secs: u64,
    pub store_timeout_secs: u64,

    // Middleware configuration
    pub request_timeout_secs: u64,
    pub body_size_limit_bytes: usize,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok(); // Ignore errors (file may not exist)
        }

        let master_secret = match Self::get_optional_env("DATA_ENCRYPTION_MASTER_KEY") {
            Some(raw) => Some(MasterSecret::parse(&raw).map_err(ConfigError::Invalid)?),
            None => None,
        };

        // Credentials count as configured only when both halves are present;
        // a partial pair behaves exactly like no configuration at all.
        let gateway_credentials = match (
            Self::get_optional_env("RAZORPAY_KEY_ID"),
            Self::get_optional_env("RAZORPAY_KEY_SECRET"),
        ) {
            (Some(key_id), Some(key_secret)) => Some(GatewayCredentials {
                key_id,
                key_secret: Secret::new(key_secret),
            }),
            _ => None,
        };

        let config = Self {
            bind_address: Self::get_env_or_default("BIND_ADDRESS", "0.0.0.0"),
            port: Self::parse_port()?,
            auth_jwt_secret: Secret::new(Self::get_required_env("AUTH_JWT_SECRET")?),
            master_secret,
            gateway_credentials,
            gateway_api_url: Self::get_env_or_default(
                "RAZORPAY_API_URL",
                "https://api.razorpay.com",
            ),
            order_max_minor_units: Self::parse_i64_or_default(
                "ORDER_MAX_MINOR_UNITS",
                1_000_000,
            )?,
            receipt_prefix: Self::get_env_or_default("RECEIPT_PREFIX", "expenso"),
            group_store_url: Self::get_required_env("GROUP_STORE_URL")?,
            group_store_token: Self::get_optional_env("GROUP_STORE_TOKEN").map(Secret::new),
            gateway_timeout_secs: Self::parse_u64_or_default("GATEWAY_TIMEOUT_SECS", 10)?,
            store_timeout_secs: Self::parse_u64_or_default("STORE_TIMEOUT_SECS", 10)?,
            request_timeout_secs: Self::parse_u64_or_default("REQUEST_TIMEOUT_SECS", 30)?,
            body_size_limit_bytes: Self::parse_usize_or_default("BODY_SIZE_LIMIT_BYTES", 65536)?,
            log_level: Self::get_env_or_default("LOG_LEVEL", "info"),
            log_format: Self::get_env_or_default("LOG_FORMAT", "text"),
        };

        config.validate()?;

        Ok(config)
    }

    /// Get environment variable or return default value
    fn get_env_or_default(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get optional environment variable; empty counts as unset
    fn get_optional_env(key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    /// Get required environment variable
    fn get_required_env(key: &'static str) -> Result<String, ConfigError> {
        match env::var(key) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(ConfigError::Missing(key)),
        }
    }

    /// Parse port from PORT environment variable
    fn parse_port() -> Result<u16, ConfigError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port_str.parse::<u16>().map_err(|e| {
            ConfigError::Invalid(format!("Invalid PORT value '{}': {}", port_str, e))
        })?;

        if port == 0 {
            return Err(ConfigError::Invalid(
                "PORT must be between 1 and 65535".to_string(),
            ));
        }

        Ok(port)
    }

    /// Parse u64 from environment variable or return default
    fn parse_u64_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<u64>().map_err(|e| {
                    ConfigError::Invalid(format!("Invalid {} value '{}': {}", key, value, e))
                })?;

                if parsed == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Parse usize from environment variable or return default
    fn parse_usize_or_default(key: &str, default: usize) -> Result<usize, ConfigError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<usize>().map_err(|e| {
                    ConfigError::Invalid(format!("Invalid {} value '{}': {}", key, value, e))
                })?;

                if parsed == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Parse i64 from environment variable or return default
    fn parse_i64_or_default(key: &str, default: i64) -> Result<i64, ConfigError> {
        match env::var(key) {
            Ok(value) => value.parse::<i64>().map_err(|e| {
                ConfigError::Invalid(format!("Invalid {} value '{}': {}", key, value, e))
            }),
            _ => Ok(default),
        }
    }

    /// Validate all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_url(&self.group_store_url, "Group store URL")?;
        Self::validate_url(&self.gateway_api_url, "Gateway API URL")?;

        if self.order_max_minor_units < MIN_ORDER_MINOR_UNITS {
            return Err(ConfigError::Invalid(format!(
                "ORDER_MAX_MINOR_UNITS must be at least {}",
                MIN_ORDER_MINOR_UNITS
            )));
        }

        Self::validate_log_level(&self.log_level)?;
        Self::validate_log_format(&self.log_format)?;

        Ok(())
    }

    /// Validate URL format
    fn validate_url(url: &str, description: &str) -> Result<(), ConfigError> {
        url::Url::parse(url).map_err(|e| {
            ConfigError::Invalid(format!("Invalid {} '{}': {}", description, url, e))
        })?;
        Ok(())
    }

    /// Validate log level
    fn validate_log_level(level: &str) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid LOG_LEVEL '{}': must be one of {}",
                level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    /// Validate log format
    fn validate_log_format(format: &str) -> Result<(), ConfigError> {
        if format != "json" && format != "text" {
            return Err(ConfigError::Invalid(format!(
                "Invalid LOG_FORMAT '{}': must be 'json' or 'text'",
                format
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Create a test configuration for unit tests
    ///
    /// Bypasses environment variable loading for tests that don't need real
    /// configuration.
    pub fn test_config() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            auth_jwt_secret: Secret::new("test_jwt_secret".to_string()),
            master_secret: MasterSecret::parse("test_master_key").ok(),
            gateway_credentials: Some(GatewayCredentials {
                key_id: "rzp_test_key".to_string(),
                key_secret: Secret::new("rzp_test_secret".to_string()),
            }),
            gateway_api_url: "http://localhost:9100".to_string(),
            order_max_minor_units: 1_000_000,
            receipt_prefix: "expenso".to_string(),
            group_store_url: "http://localhost:9200".to_string(),
            group_store_token: None,
            gateway_timeout_secs: 5,
            store_timeout_secs: 5,
            request_timeout_secs: 30,
            body_size_limit_bytes: 65536,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}
