//! Service configuration.

use std::path::Path;

use serde::Deserialize;

use devgenius_core::{QuotaPeriod, QuotaPolicy, FREE_PLAN_MESSAGES};

/// Default generative model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default generative API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A setting could not be parsed.
    #[error("invalid value for {name}: {value}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:3000").
    pub listen_addr: String,

    /// Path of the JSON document (default: "data/db.json").
    pub data_file: String,

    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,

    /// Key accepted in `X-Admin-Key` for admin endpoints.
    pub admin_api_key: Option<String>,

    /// Generative API key. The AI route is disabled without it.
    pub gemini_api_key: Option<String>,

    /// Generative API base URL.
    pub gemini_base_url: String,

    /// Generative model name.
    pub gemini_model: String,

    /// Shared secret for payment provider callbacks.
    pub payment_webhook_secret: Option<String>,

    /// Message quota window and free-tier limit.
    pub quota: QuotaPolicy,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Secrets file structure.
#[derive(Debug, Default, Deserialize)]
struct Secrets {
    #[serde(default)]
    jwt_secret: Option<String>,
    #[serde(default)]
    admin_api_key: Option<String>,
    #[serde(default)]
    gemini_api_key: Option<String>,
    #[serde(default)]
    payment_webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and the secrets file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no JWT secret is configured and
    /// `ConfigError::Invalid` if a numeric or enum setting fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secrets = load_secrets();
        let defaults = Self::default();

        let jwt_secret = secrets
            .jwt_secret
            .or_else(|| env("JWT_SECRET"))
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let period = match env("QUOTA_PERIOD") {
            Some(value) => value.parse::<QuotaPeriod>().map_err(|_| ConfigError::Invalid {
                name: "QUOTA_PERIOD",
                value,
            })?,
            None => defaults.quota.period,
        };

        Ok(Self {
            listen_addr: env("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            data_file: env("DATA_FILE").unwrap_or(defaults.data_file),
            jwt_secret,
            admin_api_key: secrets.admin_api_key.or_else(|| env("ADMIN_API_KEY")),
            gemini_api_key: secrets.gemini_api_key.or_else(|| env("GEMINI_API_KEY")),
            gemini_base_url: env("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            gemini_model: env("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            payment_webhook_secret: secrets
                .payment_webhook_secret
                .or_else(|| env("PAYMENT_WEBHOOK_SECRET")),
            quota: QuotaPolicy {
                period,
                free_limit: parse_env("FREE_MESSAGE_LIMIT")?.unwrap_or(FREE_PLAN_MESSAGES),
            },
            cors_origins: env("CORS_ORIGINS").map_or(defaults.cors_origins, |s| {
                s.split(',').map(|o| o.trim().to_string()).collect()
            }),
            max_body_bytes: parse_env("MAX_BODY_BYTES")?.unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parse_env("REQUEST_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.request_timeout_seconds),
        })
    }
}

/// Non-empty environment variable.
fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    env(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}

/// Load secrets from the first secrets file found, or an empty set.
fn load_secrets() -> Secrets {
    let secret_paths = [".secrets/devgenius.json", "../.secrets/devgenius.json"];

    for path in &secret_paths {
        match load_secrets_file::<Secrets>(path) {
            Ok(secrets) => {
                tracing::info!(path = %path, "Loaded secrets from file");
                return secrets;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path, error = %e, "Ignoring unreadable secrets file"),
        }
    }

    tracing::debug!("Secrets file not found, using environment variables");
    Secrets::default()
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".into(),
            data_file: "data/db.json".into(),
            jwt_secret: String::new(),
            admin_api_key: None,
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            payment_webhook_secret: None,
            quota: QuotaPolicy::default(),
            cors_origins: vec![
                "http://localhost:5173".into(),
                "http://localhost:3000".into(),
            ],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.quota.period, QuotaPeriod::Daily);
        assert_eq!(config.quota.free_limit, 15);
    }

    #[test]
    fn secrets_file_fields_are_optional() {
        let secrets: Secrets = serde_json::from_str(r#"{ "jwt_secret": "s3cret" }"#).unwrap();
        assert_eq!(secrets.jwt_secret.as_deref(), Some("s3cret"));
        assert!(secrets.gemini_api_key.is_none());
    }

    #[test]
    fn missing_secrets_file_is_not_found() {
        let err = load_secrets_file::<Secrets>("/nonexistent/devgenius.json").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
