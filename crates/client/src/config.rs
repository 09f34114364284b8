//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FOOD_API_BASE_URL` - Backend API base URL (default: `http://localhost:8080/api`)
//! - `FOOD_API_TOKEN` - Bearer token attached to every API request
//! - `FOOD_STORAGE_PATH` - File backing the local session storage
//!   (default: `.food-delivery/local-storage.json`)
//! - `FOOD_NOTIFICATION_MS` - Default notification display time (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Default backend API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Default location of the local storage file.
pub const DEFAULT_STORAGE_PATH: &str = ".food-delivery/local-storage.json";

/// Default notification display time in milliseconds.
pub const DEFAULT_NOTIFICATION_MS: u64 = 3000;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Client application configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend API base URL (no trailing slash)
    pub api_base_url: String,
    /// Optional bearer token for the backend
    pub api_token: Option<SecretString>,
    /// File backing the durable key-value storage
    pub storage_path: PathBuf,
    /// Default notification display time
    pub notification_duration: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("storage_path", &self.storage_path)
            .field("notification_duration", &self.notification_duration)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            notification_duration: Duration::from_millis(DEFAULT_NOTIFICATION_MS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or if the API token
    /// fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_env_or_default(
            "FOOD_API_BASE_URL",
            DEFAULT_API_BASE_URL,
        ))?;

        let api_token = match get_optional_env("FOOD_API_TOKEN") {
            Some(token) => {
                validate_secret_strength(&token, "FOOD_API_TOKEN")?;
                Some(SecretString::from(token))
            }
            None => None,
        };

        let storage_path = PathBuf::from(get_env_or_default(
            "FOOD_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));

        let notification_ms = get_env_or_default(
            "FOOD_NOTIFICATION_MS",
            &DEFAULT_NOTIFICATION_MS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar("FOOD_NOTIFICATION_MS".to_string(), e.to_string()))?;

        Ok(Self {
            api_base_url,
            api_token,
            storage_path,
            notification_duration: Duration::from_millis(notification_ms),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Whether a bearer token is configured.
    #[must_use]
    pub fn has_api_token(&self) -> bool {
        self.api_token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Validate an API base URL and strip any trailing slash.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("FOOD_API_BASE_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "FOOD_API_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // Token length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.notification_duration, Duration::from_millis(3000));
        assert!(!config.has_api_token());
    }

    #[test]
    fn test_parse_base_url_strips_trailing_slash() {
        assert_eq!(
            parse_base_url("http://food.test/api/").unwrap(),
            "http://food.test/api"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            parse_base_url("ftp://food.test/api"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_token_placeholder() {
        let result = validate_secret_strength("your-token-here", "FOOD_API_TOKEN");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_token_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaa", "FOOD_API_TOKEN");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_token_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*", "FOOD_API_TOKEN").is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig {
            api_token: Some(SecretString::from("super_secret_bearer_token")),
            ..ClientConfig::default()
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_bearer_token"));
        assert!(debug_output.contains("localhost:8080"));
    }
}
