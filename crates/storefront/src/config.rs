//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GEMLINE_BASE_URL` - Public URL for the storefront
//! - `GEMLINE_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `GEMLINE_HOST` - Bind address (default: 127.0.0.1)
//! - `GEMLINE_PORT` - Listen port (default: 3000)
//! - `CONTENT_STORE_URL` - Content store base URL; without it the bundled sample catalog is served from memory
//! - `CONTENT_STORE_API_KEY` - Content store bearer key (required when `CONTENT_STORE_URL` is set)
//! - `CONTENT_STORE_CACHE_TTL_SECS` - Read cache lifetime (default: 300)
//! - `CONTENT_STORE_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `IDENTITY_ISSUER_URL` - Member identity provider; enables sign-in
//! - `IDENTITY_CLIENT_ID` - OAuth client ID (required with the issuer)
//! - `IDENTITY_CLIENT_SECRET` - OAuth client secret (required with the issuer)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `GEMLINE_LOG_FORMAT` - `json` for JSON log lines (read by the binary at start-up)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Content store connection
    pub content_store: ContentStoreConfig,
    /// Member identity provider, when sign-in is enabled
    pub identity: Option<IdentityConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Content store connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ContentStoreConfig {
    /// Base URL of the remote store; `None` selects the in-memory store
    pub url: Option<Url>,
    /// Bearer key for the remote store
    pub api_key: Option<SecretString>,
    /// How long reads stay cached
    pub cache_ttl: Duration,
    /// Timeout for each outbound request
    pub timeout: Duration,
}

impl std::fmt::Debug for ContentStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStoreConfig")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("cache_ttl", &self.cache_ttl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            cache_ttl: Duration::from_secs(300),
            timeout: Duration::from_secs(10),
        }
    }
}

/// OAuth settings for the member identity provider.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Issuer base URL (e.g., `https://id.example.com`)
    pub issuer_url: Url,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("issuer_url", &self.issuer_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("GEMLINE_HOST", "127.0.0.1")?;
        let port = parse_env("GEMLINE_PORT", "3000")?;
        let base_url = get_required_env("GEMLINE_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let session_secret = get_validated_secret("GEMLINE_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "GEMLINE_SESSION_SECRET")?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            content_store: ContentStoreConfig::from_env()?,
            identity: IdentityConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Absolute URL for a path on this storefront.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl ContentStoreConfig {
    /// Load the content store settings on their own.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value does not parse, or if the API key is
    /// missing or weak while `CONTENT_STORE_URL` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let url = get_optional_env("CONTENT_STORE_URL")
            .map(|raw| parse_url("CONTENT_STORE_URL", &raw))
            .transpose()?;
        let api_key = if url.is_some() {
            Some(get_validated_secret("CONTENT_STORE_API_KEY")?)
        } else {
            None
        };

        Ok(Self {
            url,
            api_key,
            cache_ttl: get_optional_secs("CONTENT_STORE_CACHE_TTL_SECS")?
                .unwrap_or(defaults.cache_ttl),
            timeout: get_optional_secs("CONTENT_STORE_TIMEOUT_SECS")?.unwrap_or(defaults.timeout),
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(issuer) = get_optional_env("IDENTITY_ISSUER_URL") else {
            return Ok(None);
        };
        Ok(Some(Self {
            issuer_url: parse_url("IDENTITY_ISSUER_URL", &issuer)?,
            client_id: get_required_env("IDENTITY_CLIENT_ID")?,
            client_secret: get_validated_secret("IDENTITY_CLIENT_SECRET")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable with a default value.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional whole number of seconds.
fn get_optional_secs(key: &str) -> Result<Option<Duration>, ConfigError> {
    get_optional_env(key)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            content_store: ContentStoreConfig::default(),
            identity: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
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
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "TEST_SESSION").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(32)), "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_socket_addr_and_urls() {
        let config = config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_https());
        assert_eq!(config.url_for("/auth/callback"), "http://localhost:3000/auth/callback");
    }

    #[test]
    fn test_content_store_defaults() {
        let store = ContentStoreConfig::default();
        assert!(store.url.is_none());
        assert_eq!(store.cache_ttl, Duration::from_secs(300));
        assert_eq!(store.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let identity = IdentityConfig {
            issuer_url: Url::parse("https://id.gemline.test").unwrap(),
            client_id: "client_id_value".to_string(),
            client_secret: SecretString::from("super_secret_client_secret"),
        };
        let store = ContentStoreConfig {
            url: Some(Url::parse("https://cms.gemline.test").unwrap()),
            api_key: Some(SecretString::from("super_secret_api_key")),
            ..ContentStoreConfig::default()
        };

        let debug_output = format!("{identity:?} {store:?}");
        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("cms.gemline.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_client_secret"));
        assert!(!debug_output.contains("super_secret_api_key"));
    }
}
