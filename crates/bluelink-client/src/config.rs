//! Credentials and transport configuration

use std::fmt;
use std::time::Duration;

use crate::error::{BlueLinkError, Result};

/// Production dashboard host
pub const DEFAULT_BASE_URL: &str = "https://owners.hyundaiusa.com";

/// Environment variable holding the account email
pub const EMAIL_ENV: &str = "BLUELINK_EMAIL";
/// Environment variable holding the account password
pub const PASSWORD_ENV: &str = "BLUELINK_PASSWORD";
/// Environment variable holding the account PIN
pub const PIN_ENV: &str = "BLUELINK_PIN";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Account credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub pin: String,
}

impl Credentials {
    /// Build credentials from explicit values; all three must be non-empty.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        pin: impl Into<String>,
    ) -> Result<Self> {
        Self::resolve_with(
            Some(email.into()),
            Some(password.into()),
            Some(pin.into()),
            |_| None,
        )
    }

    /// Resolve credentials, falling back to `BLUELINK_EMAIL`,
    /// `BLUELINK_PASSWORD` and `BLUELINK_PIN` for any value not given.
    pub fn resolve(
        email: Option<String>,
        password: Option<String>,
        pin: Option<String>,
    ) -> Result<Self> {
        Self::resolve_with(email, password, pin, |key| std::env::var(key).ok())
    }

    /// Resolve all three credentials from the environment
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, None, None)
    }

    /// Resolve credentials using `lookup` as the fallback source.
    ///
    /// Empty strings count as missing, both for explicit values and for
    /// looked-up ones.
    pub fn resolve_with<F>(
        email: Option<String>,
        password: Option<String>,
        pin: Option<String>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<String>, key: &str| {
            explicit
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(key).filter(|v| !v.is_empty()))
        };

        match (
            pick(email, EMAIL_ENV),
            pick(password, PASSWORD_ENV),
            pick(pin, PIN_ENV),
        ) {
            (Some(email), Some(password), Some(pin)) => Ok(Self {
                email,
                password,
                pin,
            }),
            _ => Err(BlueLinkError::MissingCredentials),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("pin", &"<redacted>")
            .finish()
    }
}

/// Transport configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service origin, e.g. `https://owners.hyundaiusa.com`
    pub base_url: String,
    /// Total request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Configuration pointing at `base_url` with default timeouts
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}
