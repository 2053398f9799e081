//! Client configuration options.

use std::time::Duration;

use crate::auth::{DEFAULT_TOKEN_TTL_SECS, EXPIRY_BUFFER_SECS, REFRESH_BUFFER_SECS};
use crate::Endpoints;

/// Configuration for the Axiom Trade client.
///
/// # Example
///
/// ```
/// use axiomtrade_rs::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("my-bot/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout, applied to login and refresh round-trips as well
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Base URLs
    pub endpoints: Endpoints,
    /// Token lifetime and refresh policy
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("axiomtrade-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            endpoints: Endpoints::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace the base URLs.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the session policy.
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Build the HTTP client shared by the session and the services.
    pub(crate) fn build_http(&self) -> crate::Result<reqwest::Client> {
        self.endpoints.validate()?;
        Ok(reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?)
    }
}

/// Token lifetime and refresh policy for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Lifetime assumed when the server does not report one
    pub default_ttl_secs: i64,
    /// Tokens count as expired this many seconds before their expiry
    pub expiry_buffer_secs: i64,
    /// Tokens count as due for refresh this many seconds before their expiry
    pub refresh_buffer_secs: i64,
    /// Also refresh while a token is due but not yet expired
    pub proactive_refresh: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            expiry_buffer_secs: EXPIRY_BUFFER_SECS,
            refresh_buffer_secs: REFRESH_BUFFER_SECS,
            proactive_refresh: false,
        }
    }
}

impl SessionConfig {
    /// Create a new session policy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback token lifetime.
    pub fn with_default_ttl(mut self, secs: i64) -> Self {
        self.default_ttl_secs = secs;
        self
    }

    /// Set the expiry and refresh buffers.
    pub fn with_buffers(mut self, expiry_buffer_secs: i64, refresh_buffer_secs: i64) -> Self {
        self.expiry_buffer_secs = expiry_buffer_secs;
        self.refresh_buffer_secs = refresh_buffer_secs;
        self
    }

    /// Enable or disable refreshing inside the refresh buffer.
    pub fn with_proactive_refresh(mut self, enabled: bool) -> Self {
        self.proactive_refresh = enabled;
        self
    }
}
