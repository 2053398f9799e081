//! Error types for the Axiom Trade API client.
//!
//! The session layer reports authentication problems as plain booleans (see
//! [`SessionManager::ensure_valid`](crate::auth::SessionManager::ensure_valid)),
//! but every fallible step underneath produces one of the variants below so
//! callers that want detail can use the `try_*` methods instead.

use serde_json::Value;
use thiserror::Error;

/// A specialized `Result` type for Axiom Trade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all Axiom Trade API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed at the transport level
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the token store failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Upstream API returned a non-success response
    #[error("API error: status={status}, message={message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Human-readable error message
        message: String,
        /// Raw response body for debugging
        body: Value,
    },

    /// Login exchange failed (bad status or no tokens in the response)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Refresh exchange failed (bad status or no access token in the response)
    #[error("Token refresh failed: {0}")]
    Refresh(String),

    /// No valid session could be established before an authenticated call
    #[error("Not authenticated; login or set tokens first")]
    NotAuthenticated,

    /// Upstream rejected the credentials carried by a request (401/403)
    #[error("Unauthorized: status={status}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
    },

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Rate limited by the API
    #[error("Rate limited; retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Number of seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error (missing credentials and tokens, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Returns `true` if this error is potentially transient and the
    /// operation could be retried.
    ///
    /// # Example
    ///
    /// ```
    /// use axiomtrade_rs::Error;
    ///
    /// fn handle_error(err: Error) {
    ///     if err.is_retryable() {
    ///         println!("Retrying operation...");
    ///     }
    /// }
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Timeout | Error::RateLimited { .. }
        )
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::Authentication(_)
                | Error::Refresh(_)
                | Error::NotAuthenticated
                | Error::Unauthorized { .. }
        )
    }

    /// Returns `true` if this error indicates a client-side issue
    /// (invalid input, bad request, etc.).
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 400 && *status < 500,
            Error::InvalidInput(_) | Error::Config(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Map a reqwest failure, keeping timeouts distinct from other transport errors.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Http(err)
        }
    }

    /// Create an API error from a response
    pub(crate) fn from_api_response(status: u16, body: Value) -> Self {
        let message = body
            .get("error")
            .and_then(|e| e.as_str().or_else(|| e.get("message").and_then(|m| m.as_str())))
            .or_else(|| body.get("message").and_then(|m| m.as_str()))
            .or_else(|| body.as_str())
            .unwrap_or("Unknown API error")
            .to_string();

        Error::Api {
            status,
            message,
            body,
        }
    }
}
