//! Access/refresh token pairs and their expiry arithmetic.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Token lifetime assumed when the server does not report one.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// A token is treated as expired this long before its real expiry.
pub const EXPIRY_BUFFER_SECS: i64 = 300;

/// A token is due for a proactive refresh this long before its real expiry.
pub const REFRESH_BUFFER_SECS: i64 = 900;

/// An access/refresh token pair with its issue and expiry instants.
///
/// A `TokenSet` is never mutated in place. Every login or refresh builds a
/// new one and the session swaps it in whole.
#[derive(Clone)]
pub struct TokenSet {
    access_token: SecretString,
    refresh_token: SecretString,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    expiry_buffer: Duration,
    refresh_buffer: Duration,
}

impl TokenSet {
    /// Build a token set issued at `issued_at` and valid for `ttl`.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self::with_expiry(access_token, refresh_token, issued_at, issued_at + ttl)
    }

    /// Build a token set issued now with the default one hour lifetime.
    pub fn issued_now(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self::new(
            access_token,
            refresh_token,
            Utc::now(),
            Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        )
    }

    /// Build a token set from explicit instants, e.g. one read back from disk.
    pub fn with_expiry(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
            issued_at,
            expires_at,
            expiry_buffer: Duration::seconds(EXPIRY_BUFFER_SECS),
            refresh_buffer: Duration::seconds(REFRESH_BUFFER_SECS),
        }
    }

    /// Override the expiry and refresh buffers.
    ///
    /// The expiry buffer is clamped so it never exceeds the refresh buffer;
    /// an expired token always also needs a refresh.
    pub fn with_buffers(mut self, expiry_buffer: Duration, refresh_buffer: Duration) -> Self {
        self.refresh_buffer = refresh_buffer;
        self.expiry_buffer = expiry_buffer.min(refresh_buffer);
        self
    }

    /// The access token.
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// The refresh token.
    pub fn refresh_token(&self) -> &SecretString {
        &self.refresh_token
    }

    /// When the pair was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the access token stops being accepted.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Time left before `expires_at`, negative once past it.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// Expired as of `now`, counting the expiry buffer.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - self.expiry_buffer
    }

    /// Due for refresh as of `now`, counting the refresh buffer.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - self.refresh_buffer
    }

    /// Expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Due for refresh right now.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(Utc::now())
    }

    /// Plain record for persistence.
    pub fn to_stored(&self) -> StoredTokens {
        StoredTokens {
            access_token: self.access_token.expose_secret().to_string(),
            refresh_token: self.refresh_token.expose_secret().to_string(),
            expires_at: self.expires_at,
            issued_at: self.issued_at,
        }
    }
}

impl From<StoredTokens> for TokenSet {
    fn from(stored: StoredTokens) -> Self {
        TokenSet::with_expiry(
            stored.access_token,
            stored.refresh_token,
            stored.issued_at,
            stored.expires_at,
        )
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// On-disk form of a [`TokenSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Expiry instant
    pub expires_at: DateTime<Utc>,
    /// Issue instant
    pub issued_at: DateTime<Utc>,
}

/// Read-only summary of the current tokens, safe to print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Whether a token set is installed
    pub authenticated: bool,
    /// First 20 characters of the access token followed by `...`
    pub access_token_preview: Option<String>,
    /// Expiry instant
    pub expires_at: Option<DateTime<Utc>>,
    /// Issue instant
    pub issued_at: Option<DateTime<Utc>>,
    /// Expired, counting the expiry buffer
    pub is_expired: bool,
    /// Due for refresh, counting the refresh buffer
    pub needs_refresh: bool,
    /// Seconds until expiry, 0 once expired
    pub time_until_expiry: i64,
}

impl TokenInfo {
    /// Summary for a session without tokens.
    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            access_token_preview: None,
            expires_at: None,
            issued_at: None,
            is_expired: true,
            needs_refresh: true,
            time_until_expiry: 0,
        }
    }

    /// Summary of `tokens` as of `now`.
    pub fn from_tokens(tokens: &TokenSet, now: DateTime<Utc>) -> Self {
        let access = tokens.access_token.expose_secret();
        let preview = if access.is_empty() {
            None
        } else {
            Some(format!("{}...", access.chars().take(20).collect::<String>()))
        };
        let is_expired = tokens.is_expired_at(now);

        Self {
            authenticated: true,
            access_token_preview: preview,
            expires_at: Some(tokens.expires_at),
            issued_at: Some(tokens.issued_at),
            is_expired,
            needs_refresh: tokens.needs_refresh_at(now),
            time_until_expiry: if is_expired {
                0
            } else {
                tokens.remaining_at(now).num_seconds()
            },
        }
    }
}
