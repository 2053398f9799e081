//! Primitive types and newtypes for type-safe API interactions.
//!
//! This module provides strongly-typed wrappers around string identifiers
//! to prevent mixing up wallet and token addresses at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Solana wallet address (base58 public key).
///
/// # Example
///
/// ```
/// use axiomtrade_rs::WalletAddress;
///
/// let wallet = WalletAddress::new("BJBgjyDZx5FSsyJf6bFKVXuJV7DZY9PCSMSi5d9tcEVh");
/// println!("Wallet: {}", wallet);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a new wallet address from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the wallet address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A token mint address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAddress(String);

impl TokenAddress {
    /// Create a new token address.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the token address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TokenAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for TokenAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TokenAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Base URLs the client talks to.
///
/// The defaults point at the live platform. Tests and proxies can swap any
/// of them out.
///
/// # Example
///
/// ```
/// use axiomtrade_rs::Endpoints;
///
/// let endpoints = Endpoints::default();
/// assert_eq!(endpoints.login_url(), "https://axiom.trade/api/auth/login");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Web application origin; hosts the auth exchanges and is sent as `Origin`.
    pub app_base_url: String,
    /// Market data API base.
    pub api_base_url: String,
    /// Solana JSON-RPC endpoint used for balance lookups.
    pub rpc_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            app_base_url: "https://axiom.trade".to_string(),
            api_base_url: "https://api6.axiom.trade".to_string(),
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at a single base URL (useful against a mock server).
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            app_base_url: base.clone(),
            api_base_url: base.clone(),
            rpc_url: base,
        }
    }

    /// Login exchange URL.
    pub fn login_url(&self) -> String {
        format!("{}/api/auth/login", self.app_base_url)
    }

    /// Refresh exchange URL.
    pub fn refresh_url(&self) -> String {
        format!("{}/api/auth/refresh", self.app_base_url)
    }

    /// Value sent as the `Referer` header.
    pub fn referer(&self) -> String {
        format!("{}/discover", self.app_base_url)
    }

    /// Check that every endpoint parses as an absolute URL.
    pub fn validate(&self) -> crate::Result<()> {
        for url in [&self.app_base_url, &self.api_base_url, &self.rpc_url] {
            url::Url::parse(url)?;
        }
        Ok(())
    }
}
