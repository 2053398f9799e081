//! # axiomtrade-rs
//!
//! An async Rust client for the Axiom Trade web API.
//!
//! The heart of the crate is [`auth::SessionManager`], which logs in,
//! caches the access/refresh token pair, refreshes it lazily when it
//! expires, and falls back to a fresh login when a refresh is rejected.
//! Every authenticated request made through [`AxiomClient`] goes through it.
//!
//! ## Features
//!
//! - **Authentication**: email/password login or bring-your-own tokens
//! - **Lazy refresh**: tokens are refreshed in-line with the next request
//! - **Persistence**: optional token storage across restarts
//! - **Market data**: trending tokens, token info, portfolio
//! - **Balances**: SOL balances over Solana JSON-RPC
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axiomtrade_rs::{AxiomClient, TimePeriod};
//!
//! #[tokio::main]
//! async fn main() -> axiomtrade_rs::Result<()> {
//!     axiomtrade_rs::logging::init("axiomtrade_rs=info");
//!
//!     let client = AxiomClient::login("trader@example.com", "password").await?;
//!
//!     let trending = client.trending().get(TimePeriod::OneHour).await?;
//!     println!("{}", trending);
//!
//!     let info = client.session().token_info().await;
//!     println!("Token expires in {}s", info.time_until_expiry);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Existing Tokens
//!
//! ```rust,no_run
//! use axiomtrade_rs::{AxiomClient, ClientConfig, TokenAddress};
//! use axiomtrade_rs::auth::FileCredentialStore;
//!
//! #[tokio::main]
//! async fn main() -> axiomtrade_rs::Result<()> {
//!     let client = AxiomClient::from_tokens(
//!         std::env::var("AXIOM_ACCESS_TOKEN").unwrap_or_default(),
//!         std::env::var("AXIOM_REFRESH_TOKEN").unwrap_or_default(),
//!         ClientConfig::default(),
//!     )?;
//!
//!     let token = TokenAddress::new("9SkhnfNU5kx3VhngR9F2X7YSKnRZsNxGzcipHoCNGakK");
//!     println!("{}", client.tokens().info(&token).await?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod logging;
pub mod models;

// Re-export primary types at crate root for convenience
pub use error::{Error, Result};
pub use models::{Endpoints, TimePeriod, TokenAddress, WalletAddress, WalletBalance};
pub use client::{AxiomClient, ClientConfig, SessionConfig};
pub use auth::{SessionManager, SessionState};

/// Prelude module for convenient imports.
///
/// ```rust
/// use axiomtrade_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::models::{Endpoints, TimePeriod, TokenAddress, WalletAddress, WalletBalance};
    pub use crate::client::{AxiomClient, ClientConfig, SessionConfig};
    pub use crate::auth::{
        CredentialStore, FileCredentialStore, SessionManager, SessionState, TokenInfo, TokenSet,
    };
}
