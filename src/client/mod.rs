//! HTTP client and service layer for the Axiom Trade API.
//!
//! This module provides the main entry point [`AxiomClient`] for
//! interacting with the Axiom Trade API.
//!
//! # Example
//!
//! ```no_run
//! use axiomtrade_rs::{AxiomClient, ClientConfig, WalletAddress};
//!
//! # async fn example() -> axiomtrade_rs::Result<()> {
//! let client = AxiomClient::from_tokens(
//!     "access-token",
//!     "refresh-token",
//!     ClientConfig::default(),
//! )?;
//!
//! let balance = client
//!     .balances()
//!     .get(&WalletAddress::new("BJBgjyDZx5FSsyJf6bFKVXuJV7DZY9PCSMSi5d9tcEVh"))
//!     .await?;
//! println!("{} SOL", balance.sol);
//! # Ok(())
//! # }
//! ```

mod config;
mod http;

pub use config::{ClientConfig, SessionConfig};
pub use http::AxiomClient;
pub(crate) use http::ClientInner;
