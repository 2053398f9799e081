//! Wallet balance service.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Deserialize;

use crate::client::ClientInner;
use crate::models::{WalletAddress, WalletBalance};
use crate::{Error, Result};

/// Service for SOL balance lookups over Solana JSON-RPC.
///
/// Balance lookups are public and do not need a logged-in session.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: axiomtrade_rs::AxiomClient) -> axiomtrade_rs::Result<()> {
/// use axiomtrade_rs::WalletAddress;
///
/// let wallet = WalletAddress::new("BJBgjyDZx5FSsyJf6bFKVXuJV7DZY9PCSMSi5d9tcEVh");
/// let balance = client.balances().get(&wallet).await?;
/// println!("{} SOL ({} lamports)", balance.sol, balance.lamports);
/// # Ok(())
/// # }
/// ```
pub struct BalancesService {
    inner: Arc<ClientInner>,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<RpcResult>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcResult {
    value: u64,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl BalancesService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get the SOL balance of a wallet.
    pub async fn get(&self, wallet: &WalletAddress) -> Result<WalletBalance> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [wallet.as_str(), { "commitment": "confirmed" }],
        });

        let response: RpcResponse = self
            .inner
            .post_public(&self.inner.config.endpoints.rpc_url, &payload)
            .await?;

        match (response.result, response.error) {
            (Some(result), _) => Ok(WalletBalance::from_lamports(wallet.clone(), result.value)),
            (None, Some(err)) => Err(Error::Api {
                status: 200,
                message: format!("RPC error {}: {}", err.code, err.message),
                body: serde_json::Value::Null,
            }),
            (None, None) => Err(Error::InvalidInput(format!(
                "Empty balance response for {}",
                wallet
            ))),
        }
    }

    /// Get the SOL balances of several wallets concurrently.
    ///
    /// Results are returned in the same order as `wallets`.
    pub async fn get_batch(&self, wallets: &[WalletAddress]) -> Vec<Result<WalletBalance>> {
        join_all(wallets.iter().map(|wallet| self.get(wallet))).await
    }
}
