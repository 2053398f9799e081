//! Token information service.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ClientInner;
use crate::models::TokenAddress;
use crate::Result;

/// Service for per-token details.
pub struct TokensService {
    inner: Arc<ClientInner>,
}

impl TokensService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get information about a token by mint address.
    pub async fn info(&self, token: &TokenAddress) -> Result<Value> {
        self.inner.get(&format!("/token/{}", token)).await
    }
}
