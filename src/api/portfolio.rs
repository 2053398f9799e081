//! Portfolio service.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ClientInner;
use crate::Result;

/// Service for the logged-in user's portfolio.
pub struct PortfolioService {
    inner: Arc<ClientInner>,
}

impl PortfolioService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get the user's portfolio.
    pub async fn get(&self) -> Result<Value> {
        self.inner.get("/portfolio").await
    }
}
