//! Trending tokens service.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::client::ClientInner;
use crate::models::TimePeriod;
use crate::Result;

/// Service for the trending meme tokens feed.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: axiomtrade_rs::AxiomClient) -> axiomtrade_rs::Result<()> {
/// use axiomtrade_rs::TimePeriod;
///
/// let trending = client.trending().get(TimePeriod::OneHour).await?;
/// println!("{}", trending);
/// # Ok(())
/// # }
/// ```
pub struct TrendingService {
    inner: Arc<ClientInner>,
}

impl TrendingService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get trending tokens over the given period.
    pub async fn get(&self, period: TimePeriod) -> Result<Value> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Query {
            time_period: TimePeriod,
        }

        self.inner
            .get_with_query("/meme-trending", &Query { time_period: period })
            .await
    }
}
