//! HTTP client implementation for the Axiom Trade API.

use reqwest::header::HeaderMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::api::{BalancesService, PortfolioService, TokensService, TrendingService};
use crate::auth::{CredentialStore, SessionManager};
use crate::{Error, Result};

use super::config::ClientConfig;

/// The main client for interacting with the Axiom Trade API.
///
/// Authenticated services ask the session for fresh headers on every call,
/// so tokens rotated by a refresh are picked up immediately.
///
/// # Example
///
/// ```no_run
/// use axiomtrade_rs::{AxiomClient, TimePeriod};
///
/// # async fn example() -> axiomtrade_rs::Result<()> {
/// let client = AxiomClient::login("trader@example.com", "password").await?;
///
/// let trending = client.trending().get(TimePeriod::OneDay).await?;
/// println!("{}", trending);
/// # Ok(())
/// # }
/// ```
pub struct AxiomClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) session: SessionManager,
    pub(crate) config: ClientConfig,
}

impl AxiomClient {
    /// Create a client with no credentials, for public endpoints only.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with no credentials and a custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = config.build_http()?;
        let session = SessionManager::builder()
            .config(config.clone())
            .http(http.clone())
            .build()?;
        Ok(Self::from_parts(http, session, config))
    }

    /// Log in with email and password.
    pub async fn login(email: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::login_with_config(email, password, ClientConfig::default()).await
    }

    /// Log in with email and password and a custom configuration.
    pub async fn login_with_config(
        email: impl Into<String>,
        password: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let client = Self::with_config(config)?;
        client.inner.session.login(email, password).await?;
        Ok(client)
    }

    /// Create a client from tokens obtained elsewhere.
    ///
    /// No network call is made; the tokens are assumed fresh.
    pub fn from_tokens(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = config.build_http()?;
        let session = SessionManager::builder()
            .tokens(access_token, refresh_token)
            .config(config.clone())
            .http(http.clone())
            .build()?;
        Ok(Self::from_parts(http, session, config))
    }

    /// Create a client whose tokens are loaded from and saved to `store`.
    ///
    /// Credentials, when given, are used if the saved tokens are missing or
    /// can no longer be refreshed.
    pub fn from_store(
        store: impl CredentialStore + 'static,
        credentials: Option<(String, String)>,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = config.build_http()?;
        let mut builder = SessionManager::builder()
            .store(store)
            .config(config.clone())
            .http(http.clone());
        if let Some((email, password)) = credentials {
            builder = builder.credentials(email, password);
        }
        Ok(Self::from_parts(http, builder.build()?, config))
    }

    /// Wrap an existing session.
    pub fn with_session(session: SessionManager, config: ClientConfig) -> Result<Self> {
        let http = config.build_http()?;
        Ok(Self::from_parts(http, session, config))
    }

    fn from_parts(http: reqwest::Client, session: SessionManager, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                session,
                config,
            }),
        }
    }

    /// Get the wallet balances service.
    pub fn balances(&self) -> BalancesService {
        BalancesService::new(self.inner.clone())
    }

    /// Get the trending tokens service.
    pub fn trending(&self) -> TrendingService {
        TrendingService::new(self.inner.clone())
    }

    /// Get the token information service.
    pub fn tokens(&self) -> TokensService {
        TokensService::new(self.inner.clone())
    }

    /// Get the portfolio service.
    pub fn portfolio(&self) -> PortfolioService {
        PortfolioService::new(self.inner.clone())
    }

    /// Get a reference to the session.
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// Make sure the session holds valid tokens.
    pub async fn ensure_authenticated(&self) -> bool {
        self.inner.session.ensure_valid().await
    }

    /// Whether the session currently holds valid tokens.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated().await
    }

    /// Manually refresh the access token.
    pub async fn refresh_access_token(&self) -> bool {
        self.inner.session.refresh().await
    }

    /// Forget tokens and credentials.
    pub async fn logout(&self) {
        self.inner.session.logout().await
    }
}

impl ClientInner {
    /// Headers for an authenticated request.
    ///
    /// Fails with [`Error::NotAuthenticated`] before anything is sent if no
    /// valid session can be established.
    async fn auth_headers(&self) -> Result<HeaderMap> {
        let headers = self.session.get_authenticated_headers(HeaderMap::new()).await?;
        if !self.session.is_authenticated().await {
            return Err(Error::NotAuthenticated);
        }
        Ok(headers)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoints.api_base_url, path)
    }

    /// Make an authenticated GET request with query parameters.
    pub(crate) async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let headers = self.auth_headers().await?;

        let response = self
            .http
            .get(self.api_url(path))
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(Error::transport)?;

        self.handle_response(response).await
    }

    /// Make an authenticated GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let headers = self.auth_headers().await?;

        let response = self
            .http
            .get(self.api_url(path))
            .headers(headers)
            .send()
            .await
            .map_err(Error::transport)?;

        self.handle_response(response).await
    }

    /// Make an unauthenticated JSON POST to an absolute URL.
    pub(crate) async fn post_public<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::transport)?;

        self.handle_response(response).await
    }

    /// Handle an API response, keeping upstream failures apart from auth failures.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let status_code = status.as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let text = response.text().await.unwrap_or_default();
        let body: serde_json::Value =
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

        match status_code {
            401 | 403 => Err(Error::Unauthorized {
                status: status_code,
            }),
            404 => {
                let message = body
                    .get("error")
                    .and_then(|e| e.as_str())
                    .or_else(|| body.get("message").and_then(|m| m.as_str()))
                    .unwrap_or("Resource not found")
                    .to_string();
                Err(Error::NotFound(message))
            }
            429 => Err(Error::RateLimited {
                retry_after_secs: retry_after.unwrap_or(60),
            }),
            _ => Err(Error::from_api_response(status_code, body)),
        }
    }
}

impl Clone for AxiomClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for AxiomClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxiomClient")
            .field("config", &self.inner.config)
            .field("session", &self.inner.session)
            .finish()
    }
}
