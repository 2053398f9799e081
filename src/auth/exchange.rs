//! Login and refresh exchanges against the platform's auth endpoints.
//!
//! Both exchanges deliver tokens as `Set-Cookie` headers, never in the JSON
//! body, so tokens are always read from the response's cookies.

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE, ORIGIN, REFERER};
use secrecy::{ExposeSecret, SecretString};

use super::cookies::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::{Endpoints, Error, Result};

/// Email and password used to (re-)login.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: SecretString,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// The login email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Both fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Tokens extracted from a successful exchange.
#[derive(Debug)]
pub(crate) struct IssuedTokens {
    pub access_token: String,
    /// Absent when the server did not rotate the refresh token.
    pub refresh_token: Option<String>,
    /// Lifetime reported by the server through the access cookie, if any.
    pub ttl: Option<Duration>,
}

/// Performs the two auth round-trips over a shared HTTP client.
#[derive(Debug, Clone)]
pub(crate) struct AuthExchange {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl AuthExchange {
    pub(crate) fn new(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    fn base_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&self.endpoints.app_base_url)
                .map_err(|_| Error::Config("Invalid app base URL".to_string()))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&self.endpoints.referer())
                .map_err(|_| Error::Config("Invalid app base URL".to_string()))?,
        );
        Ok(headers)
    }

    /// `POST /api/auth/login` with `{email, password}`.
    ///
    /// Succeeds only on HTTP 200 with both token cookies present.
    pub(crate) async fn login(&self, credentials: &Credentials) -> Result<IssuedTokens> {
        let response = self
            .http
            .post(self.endpoints.login_url())
            .headers(self.base_headers()?)
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password.expose_secret(),
            }))
            .send()
            .await
            .map_err(Error::transport)?;

        if response.status() != reqwest::StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "Login failed ({}): {}",
                status, body
            )));
        }

        let issued = issued_from_cookies(&response);
        if issued.access_token.is_empty() || issued.refresh_token.is_none() {
            return Err(Error::Authentication(
                "No authentication tokens in login response".to_string(),
            ));
        }
        Ok(issued)
    }

    /// `POST /api/auth/refresh` carrying the refresh token as a cookie.
    ///
    /// Succeeds on HTTP 200 with at least a new access token cookie.
    pub(crate) async fn refresh(&self, refresh_token: &SecretString) -> Result<IssuedTokens> {
        let mut headers = self.base_headers()?;
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!(
                "{}={}",
                REFRESH_TOKEN_COOKIE,
                refresh_token.expose_secret()
            ))
            .map_err(|_| Error::InvalidInput("Invalid refresh token format".to_string()))?,
        );

        let response = self
            .http
            .post(self.endpoints.refresh_url())
            .headers(headers)
            .send()
            .await
            .map_err(Error::transport)?;

        if response.status() != reqwest::StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Refresh(format!(
                "Refresh failed ({}): {}",
                status, body
            )));
        }

        let issued = issued_from_cookies(&response);
        if issued.access_token.is_empty() {
            return Err(Error::Refresh(
                "No new access token in refresh response".to_string(),
            ));
        }
        Ok(issued)
    }
}

fn issued_from_cookies(response: &reqwest::Response) -> IssuedTokens {
    let mut issued = IssuedTokens {
        access_token: String::new(),
        refresh_token: None,
        ttl: None,
    };

    for cookie in response.cookies() {
        match cookie.name() {
            ACCESS_TOKEN_COOKIE if !cookie.value().is_empty() => {
                issued.access_token = cookie.value().to_string();
                issued.ttl = cookie
                    .max_age()
                    .and_then(|age| Duration::from_std(age).ok())
                    .or_else(|| {
                        cookie
                            .expires()
                            .map(|at| DateTime::<Utc>::from(at) - Utc::now())
                    })
                    .filter(|ttl| *ttl > Duration::zero());
            }
            REFRESH_TOKEN_COOKIE if !cookie.value().is_empty() => {
                issued.refresh_token = Some(cookie.value().to_string());
            }
            _ => {}
        }
    }

    issued
}
