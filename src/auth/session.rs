//! Session lifecycle: login, refresh, expiry checks and header construction.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE, ORIGIN, REFERER, USER_AGENT,
};
use secrecy::ExposeSecret;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::cookies::CookieJar;
use super::exchange::{AuthExchange, Credentials, IssuedTokens};
use super::store::CredentialStore;
use super::tokens::{TokenInfo, TokenSet};
use crate::client::{ClientConfig, SessionConfig};
use crate::{Endpoints, Error, Result};

/// Where a session stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No tokens and no credentials to obtain any.
    NoCredentials,
    /// Credentials are available but no login has happened yet.
    Unauthenticated,
    /// Tokens are installed and outside the refresh buffer.
    Authenticated,
    /// Tokens are still valid but inside the refresh buffer.
    NeedsRefresh,
    /// Tokens are inside the expiry buffer.
    Expired,
    /// A refresh exchange is in flight.
    Refreshing,
    /// A login exchange is in flight.
    Authenticating,
    /// The last recovery attempt failed and no usable tokens remain.
    Failed,
}

/// One network action the session may take to regain valid tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    /// Exchange the refresh token for a new access token.
    Refresh,
    /// Log in again with the stored credentials.
    Authenticate,
}

/// Ordered actions [`SessionManager::ensure_valid`] will try.
///
/// Steps run in order until one succeeds. When every step fails the outcome
/// is `valid_if_all_fail`, which is only true for a proactive refresh of a
/// token that has not expired yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryPlan {
    /// Actions in the order they are attempted.
    pub steps: Vec<AuthStep>,
    /// Outcome when no step succeeds (or there are none).
    pub valid_if_all_fail: bool,
}

impl RecoveryPlan {
    /// Current tokens are good and nothing needs to run.
    pub fn is_ready(&self) -> bool {
        self.steps.is_empty() && self.valid_if_all_fail
    }

    /// Decide what to do given the current tokens and credentials.
    pub fn decide(
        tokens: Option<&TokenSet>,
        has_credentials: bool,
        proactive_refresh: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let relogin = has_credentials.then_some(AuthStep::Authenticate);

        match tokens {
            None => Self {
                steps: relogin.into_iter().collect(),
                valid_if_all_fail: false,
            },
            Some(tokens) if !tokens.is_expired_at(now) => {
                let steps = if proactive_refresh && tokens.needs_refresh_at(now) {
                    vec![AuthStep::Refresh]
                } else {
                    Vec::new()
                };
                Self {
                    steps,
                    valid_if_all_fail: true,
                }
            }
            Some(_) => Self {
                steps: std::iter::once(AuthStep::Refresh).chain(relogin).collect(),
                valid_if_all_fail: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Refreshing,
    Authenticating,
}

struct SessionInner {
    tokens: Option<TokenSet>,
    cookies: CookieJar,
    credentials: Option<Credentials>,
    phase: Phase,
    failed: bool,
    /// Bumped after every recovery run in `try_ensure_valid`.
    recovery_epoch: u64,
    last_recovery_ok: bool,
}

impl SessionInner {
    fn has_credentials(&self) -> bool {
        self.credentials.as_ref().is_some_and(Credentials::is_complete)
    }

    fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        match self.phase {
            Phase::Refreshing => return SessionState::Refreshing,
            Phase::Authenticating => return SessionState::Authenticating,
            Phase::Idle => {}
        }

        match &self.tokens {
            Some(tokens) if !tokens.is_expired_at(now) => {
                if tokens.needs_refresh_at(now) {
                    SessionState::NeedsRefresh
                } else {
                    SessionState::Authenticated
                }
            }
            _ if self.failed => SessionState::Failed,
            Some(_) => SessionState::Expired,
            None if self.has_credentials() => SessionState::Unauthenticated,
            None => SessionState::NoCredentials,
        }
    }
}

/// Owns one user's tokens and cookies and keeps them valid.
///
/// Every authenticated call should go through
/// [`get_authenticated_headers`](Self::get_authenticated_headers), which
/// refreshes lazily when the tokens have expired and falls back to a full
/// login when the refresh is rejected.
///
/// # Thread Safety
///
/// `SessionManager` is cheap to clone and every clone shares the same state.
/// At most one login or refresh runs at a time; callers arriving while one is
/// in flight wait for it and then reuse its result.
///
/// # Example
///
/// ```no_run
/// use axiomtrade_rs::auth::SessionManager;
///
/// # async fn example() -> axiomtrade_rs::Result<()> {
/// let session = SessionManager::builder()
///     .credentials("trader@example.com", "password")
///     .build()?;
///
/// if session.ensure_valid().await {
///     let headers = session.get_authenticated_headers(Default::default()).await?;
///     println!("{} headers ready", headers.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<SessionInner>>,
    gate: Arc<Mutex<()>>,
    exchange: AuthExchange,
    store: Option<Arc<dyn CredentialStore>>,
    endpoints: Endpoints,
    user_agent: String,
    policy: SessionConfig,
}

impl SessionManager {
    /// Start building a session.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Session that logs in with `email`/`password` on first use.
    pub fn with_credentials(email: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::builder().credentials(email, password).build()
    }

    /// Session seeded with tokens obtained elsewhere, without credentials.
    pub fn with_tokens(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Result<Self> {
        Self::builder().tokens(access_token, refresh_token).build()
    }

    /// Log in with the stored credentials.
    ///
    /// Returns `false` without touching the network when credentials are
    /// missing, and `false` leaving prior tokens untouched when the exchange
    /// fails.
    pub async fn authenticate(&self) -> bool {
        match self.try_authenticate().await {
            Ok(()) => true,
            Err(e) => {
                error!("Authentication failed: {}", e);
                false
            }
        }
    }

    /// [`authenticate`](Self::authenticate) with the failure reason.
    pub async fn try_authenticate(&self) -> Result<()> {
        let _gate = self.gate.lock().await;
        self.authenticate_locked().await
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// If the server does not rotate the refresh token, the previous one is
    /// kept.
    pub async fn refresh(&self) -> bool {
        match self.try_refresh().await {
            Ok(()) => true,
            Err(e) => {
                error!("Token refresh failed: {}", e);
                false
            }
        }
    }

    /// [`refresh`](Self::refresh) with the failure reason.
    pub async fn try_refresh(&self) -> Result<()> {
        let _gate = self.gate.lock().await;
        self.refresh_locked().await
    }

    /// Make sure valid tokens are installed, refreshing or logging in if needed.
    ///
    /// Unexpired tokens return immediately without any network call.
    /// Otherwise the steps of [`recovery_plan`](Self::recovery_plan) run in
    /// order: refresh, then a fresh login when credentials are available.
    pub async fn ensure_valid(&self) -> bool {
        match self.try_ensure_valid().await {
            Ok(()) => true,
            Err(e) => {
                error!("No valid authentication available: {}", e);
                false
            }
        }
    }

    /// [`ensure_valid`](Self::ensure_valid) with the last failure reason.
    pub async fn try_ensure_valid(&self) -> Result<()> {
        // Fast path without serializing behind an in-flight exchange. The
        // epoch is read under the same guard as the plan.
        let epoch = {
            let inner = self.inner.read().await;
            if self.plan_for(&inner).is_ready() {
                return Ok(());
            }
            inner.recovery_epoch
        };

        let _gate = self.gate.lock().await;
        let plan = {
            let inner = self.inner.read().await;
            let plan = self.plan_for(&inner);
            // Tokens installed while we waited win over any earlier failure.
            if plan.is_ready() {
                return Ok(());
            }
            // A caller that held the gate before us already ran a recovery; reuse its outcome.
            if inner.recovery_epoch != epoch && !inner.last_recovery_ok {
                return Err(Error::NotAuthenticated);
            }
            plan
        };
        if plan.steps.is_empty() {
            return Err(Error::Config(
                "No authentication tokens and no credentials provided".to_string(),
            ));
        }

        let outcome = self.run_plan(&plan).await;
        let mut inner = self.inner.write().await;
        inner.recovery_epoch = inner.recovery_epoch.wrapping_add(1);
        inner.last_recovery_ok = outcome.is_ok();
        outcome
    }

    async fn run_plan(&self, plan: &RecoveryPlan) -> Result<()> {
        let mut last_error = None;
        for step in &plan.steps {
            let outcome = match step {
                AuthStep::Refresh => self.refresh_locked().await,
                AuthStep::Authenticate => {
                    if last_error.is_some() {
                        info!("Token refresh failed, attempting re-authentication...");
                    }
                    self.authenticate_locked().await
                }
            };
            match outcome {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("{:?} step failed: {}", step, e);
                    last_error = Some(e);
                }
            }
        }

        if plan.valid_if_all_fail {
            debug!("Proactive refresh failed; current tokens remain valid");
            return Ok(());
        }
        Err(last_error.unwrap_or(Error::NotAuthenticated))
    }

    /// Headers for an authenticated request, with `extra` merged in last.
    ///
    /// Calls [`ensure_valid`](Self::ensure_valid) first but does not fail
    /// when it returns `false`: the headers are still built, without the
    /// cookie header if no tokens are installed. Errors only come from
    /// values that cannot be encoded as headers.
    pub async fn get_authenticated_headers(&self, extra: HeaderMap) -> Result<HeaderMap> {
        if !self.ensure_valid().await {
            warn!("No valid authentication available");
        }

        let mut headers = self.base_headers()?;

        let cookie_header = self.inner.read().await.cookies.render();
        if !cookie_header.is_empty() {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(&cookie_header)
                    .map_err(|_| Error::InvalidInput("Invalid token format".to_string()))?,
            );
        }

        headers.extend(extra);
        Ok(headers)
    }

    /// Tokens are installed, unexpired, and both auth cookies are set.
    ///
    /// Never triggers a refresh.
    pub async fn is_authenticated(&self) -> bool {
        let inner = self.inner.read().await;
        inner
            .tokens
            .as_ref()
            .is_some_and(|tokens| !tokens.is_expired())
            && inner.cookies.has_auth()
    }

    /// Forget tokens, cookies and credentials. Saved tokens are kept; see
    /// [`clear_saved_tokens`](Self::clear_saved_tokens).
    pub async fn logout(&self) {
        let _gate = self.gate.lock().await;
        let mut inner = self.inner.write().await;
        inner.tokens = None;
        inner.cookies.clear_auth();
        inner.credentials = None;
        inner.failed = false;
        info!("Logged out successfully");
    }

    /// Replace the credentials and log in with them.
    pub async fn login(&self, email: impl Into<String>, password: impl Into<String>) -> Result<()> {
        let credentials = Credentials::new(email, password);
        if !credentials.is_complete() {
            return Err(Error::Config(
                "Email and password are required for login".to_string(),
            ));
        }

        let _gate = self.gate.lock().await;
        self.inner.write().await.credentials = Some(credentials);
        self.authenticate_locked().await
    }

    /// Install tokens obtained elsewhere, valid for the default lifetime.
    pub async fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let tokens = self.new_token_set(
            access_token.into(),
            refresh_token.into(),
            Utc::now(),
            None,
        );
        let _gate = self.gate.lock().await;
        self.install(tokens).await;
    }

    /// Snapshot of the current tokens.
    pub async fn tokens(&self) -> Option<TokenSet> {
        self.inner.read().await.tokens.clone()
    }

    /// Printable summary of the current tokens.
    pub async fn token_info(&self) -> TokenInfo {
        match &self.inner.read().await.tokens {
            Some(tokens) => TokenInfo::from_tokens(tokens, Utc::now()),
            None => TokenInfo::unauthenticated(),
        }
    }

    /// Current lifecycle state.
    pub async fn status(&self) -> SessionState {
        self.inner.read().await.state_at(Utc::now())
    }

    /// What [`ensure_valid`](Self::ensure_valid) would do right now.
    pub async fn recovery_plan(&self) -> RecoveryPlan {
        let inner = self.inner.read().await;
        self.plan_for(&inner)
    }

    /// Whether a complete credential pair is available for re-login.
    pub async fn has_credentials(&self) -> bool {
        self.inner.read().await.has_credentials()
    }

    /// Whether the credential store holds saved tokens.
    pub fn has_saved_tokens(&self) -> bool {
        self.store.as_ref().is_some_and(|store| store.exists())
    }

    /// Delete saved tokens from the credential store.
    pub fn clear_saved_tokens(&self) -> bool {
        match &self.store {
            Some(store) => match store.clear() {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to clear saved tokens: {}", e);
                    false
                }
            },
            None => false,
        }
    }

    /// Base URLs this session talks to.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn plan_for(&self, inner: &SessionInner) -> RecoveryPlan {
        RecoveryPlan::decide(
            inner.tokens.as_ref(),
            inner.has_credentials(),
            self.policy.proactive_refresh,
            Utc::now(),
        )
    }

    // Private helpers; callers hold `gate`.

    async fn authenticate_locked(&self) -> Result<()> {
        let credentials = {
            let inner = self.inner.read().await;
            match &inner.credentials {
                Some(credentials) if credentials.is_complete() => credentials.clone(),
                _ => {
                    return Err(Error::Config(
                        "Username and password required for authentication".to_string(),
                    ))
                }
            }
        };

        info!("Attempting authentication...");
        self.set_phase(Phase::Authenticating).await;
        let result = self.exchange.login(&credentials).await;

        self.finish(result, |issued| issued.refresh_token.take(), "Authentication successful")
            .await
    }

    async fn refresh_locked(&self) -> Result<()> {
        let previous_refresh = {
            let inner = self.inner.read().await;
            match &inner.tokens {
                Some(tokens) if !tokens.refresh_token().expose_secret().is_empty() => {
                    tokens.refresh_token().clone()
                }
                _ => return Err(Error::Refresh("No refresh token available".to_string())),
            }
        };

        info!("Refreshing authentication tokens...");
        self.set_phase(Phase::Refreshing).await;
        let result = self.exchange.refresh(&previous_refresh).await;

        let fallback = previous_refresh.expose_secret().to_string();
        self.finish(
            result,
            move |issued| Some(issued.refresh_token.take().unwrap_or(fallback)),
            "Tokens refreshed successfully",
        )
        .await
    }

    async fn finish(
        &self,
        result: Result<IssuedTokens>,
        refresh_token: impl FnOnce(&mut IssuedTokens) -> Option<String>,
        success: &str,
    ) -> Result<()> {
        match result {
            Ok(mut issued) => {
                let Some(refresh) = refresh_token(&mut issued) else {
                    self.fail().await;
                    return Err(Error::Authentication(
                        "No refresh token in response".to_string(),
                    ));
                };
                let tokens =
                    self.new_token_set(issued.access_token, refresh, Utc::now(), issued.ttl);
                self.install(tokens).await;
                info!("{}", success);
                Ok(())
            }
            Err(e) => {
                self.fail().await;
                Err(e)
            }
        }
    }

    fn new_token_set(
        &self,
        access: String,
        refresh: String,
        issued_at: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> TokenSet {
        let ttl = ttl.unwrap_or_else(|| Duration::seconds(self.policy.default_ttl_secs));
        TokenSet::new(access, refresh, issued_at, ttl).with_buffers(
            Duration::seconds(self.policy.expiry_buffer_secs),
            Duration::seconds(self.policy.refresh_buffer_secs),
        )
    }

    async fn install(&self, tokens: TokenSet) {
        {
            let mut inner = self.inner.write().await;
            inner.cookies.set_auth(
                tokens.access_token().expose_secret(),
                tokens.refresh_token().expose_secret(),
            );
            inner.tokens = Some(tokens.clone());
            inner.phase = Phase::Idle;
            inner.failed = false;
        }
        info!("Authentication tokens updated successfully");

        if let Some(store) = self.store.clone() {
            let stored = tokens.to_stored();
            match tokio::task::spawn_blocking(move || store.save(&stored)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Failed to save tokens: {}", e),
                Err(e) => warn!("Token save task failed: {}", e),
            }
        }
    }

    async fn fail(&self) {
        let mut inner = self.inner.write().await;
        inner.phase = Phase::Idle;
        inner.failed = true;
    }

    async fn set_phase(&self, phase: Phase) {
        self.inner.write().await.phase = phase;
    }

    fn base_headers(&self) -> Result<HeaderMap> {
        let invalid = |what: &str| Error::Config(format!("Invalid {} header value", what));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&self.endpoints.app_base_url).map_err(|_| invalid("Origin"))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&self.endpoints.referer()).map_err(|_| invalid("Referer"))?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent).map_err(|_| invalid("User-Agent"))?,
        );
        Ok(headers)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("endpoints", &self.endpoints)
            .field("tokens", &"[REDACTED]")
            .field("policy", &self.policy)
            .finish()
    }
}

/// Builder for [`SessionManager`].
///
/// Building never touches the network. Explicit tokens win over saved ones;
/// saved ones are only read when a store is configured.
#[derive(Default)]
pub struct SessionBuilder {
    credentials: Option<Credentials>,
    tokens: Option<(String, String)>,
    token_set: Option<TokenSet>,
    store: Option<Arc<dyn CredentialStore>>,
    use_saved_tokens: bool,
    config: ClientConfig,
    http: Option<reqwest::Client>,
}

impl SessionBuilder {
    /// Email and password used for login and re-login.
    pub fn credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(email, password));
        self
    }

    /// Seed with an access/refresh pair issued now.
    pub fn tokens(mut self, access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        self.tokens = Some((access_token.into(), refresh_token.into()));
        self
    }

    /// Seed with a prepared token set, keeping its own instants.
    pub fn token_set(mut self, tokens: TokenSet) -> Self {
        self.token_set = Some(tokens);
        self
    }

    /// Persist tokens to `store` and, unless disabled, seed from it.
    pub fn store(mut self, store: impl CredentialStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self.use_saved_tokens = true;
        self
    }

    /// Whether to seed from the store at build time.
    pub fn use_saved_tokens(mut self, enabled: bool) -> Self {
        self.use_saved_tokens = enabled;
        self
    }

    /// Client configuration (timeout, endpoints, session policy).
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing HTTP client instead of building one from the config.
    pub(crate) fn http(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the session.
    pub fn build(self) -> Result<SessionManager> {
        let http = match self.http {
            Some(http) => http,
            None => self.config.build_http()?,
        };
        let policy = self.config.session.clone();
        let buffers = (
            Duration::seconds(policy.expiry_buffer_secs),
            Duration::seconds(policy.refresh_buffer_secs),
        );

        let explicit = self
            .token_set
            .or_else(|| {
                self.tokens
                    .filter(|(access, refresh)| !access.is_empty() && !refresh.is_empty())
                    .map(|(access, refresh)| {
                        TokenSet::new(
                            access,
                            refresh,
                            Utc::now(),
                            Duration::seconds(policy.default_ttl_secs),
                        )
                    })
            });

        let tokens = match explicit {
            Some(tokens) => Some(tokens),
            None if self.use_saved_tokens => match self.store.as_ref().map(|s| s.load()) {
                Some(Ok(Some(stored))) => {
                    info!("Loaded saved authentication tokens");
                    Some(TokenSet::from(stored))
                }
                Some(Err(e)) => {
                    warn!("Failed to load saved tokens: {}", e);
                    None
                }
                _ => None,
            },
            None => None,
        }
        .map(|tokens| tokens.with_buffers(buffers.0, buffers.1));

        let mut cookies = CookieJar::new();
        if let Some(tokens) = &tokens {
            cookies.set_auth(
                tokens.access_token().expose_secret(),
                tokens.refresh_token().expose_secret(),
            );
        }

        let endpoints = self.config.endpoints.clone();
        Ok(SessionManager {
            inner: Arc::new(RwLock::new(SessionInner {
                tokens,
                cookies,
                credentials: self.credentials,
                phase: Phase::Idle,
                failed: false,
                recovery_epoch: 0,
                last_recovery_ok: true,
            })),
            gate: Arc::new(Mutex::new(())),
            exchange: AuthExchange::new(http, endpoints.clone()),
            store: self.store,
            endpoints,
            user_agent: self.config.user_agent,
            policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn hour_tokens() -> TokenSet {
        TokenSet::new("access", "refresh", t0(), Duration::seconds(3600))
    }

    #[test]
    fn test_plan_fresh_tokens_is_ready() {
        let tokens = hour_tokens();
        let plan = RecoveryPlan::decide(Some(&tokens), true, false, t0() + Duration::seconds(60));
        assert!(plan.is_ready());
    }

    #[test]
    fn test_plan_needs_refresh_without_proactive_is_ready() {
        let tokens = hour_tokens();
        let plan = RecoveryPlan::decide(Some(&tokens), true, false, t0() + Duration::seconds(2800));
        assert!(plan.is_ready());
    }

    #[test]
    fn test_plan_proactive_refresh_tolerates_failure() {
        let tokens = hour_tokens();
        let plan = RecoveryPlan::decide(Some(&tokens), true, true, t0() + Duration::seconds(2800));
        assert_eq!(plan.steps, vec![AuthStep::Refresh]);
        assert!(plan.valid_if_all_fail);
    }

    #[test]
    fn test_plan_expired_refreshes_then_relogs() {
        let tokens = hour_tokens();
        let now = t0() + Duration::seconds(3400);

        let plan = RecoveryPlan::decide(Some(&tokens), true, false, now);
        assert_eq!(plan.steps, vec![AuthStep::Refresh, AuthStep::Authenticate]);
        assert!(!plan.valid_if_all_fail);

        let plan = RecoveryPlan::decide(Some(&tokens), false, false, now);
        assert_eq!(plan.steps, vec![AuthStep::Refresh]);
    }

    #[test]
    fn test_plan_without_tokens() {
        let plan = RecoveryPlan::decide(None, true, false, t0());
        assert_eq!(plan.steps, vec![AuthStep::Authenticate]);

        let plan = RecoveryPlan::decide(None, false, false, t0());
        assert!(plan.steps.is_empty());
        assert!(!plan.is_ready());
    }

    #[test]
    fn test_state_derivation() {
        let mut inner = SessionInner {
            tokens: None,
            cookies: CookieJar::new(),
            credentials: None,
            phase: Phase::Idle,
            failed: false,
            recovery_epoch: 0,
            last_recovery_ok: true,
        };
        assert_eq!(inner.state_at(t0()), SessionState::NoCredentials);

        inner.credentials = Some(Credentials::new("a@b.c", "pw"));
        assert_eq!(inner.state_at(t0()), SessionState::Unauthenticated);

        inner.phase = Phase::Authenticating;
        assert_eq!(inner.state_at(t0()), SessionState::Authenticating);

        inner.phase = Phase::Idle;
        inner.failed = true;
        assert_eq!(inner.state_at(t0()), SessionState::Failed);

        inner.failed = false;
        inner.tokens = Some(hour_tokens());
        assert_eq!(inner.state_at(t0()), SessionState::Authenticated);
        assert_eq!(
            inner.state_at(t0() + Duration::seconds(2800)),
            SessionState::NeedsRefresh
        );
        assert_eq!(
            inner.state_at(t0() + Duration::seconds(3400)),
            SessionState::Expired
        );

        inner.phase = Phase::Refreshing;
        assert_eq!(
            inner.state_at(t0() + Duration::seconds(3400)),
            SessionState::Refreshing
        );
    }

    #[tokio::test]
    async fn test_no_credentials_session() {
        let session = SessionManager::builder().build().unwrap();
        assert_eq!(session.status().await, SessionState::NoCredentials);
        assert!(!session.authenticate().await);
        assert!(matches!(
            session.try_ensure_valid().await,
            Err(Error::Config(_))
        ));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_bring_your_own_tokens() {
        let session = SessionManager::with_tokens("access", "refresh").unwrap();
        assert!(session.is_authenticated().await);
        assert!(session.ensure_valid().await);
        assert_eq!(session.status().await, SessionState::Authenticated);
        assert!(!session.has_credentials().await);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let session = SessionManager::builder()
            .credentials("a@b.c", "pw")
            .tokens("access", "refresh")
            .build()
            .unwrap();

        session.logout().await;
        session.logout().await;

        assert!(!session.is_authenticated().await);
        assert!(session.tokens().await.is_none());
        assert!(!session.inner.read().await.cookies.has_auth());
        assert_eq!(session.status().await, SessionState::NoCredentials);
    }

    #[tokio::test]
    async fn test_login_rejects_empty_credentials() {
        let session = SessionManager::builder().build().unwrap();
        assert!(matches!(session.login("", "pw").await, Err(Error::Config(_))));
        assert!(!session.has_credentials().await);
    }

    #[tokio::test]
    async fn test_set_tokens_updates_cookies() {
        let session = SessionManager::builder().build().unwrap();
        session.set_tokens("a2", "r2").await;

        let headers = session
            .get_authenticated_headers(HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(
            headers.get(COOKIE).unwrap(),
            "auth-access-token=a2; auth-refresh-token=r2"
        );
        assert!(session.token_info().await.authenticated);
    }

    #[tokio::test]
    async fn test_headers_without_tokens_omit_cookie() {
        let session = SessionManager::builder().build().unwrap();
        let headers = session
            .get_authenticated_headers(HeaderMap::new())
            .await
            .unwrap();
        assert!(headers.get(COOKIE).is_none());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ORIGIN).unwrap(), "https://axiom.trade");
    }

    #[tokio::test]
    async fn test_debug_redacts_tokens() {
        let session = SessionManager::with_tokens("super-secret-token", "refresh").unwrap();
        let debug_str = format!("{:?}", session);
        assert!(!debug_str.contains("super-secret-token"));
        assert!(debug_str.contains("REDACTED"));
    }

    #[derive(Default)]
    struct RecordingStore {
        saved_on: std::sync::Mutex<Option<std::thread::ThreadId>>,
    }

    impl CredentialStore for Arc<RecordingStore> {
        fn load(&self) -> Result<Option<crate::auth::StoredTokens>> {
            Ok(None)
        }

        fn save(&self, _tokens: &crate::auth::StoredTokens) -> Result<()> {
            *self.saved_on.lock().unwrap() = Some(std::thread::current().id());
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            Ok(())
        }

        fn exists(&self) -> bool {
            self.saved_on.lock().unwrap().is_some()
        }
    }

    #[tokio::test]
    async fn test_store_writes_run_off_the_async_thread() {
        let store = Arc::new(RecordingStore::default());
        let session = SessionManager::builder().store(store.clone()).build().unwrap();

        session.set_tokens("a1", "r1").await;

        let saved_on = store.saved_on.lock().unwrap().expect("tokens saved");
        assert_ne!(saved_on, std::thread::current().id());
        assert!(session.has_saved_tokens());
    }
}
