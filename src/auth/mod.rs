//! Authentication and session management for the Axiom Trade API.
//!
//! The platform authenticates with an access/refresh token pair delivered as
//! cookies. [`SessionManager`] owns that pair and keeps it valid:
//!
//! 1. **Login** - `POST /api/auth/login` with email and password
//! 2. **Refresh** - `POST /api/auth/refresh` with the refresh token cookie
//! 3. **Fallback** - a rejected refresh falls back to a fresh login when
//!    credentials are available
//!
//! Refreshes happen lazily, on the next request that needs valid tokens.
//!
//! # Credentials
//!
//! ```no_run
//! use axiomtrade_rs::auth::SessionManager;
//!
//! # async fn example() -> axiomtrade_rs::Result<()> {
//! let session = SessionManager::with_credentials("trader@example.com", "password")?;
//! assert!(session.authenticate().await);
//! # Ok(())
//! # }
//! ```
//!
//! # Existing tokens
//!
//! Tokens obtained elsewhere can be used without credentials. They are
//! refreshed as usual but cannot be re-established by a login:
//!
//! ```no_run
//! use axiomtrade_rs::auth::{FileCredentialStore, SessionManager};
//!
//! # fn example() -> axiomtrade_rs::Result<()> {
//! let session = SessionManager::builder()
//!     .tokens("access-token", "refresh-token")
//!     .store(FileCredentialStore::default_location()?)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod cookies;
mod exchange;
mod session;
mod store;
mod tokens;

pub use cookies::{CookieJar, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use exchange::Credentials;
pub use session::{AuthStep, RecoveryPlan, SessionBuilder, SessionManager, SessionState};
pub use store::{CredentialStore, FileCredentialStore};
pub use tokens::{
    StoredTokens, TokenInfo, TokenSet, DEFAULT_TOKEN_TTL_SECS, EXPIRY_BUFFER_SECS,
    REFRESH_BUFFER_SECS,
};
