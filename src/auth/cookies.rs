//! Cookie jar holding the authentication cookies sent with every request.

use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "auth-access-token";

/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "auth-refresh-token";

/// Cookie name to value mapping, rendered as a single `Cookie` header.
///
/// Names are unique; setting an existing name replaces its value in place.
/// The two authentication cookies are always written and removed together.
#[derive(Default, Clone)]
pub struct CookieJar {
    entries: Vec<(String, SecretString)>,
}

impl CookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a single non-authentication cookie.
    ///
    /// The authentication cookies can only be written as a pair through
    /// [`set_auth`](Self::set_auth); naming either one here is rejected.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        if is_auth_cookie(&name) {
            return Err(Error::InvalidInput(format!(
                "{} must be set together with its pair via set_auth",
                name
            )));
        }
        self.insert(name, value.into());
        Ok(())
    }

    fn insert(&mut self, name: String, value: String) {
        let value = SecretString::from(value);
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a cookie value.
    pub fn get(&self, name: &str) -> Option<&SecretString> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Set both authentication cookies.
    pub fn set_auth(&mut self, access: &str, refresh: &str) {
        self.insert(ACCESS_TOKEN_COOKIE.to_string(), access.to_string());
        self.insert(REFRESH_TOKEN_COOKIE.to_string(), refresh.to_string());
        tracing::debug!("Authentication cookies updated");
    }

    /// Remove both authentication cookies; a no-op when they are absent.
    pub fn clear_auth(&mut self) {
        self.entries.retain(|(n, _)| !is_auth_cookie(n));
        tracing::debug!("Authentication cookies cleared");
    }

    /// Both authentication cookies are present.
    pub fn has_auth(&self) -> bool {
        self.get(ACCESS_TOKEN_COOKIE).is_some() && self.get(REFRESH_TOKEN_COOKIE).is_some()
    }

    /// `name=value; name=value` in insertion order, or an empty string.
    ///
    /// Callers must omit the header when this is empty.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("{}={}", name, value.expose_secret()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Number of cookies in the jar.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the jar holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_auth_cookie(name: &str) -> bool {
    name == ACCESS_TOKEN_COOKIE || name == REFRESH_TOKEN_COOKIE
}

impl std::fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| format!("{}=[REDACTED]", name)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        assert_eq!(CookieJar::new().render(), "");
    }

    #[test]
    fn test_set_auth_renders_both() {
        let mut jar = CookieJar::new();
        jar.set_auth("a1", "r1");
        assert!(jar.has_auth());
        assert_eq!(jar.render(), "auth-access-token=a1; auth-refresh-token=r1");
    }

    #[test]
    fn test_set_auth_replaces_in_place() {
        let mut jar = CookieJar::new();
        jar.set("theme", "dark").unwrap();
        jar.set_auth("a1", "r1");
        jar.set_auth("a2", "r2");
        assert_eq!(jar.len(), 3);
        assert_eq!(
            jar.render(),
            "theme=dark; auth-access-token=a2; auth-refresh-token=r2"
        );
    }

    #[test]
    fn test_clear_auth_is_idempotent() {
        let mut jar = CookieJar::new();
        jar.set("theme", "dark").unwrap();
        jar.set_auth("a1", "r1");
        jar.clear_auth();
        jar.clear_auth();
        assert!(!jar.has_auth());
        assert_eq!(jar.render(), "theme=dark");
    }

    #[test]
    fn test_auth_cookies_cannot_be_set_alone() {
        let mut jar = CookieJar::new();
        assert!(matches!(
            jar.set(ACCESS_TOKEN_COOKIE, "a1"),
            Err(Error::InvalidInput(_))
        ));
        assert!(jar.set(REFRESH_TOKEN_COOKIE, "r1").is_err());
        assert!(!jar.has_auth());
        assert!(jar.is_empty());
        assert_eq!(jar.render(), "");
    }

    #[test]
    fn test_debug_redacts_values() {
        let mut jar = CookieJar::new();
        jar.set_auth("secret-access", "secret-refresh");
        let debug_str = format!("{:?}", jar);
        assert!(!debug_str.contains("secret-access"));
        assert!(debug_str.contains("auth-access-token=[REDACTED]"));
    }
}
