use std::fmt;

use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};

/// Name of the session cookie issued by the gateway.
pub const SESSION_COOKIE: &str = "JSESSIONID";

const MASK_CHAR: char = '*';

/// Account credentials for the gateway.
///
/// Immutable once built. The password is only ever exposed to build the
/// login form; everywhere else it is shown masked.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    /// The password as a run of `*`, one per character.
    pub fn masked_password(&self) -> String {
        mask(self.password.expose_secret())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.masked_password())
            .finish()
    }
}

fn mask(secret: &str) -> String {
    std::iter::repeat_n(MASK_CHAR, secret.chars().count()).collect()
}

/// Opaque session credential returned by a successful login.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// The raw token value.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// `Cookie` header value carrying this token.
    pub(crate) fn cookie_header(&self) -> String {
        format!("{SESSION_COOKIE}={}", self.expose())
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SessionToken {}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Find the session cookie in the `Set-Cookie` headers of a login response.
///
/// Matches `JSESSIONID=<value>` where the value runs up to the next `;`.
/// An empty value does not count.
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(session_value)
        .map(SessionToken::new)
}

fn session_value(set_cookie: &str) -> Option<&str> {
    let marker = format!("{SESSION_COOKIE}=");
    let start = set_cookie.find(&marker)? + marker.len();
    let rest = &set_cookie[start..];
    let value = rest.split(';').next().unwrap_or_default().trim();
    (!value.is_empty()).then_some(value)
}
