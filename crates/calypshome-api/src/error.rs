use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `calypshome-api` crate.
///
/// Every failure surfaced by the client falls into one of the
/// [`ErrorKind`] buckets returned by [`Error::kind`]. Session expiry on a
/// regular call is recovered internally (one re-login and one retry); the
/// variants below are what remains once that recovery has been attempted.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login was rejected: no redirect status, or no session cookie.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The gateway still answered 401 after a fresh login.
    #[error("Session expired -- re-authentication did not restore access")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, reset, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request did not complete within the per-call deadline.
    #[error("Request timed out after {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The response did not match the expected vendor schema. Carries the
    /// raw body for debugging.
    #[error("Protocol error: {message}")]
    Protocol { message: String, body: String },

    // ── Input ───────────────────────────────────────────────────────
    /// A command argument was out of range; nothing was sent.
    #[error("Invalid argument: {message}")]
    Validation { message: String },
}

/// Coarse classification of [`Error`] for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Timeout,
    Transport,
    Protocol,
    Validation,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } | Self::SessionExpired => ErrorKind::Authentication,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Transport(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Transport(_) | Self::InvalidUrl(_) | Self::Tls(_) => ErrorKind::Transport,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::Validation { .. } => ErrorKind::Validation,
        }
    }

    /// Returns `true` if the credentials or session were rejected.
    pub fn is_auth_failure(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    /// Returns `true` if this is a transient error a caller may choose to retry.
    ///
    /// The client itself never retries these.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    pub(crate) fn protocol(message: impl Into<String>, body: &[u8]) -> Self {
        Self::Protocol {
            message: message.into(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}
