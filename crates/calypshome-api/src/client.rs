// Gateway client
//
// Ties the session manager to the transport. Every authenticated call goes
// through `call`, which ensures a session, attaches it, and on a 401 logs in
// again and resends the request once. Endpoint methods live in `devices.rs`
// and `actions.rs` as inherent impls.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{Credentials, SessionToken};
use crate::error::Error;
use crate::session::SessionManager;
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportConfig};

/// Origin of the hosted gateway web API.
pub const DEFAULT_BASE_URL: &str = "https://ma.calypshome.com";

/// Everything needed to build a [`CalypshomeClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub credentials: Credentials,
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Config for the hosted origin with default transport settings.
    pub fn new(credentials: Credentials) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            credentials,
            transport: TransportConfig::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }
}

/// Session-authenticated client for one gateway account.
///
/// Safe to share behind an `Arc`; concurrent callers reuse one session and
/// at most one login is in flight at a time.
#[derive(Debug)]
pub struct CalypshomeClient {
    transport: Transport,
    session: SessionManager,
}

impl CalypshomeClient {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let transport = Transport::new(config.base_url, &config.transport)?;
        Ok(Self::with_transport(transport, config.credentials))
    }

    /// Build a client around an existing transport.
    pub fn with_transport(transport: Transport, credentials: Credentials) -> Self {
        Self {
            transport,
            session: SessionManager::new(credentials),
        }
    }

    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Log in now, replacing any existing session.
    pub async fn login(&self) -> Result<SessionToken, Error> {
        self.session.login(&self.transport).await
    }

    /// Current session token, logging in if there is none.
    pub async fn ensure_session(&self) -> Result<SessionToken, Error> {
        self.session.ensure_session(&self.transport).await
    }

    /// Forget the current session.
    pub async fn invalidate(&self) {
        self.session.invalidate().await;
    }

    pub async fn has_session(&self) -> bool {
        self.session.has_session().await
    }

    /// Execute an authenticated request.
    ///
    /// A 401 answer discards the session, logs in again and resends the
    /// request once. A second 401 fails with [`Error::SessionExpired`].
    pub async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        let mut reauthenticated = false;
        loop {
            let token = self.ensure_session().await?;
            let resp = self.transport.execute(request, Some(&token)).await?;

            if resp.status != StatusCode::UNAUTHORIZED {
                return Ok(resp);
            }
            if reauthenticated {
                warn!(path = request.path(), "still unauthorized after re-login");
                return Err(Error::SessionExpired);
            }

            debug!(path = request.path(), "session expired, logging in again");
            self.session.invalidate_if(&token).await;
            reauthenticated = true;
        }
    }
}
