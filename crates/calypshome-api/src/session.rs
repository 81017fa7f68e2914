// Session management
//
// Owns the gateway session token. Login posts the account form to `/login`
// and reads the session cookie from the redirect response. The state sits
// behind an async mutex that is held across the login request, so callers
// racing to authenticate share a single in-flight login.

use secrecy::ExposeSecret;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::{Credentials, SessionToken, extract_session_cookie};
use crate::error::Error;
use crate::transport::{ApiRequest, Transport};

pub(crate) const LOGIN_PATH: &str = "/login";

/// Login state of a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Absent,
    Present(SessionToken),
}

/// Holds the credentials and the current session for one client instance.
#[derive(Debug)]
pub struct SessionManager {
    credentials: Credentials,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            state: Mutex::new(SessionState::Absent),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub async fn has_session(&self) -> bool {
        matches!(*self.state.lock().await, SessionState::Present(_))
    }

    /// Return the current token, logging in first if there is none.
    pub async fn ensure_session(&self, transport: &Transport) -> Result<SessionToken, Error> {
        let mut state = self.state.lock().await;
        if let SessionState::Present(ref token) = *state {
            return Ok(token.clone());
        }
        let token = self.authenticate(transport).await?;
        *state = SessionState::Present(token.clone());
        Ok(token)
    }

    /// Perform a fresh login, replacing any current token.
    ///
    /// On failure the session is left absent.
    pub async fn login(&self, transport: &Transport) -> Result<SessionToken, Error> {
        let mut state = self.state.lock().await;
        *state = SessionState::Absent;
        let token = self.authenticate(transport).await?;
        *state = SessionState::Present(token.clone());
        Ok(token)
    }

    /// Drop the current token so the next call logs in again.
    pub async fn invalidate(&self) {
        *self.state.lock().await = SessionState::Absent;
    }

    /// Drop the current token only if it is still `stale`.
    ///
    /// A caller that saw a 401 must not discard a token another caller
    /// obtained in the meantime.
    pub(crate) async fn invalidate_if(&self, stale: &SessionToken) {
        let mut state = self.state.lock().await;
        if matches!(*state, SessionState::Present(ref current) if current == stale) {
            debug!("session expired, discarding token");
            *state = SessionState::Absent;
        }
    }

    async fn authenticate(&self, transport: &Transport) -> Result<SessionToken, Error> {
        debug!(
            username = %self.credentials.username(),
            password = %self.credentials.masked_password(),
            "session init"
        );

        let request = ApiRequest::post(LOGIN_PATH)
            .form(vec![
                ("_login", self.credentials.username().to_owned()),
                (
                    "_password",
                    self.credentials.password().expose_secret().to_owned(),
                ),
                ("_submit", "Sign in".to_owned()),
            ])
            .sensitive();

        let resp = transport.execute(&request, None).await?;

        if !resp.status.is_redirection() {
            warn!(status = resp.status.as_u16(), "login was not redirected");
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {}), expected a redirect", resp.status),
            });
        }

        let Some(token) = extract_session_cookie(&resp.headers) else {
            warn!("login response carried no session cookie");
            return Err(Error::Authentication {
                message: "login failed: no JSESSIONID cookie in response".into(),
            });
        };

        info!(username = %self.credentials.username(), "logged in");
        Ok(token)
    }
}
