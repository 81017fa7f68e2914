// HTTP transport for the gateway.
//
// Builds the `reqwest::Client` (no redirect following, TLS mode), executes a
// single request inside its own timeout scope, attaches the session cookie,
// and emits a redacted debug trace of every call.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use tracing::{debug, error};
use url::Url;

use crate::auth::SessionToken;
use crate::error::Error;

/// Per-call deadline used by the gateway integration.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const REDACTED: &str = "[REDACTED]";

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the bundled webpki roots.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate.
    DangerAcceptInvalid,
}

/// Transport configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("calypshome-api/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Redirects are never followed: the login handshake is read from the
    /// redirect response itself.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(self.user_agent.as_str());

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── Request / response ───────────────────────────────────────────────

/// A request against one of the gateway's fixed paths.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: &'static str,
    headers: HeaderMap,
    form: Option<Vec<(&'static str, String)>>,
    /// Keeps the body out of the debug trace (login form).
    sensitive: bool,
}

impl ApiRequest {
    /// A `POST` request, the gateway's default method.
    pub fn post(path: &'static str) -> Self {
        Self {
            method: Method::POST,
            path,
            headers: HeaderMap::new(),
            form: None,
            sensitive: false,
        }
    }

    /// Override the method; the gateway's own endpoints are all `POST`.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn accept_json(mut self) -> Self {
        self.headers
            .insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        self
    }

    /// Url-form-encoded body. Sets `Content-Type` accordingly.
    pub fn form(mut self, fields: Vec<(&'static str, String)>) -> Self {
        self.form = Some(fields);
        self
    }

    pub(crate) fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn path(&self) -> &'static str {
        self.path
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

// ── Transport ────────────────────────────────────────────────────────

/// Executes single requests against the gateway origin.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl Transport {
    pub fn new(base_url: Url, config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
            base_url,
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    /// Send one request and buffer its response.
    ///
    /// The whole exchange, body included, runs under the configured deadline.
    /// When `session` is `Some`, the session cookie is attached.
    pub async fn execute(
        &self,
        request: &ApiRequest,
        session: Option<&SessionToken>,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(request.path)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .headers(request.headers.clone());
        if let Some(ref form) = request.form {
            builder = builder.form(form);
        }
        if let Some(token) = session {
            builder = builder.header(header::COOKIE, token.cookie_header());
        }

        if request.sensitive {
            debug!(method = %request.method, %url, "API call");
        } else {
            debug!(
                method = %request.method,
                %url,
                headers = ?request.headers,
                form = ?request.form,
                session = session.is_some(),
                "API call"
            );
        }

        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp.bytes().await?;
            Ok::<_, reqwest::Error>(ApiResponse {
                status,
                headers,
                body,
            })
        };

        let response = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(%url, error = %e, "API call failed");
                return Err(if e.is_timeout() {
                    Error::Timeout {
                        timeout: self.timeout,
                    }
                } else {
                    Error::Transport(e)
                });
            }
            Err(_) => {
                error!(%url, timeout = ?self.timeout, "API call timed out");
                return Err(Error::Timeout {
                    timeout: self.timeout,
                });
            }
        };

        debug!(
            %url,
            status = response.status.as_u16(),
            reason = response.status.canonical_reason().unwrap_or(""),
            headers = ?redact_headers(&response.headers),
            "API call response"
        );

        Ok(response)
    }
}

/// Header list safe for logging: cookie values are replaced.
pub fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if *name == header::SET_COOKIE || *name == header::COOKIE {
                REDACTED.to_owned()
            } else {
                value.to_str().unwrap_or("<binary>").to_owned()
            };
            (name.as_str().to_owned(), shown)
        })
        .collect()
}
