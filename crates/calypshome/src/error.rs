//! CLI error types with miette diagnostics.
//!
//! Maps API and config errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use calypshome_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the gateway at {url}")]
    #[diagnostic(
        code(calypshome::connection_failed),
        help(
            "Check your network connection and the gateway URL.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(calypshome::tls_error),
        help("Use --insecure (-k) to skip verification, or configure ca_cert in your profile.")
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(calypshome::auth_failed),
        help(
            "Verify your username and password.\n\
             Run: calypshome config set-password --profile <name>"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(calypshome::no_credentials),
        help(
            "Configure credentials with: calypshome config init\n\
             Or set CALYPSHOME_USERNAME and CALYPSHOME_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Device '{identifier}' not found")]
    #[diagnostic(
        code(calypshome::not_found),
        help("Run: calypshome devices list to see available devices")
    )]
    NotFound { identifier: String },

    #[error("The gateway did not accept {action} for device '{device}'")]
    #[diagnostic(code(calypshome::action_rejected))]
    ActionRejected { action: String, device: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Unexpected gateway response: {message}")]
    #[diagnostic(
        code(calypshome::protocol),
        help("Re-run with -vv to log the raw exchange.")
    )]
    Protocol { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(calypshome::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(calypshome::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: calypshome config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(calypshome::config))]
    Config(Box<figment::Error>),

    #[error("Could not access the system keyring: {0}")]
    #[diagnostic(
        code(calypshome::keyring),
        help("Set CALYPSHOME_PASSWORD or store the password in the config file instead.")
    )]
    Keyring(String),

    #[error("Interactive prompt failed: {0}")]
    #[diagnostic(code(calypshome::prompt))]
    Prompt(String),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {millis}ms")]
    #[diagnostic(
        code(calypshome::timeout),
        help("Increase timeout with --timeout or check gateway responsiveness.")
    )]
    Timeout { millis: u128 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── API error → CliError mapping ─────────────────────────────────────

impl From<calypshome_api::Error> for CliError {
    fn from(err: calypshome_api::Error) -> Self {
        use calypshome_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } => Self::AuthFailed { message },
            ApiError::SessionExpired => Self::AuthFailed {
                message: "session rejected after re-login".into(),
            },
            ApiError::Timeout { timeout } => Self::Timeout {
                millis: timeout.as_millis(),
            },
            ApiError::Transport(e) => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: Box::new(e),
            },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            ApiError::Tls(message) => Self::TlsError { message },
            ApiError::Protocol { message, .. } => Self::Protocol { message },
            ApiError::Validation { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Serialization(e) => Self::Toml(e),
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Keyring(e) => Self::Keyring(e.to_string()),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}
