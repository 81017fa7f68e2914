//! Shared configuration for Calypshome tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `calypshome_api::ClientConfig`. The API crate never reads
//! configuration itself; it receives a pre-built `ClientConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use calypshome_api::{ClientConfig, Credentials, DEFAULT_BASE_URL, TlsMode, TransportConfig};

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "calypshome";

/// Prefix of environment variables read by the loader.
pub const ENV_PREFIX: &str = "CALYPSHOME_";

const ENV_USERNAME: &str = "CALYPSHOME_USERNAME";
const ENV_PASSWORD: &str = "CALYPSHOME_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    5
}

/// A named account profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway origin. Defaults to the hosted service.
    pub url: Option<String>,

    /// Account login.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "calypshome", "calypshome").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("calypshome");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path`, overlaid with `CALYPSHOME_*` variables.
///
/// Nested keys use a double underscore: `CALYPSHOME_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve the account username: profile, then `CALYPSHOME_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var(ENV_USERNAME).ok())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the password.
///
/// Order: the profile's `password_env` variable, `CALYPSHOME_PASSWORD`,
/// the system keyring, then plaintext in the config file.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Shared env var
    if let Ok(val) = std::env::var(ENV_PASSWORD) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    let username = resolve_username(profile, profile_name)?;
    let password = resolve_password(profile, profile_name)?;
    Ok(Credentials::new(username, password))
}

/// Parse a gateway origin, falling back to the hosted service.
pub fn parse_base_url(url: Option<&str>) -> Result<url::Url, ConfigError> {
    let raw = url.unwrap_or(DEFAULT_BASE_URL);
    let parsed: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected an http(s) URL, got: {raw}"),
        });
    }
    Ok(parsed)
}

/// TLS mode for a profile.
pub fn tls_mode(profile: &Profile, defaults: &Defaults) -> TlsMode {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    }
}

/// Build a `ClientConfig` from a profile, no CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let base_url = parse_base_url(profile.url.as_deref())?;
    let credentials = resolve_credentials(profile, profile_name)?;

    let transport = TransportConfig {
        tls: tls_mode(profile, defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        ..TransportConfig::default()
    };

    Ok(ClientConfig {
        base_url,
        credentials,
        transport,
    })
}
