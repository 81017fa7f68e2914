//! CLI configuration: thin wrapper around `calypshome_config`.
//!
//! Adds the resolution step that lets `GlobalOpts` flags (--url, --username,
//! --insecure, --timeout) override whatever the active profile says.

use std::time::Duration;

use calypshome_api::{ClientConfig, TlsMode, TransportConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use calypshome_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Pick the profile to run with.
///
/// A profile named explicitly with `--profile` must exist. Otherwise a
/// missing profile falls back to an empty one, so flags and `CALYPSHOME_*`
/// variables alone are enough to reach a gateway.
fn select_profile(global: &GlobalOpts, config: &Config, name: &str) -> Result<Profile, CliError> {
    if let Some(profile) = config.profiles.get(name) {
        return Ok(profile.clone());
    }
    if global.profile.is_some() {
        let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: name.into(),
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }
    Ok(Profile::default())
}

/// Build a `ClientConfig` from the config file, active profile and flags.
pub fn resolve_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let mut profile = select_profile(global, &cfg, &profile_name)?;

    // Flags win over the profile
    if let Some(ref url) = global.url {
        profile.url = Some(url.clone());
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }

    let base_url = calypshome_config::parse_base_url(profile.url.as_deref())?;
    let credentials = calypshome_config::resolve_credentials(&profile, &profile_name)?;

    let tls = if global.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        calypshome_config::tls_mode(&profile, &cfg.defaults)
    };

    let timeout_secs = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);
    if timeout_secs == 0 {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    tracing::debug!(
        profile = %profile_name,
        base_url = %base_url,
        username = credentials.username(),
        timeout_secs,
        "resolved client configuration"
    );

    Ok(ClientConfig {
        base_url,
        credentials,
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(timeout_secs),
            ..TransportConfig::default()
        },
    })
}
