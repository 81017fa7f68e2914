//! Config subcommand handlers. None of these touch the network.

use dialoguer::{Confirm, Input, Select};

use calypshome_api::DEFAULT_BASE_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

fn profile_names(cfg: &Config) -> Vec<String> {
    let mut names: Vec<String> = cfg.profiles.keys().cloned().collect();
    names.sort_unstable();
    names
}

/// Copy of the config safe to print: plaintext passwords are masked.
fn masked(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = masked(config::load_config_or_default());
            let as_toml = toml::to_string_pretty(&cfg)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| as_toml.clone(),
                |c| profile_names(c).join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => init(global),

        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let password = rpassword::prompt_password(format!("Password for '{profile_name}': "))
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            calypshome_config::store_password(&profile_name, &password)?;
            eprintln!("✓ Password for profile '{profile_name}' stored in system keyring");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: calypshome config init");
            } else {
                for name in profile_names(&cfg) {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                let available = profile_names(&cfg);
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    let mut cfg = config::load_config_or_default();

    eprintln!("Calypshome configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("Gateway URL")
        .default(DEFAULT_BASE_URL.into())
        .interact_text()
        .map_err(prompt_err)?;
    calypshome_config::parse_base_url(Some(&url))?;

    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)?;
    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;

    if username.is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let password_field = if store_selection == 0 {
        calypshome_config::store_password(&profile_name, &password)?;
        eprintln!("   ✓ Password stored in system keyring");
        None
    } else {
        Some(password)
    };

    let profile = Profile {
        url: (url != DEFAULT_BASE_URL).then_some(url),
        username: Some(username),
        password: password_field,
        ..Profile::default()
    };
    cfg.profiles.insert(profile_name.clone(), profile);

    let has_default = cfg
        .default_profile
        .as_ref()
        .is_some_and(|d| d != &profile_name && cfg.profiles.contains_key(d));
    let make_default = !has_default
        || Confirm::new()
            .with_prompt(format!("Make '{profile_name}' the default profile?"))
            .default(false)
            .interact()
            .map_err(prompt_err)?;
    if make_default {
        cfg.default_profile = Some(profile_name.clone());
    }

    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Test it: calypshome login");
    Ok(())
}
