//! Clap derive structures for the `calypshome` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// calypshome -- drive Calypshome window coverings from the command line
#[derive(Debug, Parser)]
#[command(
    name = "calypshome",
    version,
    about = "Control Calypshome window coverings from the command line",
    long_about = "Lists the window coverings attached to a Calypshome gateway account\n\
        and sends them open, close, stop, level and tilt commands.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "CALYPSHOME_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway URL (overrides profile)
    #[arg(long, env = "CALYPSHOME_URL", global = true)]
    pub url: Option<String>,

    /// Account login (overrides profile)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CALYPSHOME_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: profile, then 5)
    #[arg(long, env = "CALYPSHOME_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the configured credentials against the gateway
    Login,

    /// List and inspect window coverings
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Move a window covering
    #[command(alias = "c")]
    Cover(CoverArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List all window coverings
    #[command(alias = "ls")]
    List,

    /// Show one window covering with all its attributes
    Get {
        /// Device id, name, or `<id>@<gateway>`
        device: String,
    },
}

// ── Cover ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CoverArgs {
    #[command(subcommand)]
    pub command: CoverCommand,
}

#[derive(Debug, Subcommand)]
pub enum CoverCommand {
    /// Fully open
    Open {
        /// Device id, name, or `<id>@<gateway>`
        device: String,
    },

    /// Fully close
    Close {
        /// Device id, name, or `<id>@<gateway>`
        device: String,
    },

    /// Stop the current motion
    Stop {
        /// Device id, name, or `<id>@<gateway>`
        device: String,
    },

    /// Move to a position
    Level {
        /// Device id, name, or `<id>@<gateway>`
        device: String,

        /// Target position, 0 (closed) to 100 (open)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },

    /// Set the slat angle on tilt-capable coverings
    Tilt {
        /// Device id, name, or `<id>@<gateway>`
        device: String,

        /// Target angle in degrees
        #[arg(allow_negative_numbers = true)]
        angle: i32,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the current configuration (passwords masked)
    Show,

    /// Interactively create or update a profile
    Init,

    /// Store a profile's password in the system keyring
    SetPassword,

    /// List configured profiles (`*` marks the default)
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
