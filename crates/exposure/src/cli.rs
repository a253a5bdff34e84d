//! Clap derive structures for the `exposure` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// exposure -- find cloud resources reachable from the public internet
#[derive(Debug, Parser)]
#[command(
    name = "exposure",
    version,
    about = "Audit cached cloud snapshots for public network exposure",
    long_about = "Reads a cached API snapshot of a cloud project and reports which\n\
        firewall rules, instances, functions and clusters are reachable from\n\
        the public internet, and through which load-balancer chain.",
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
    /// Snapshot profile to use
    #[arg(long, short = 'p', env = "EXPOSURE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Snapshot file (overrides profile)
    #[arg(long, short = 'f', env = "EXPOSURE_SNAPSHOT", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Project name used in resource labels (overrides profile and snapshot)
    #[arg(long, env = "EXPOSURE_PROJECT", global = true)]
    pub project: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "EXPOSURE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EXPOSURE_OUTPUT",
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
    /// Plain text, one line per item (scripting)
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
    /// Evaluate firewall rules
    #[command(alias = "fw")]
    Firewall(FirewallArgs),

    /// Trace load-balancer delivery paths to one resource
    Paths(PathsArgs),

    /// Report exposure of every compute instance
    #[command(alias = "vm")]
    Instances,

    /// Report exposure of every HTTPS-triggered function
    #[command(alias = "fn")]
    Functions,

    /// Report control-plane exposure of managed clusters
    Clusters,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FIREWALL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FirewallArgs {
    #[command(subcommand)]
    pub command: FirewallCommand,
}

#[derive(Debug, Subcommand)]
pub enum FirewallCommand {
    /// Exposure verdict per network
    Verdict {
        /// Only this network (name or link)
        #[arg(long, short = 'n')]
        network: Option<String>,
    },

    /// Rules opening well-known service ports to the public
    OpenPorts {
        /// Service to check (repeatable; defaults to every known service)
        #[arg(long, short = 's')]
        service: Vec<String>,

        /// Ad-hoc check as protocol:port[,port...] (repeatable), e.g. tcp:8080
        #[arg(long)]
        port: Vec<String>,
    },

    /// Rules opening every port to the public
    AllPorts {
        /// Check egress rules against destination ranges
        #[arg(long)]
        egress: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PATHS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PathsArgs {
    /// Resource self-link (instance, instance group, NEG) or HTTPS trigger URL
    #[arg(long, short = 'r')]
    pub resource: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a config file with one snapshot profile
    Init {
        /// Snapshot file the profile points at
        #[arg(long)]
        snapshot: PathBuf,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Project name for resource labels
        #[arg(long = "project-name")]
        project_name: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
