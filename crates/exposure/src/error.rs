//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use exposure_config::ConfigError;
use exposure_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Snapshot ─────────────────────────────────────────────────────
    #[error("No snapshot configured")]
    #[diagnostic(
        code(exposure::no_snapshot),
        help(
            "Pass --snapshot <PATH>, set EXPOSURE_SNAPSHOT, or create a profile with:\n\
             exposure config init --snapshot <PATH>\n\
             Config expected at: {path}"
        )
    )]
    NoSnapshot { path: String },

    #[error("Snapshot file '{path}' not found")]
    #[diagnostic(
        code(exposure::snapshot_not_found),
        help("Check the --snapshot path or the profile's `snapshot` setting.")
    )]
    SnapshotNotFound { path: String },

    #[error("Could not read snapshot file '{path}'")]
    #[diagnostic(code(exposure::snapshot_unreadable))]
    SnapshotUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot is not a valid cache document")]
    #[diagnostic(
        code(exposure::invalid_snapshot),
        help("Expected a JSON cache document keyed by service, call and region.")
    )]
    InvalidSnapshot {
        #[source]
        source: serde_json::Error,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(exposure::not_found),
        help("Run: exposure {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(exposure::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(exposure::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: exposure config init --snapshot <PATH> --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(exposure::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(exposure::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(exposure::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::SnapshotNotFound { .. } | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Validation { .. }
            | Self::NoSnapshot { .. }
            | Self::ConfigExists { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError / ConfigError → CliError mapping ───────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Snapshot(source) => CliError::InvalidSnapshot { source },
            CoreError::InvalidPort { protocol: _, spec } => CliError::Validation {
                field: "port".into(),
                reason: format!("expected protocol:port[,port...], got '{spec}'"),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(err) => CliError::Io(err),
            other => CliError::Config(other),
        }
    }
}
