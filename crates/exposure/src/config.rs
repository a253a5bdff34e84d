//! CLI configuration: thin wrapper around `exposure_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--config, --snapshot, --project).

use std::path::{Path, PathBuf};

use exposure_core::Snapshot;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use exposure_config::{Config, ConfigError, Profile, load_config_from, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// The config file in effect: `--config` / `EXPOSURE_CONFIG`, else the
/// platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(exposure_config::config_path)
}

pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&config_path(global))?)
}

/// Where to read the snapshot from, and the project label the profile
/// supplies (if any).
///
/// `--snapshot` wins over profiles; `--project` wins over everything.
pub fn resolve_snapshot(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(PathBuf, Option<String>), CliError> {
    if let Some(ref path) = global.snapshot {
        let project = global.project.clone().or_else(|| {
            cfg.profile(global.profile.as_deref())
                .ok()
                .and_then(|(_, p)| p.project.clone())
        });
        return Ok((path.clone(), project));
    }

    match cfg.profile(global.profile.as_deref()) {
        Ok((name, profile)) => {
            tracing::debug!(profile = name, "using snapshot profile");
            let project = global.project.clone().or_else(|| profile.project.clone());
            Ok((profile.snapshot.clone(), project))
        }
        Err(ConfigError::UnknownProfile { name }) => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            })
        }
        Err(ConfigError::NoSnapshot) => Err(CliError::NoSnapshot {
            path: config_path(global).display().to_string(),
        }),
        Err(other) => Err(other.into()),
    }
}

/// Read and parse a snapshot file.
pub async fn read_snapshot(path: &Path) -> Result<Snapshot, CliError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|source| {
        let path = path.display().to_string();
        if source.kind() == std::io::ErrorKind::NotFound {
            CliError::SnapshotNotFound { path }
        } else {
            CliError::SnapshotUnreadable { path, source }
        }
    })?;
    let snapshot = Snapshot::from_json(&raw)?;
    tracing::debug!(path = %path.display(), "snapshot loaded");
    Ok(snapshot)
}
