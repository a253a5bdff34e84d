//! Configuration for the exposure CLI.
//!
//! TOML profiles naming cached snapshot files, output defaults, and extra
//! service port checks layered on top of the built-in catalog. Loading
//! merges defaults, the config file, then `EXPOSURE_*` environment
//! variables (nested keys separated by `__`).

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use exposure_core::ServicePorts;
use exposure_core::engine::builtin_services;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no snapshot configured")]
    NoSnapshot,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

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
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named snapshot profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Extra port checks, keyed by service name.
    #[serde(default)]
    pub services: BTreeMap<String, ServiceSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
            services: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named project snapshot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Path to the cached API snapshot (JSON).
    pub snapshot: PathBuf,

    /// Project name used in resource labels when the snapshot lacks one.
    pub project: Option<String>,
}

/// Ports of a user-defined service check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tcp: Vec<u16>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub udp: Vec<u16>,
}

impl ServiceSpec {
    pub fn to_service_ports(&self, name: &str) -> Result<ServicePorts, ConfigError> {
        if self.tcp.is_empty() && self.udp.is_empty() {
            return Err(ConfigError::Validation {
                field: format!("services.{name}"),
                reason: "at least one tcp or udp port is required".into(),
            });
        }
        let mut service = ServicePorts::new(name);
        if !self.tcp.is_empty() {
            service = service.with("tcp", &self.tcp);
        }
        if !self.udp.is_empty() {
            service = service.with("udp", &self.udp);
        }
        Ok(service)
    }
}

impl Config {
    /// Resolve a profile by name, falling back to `default_profile`.
    ///
    /// An explicitly requested profile must exist; a missing default
    /// profile means nothing is configured.
    pub fn profile(&self, requested: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        if let Some(name) = requested {
            return self
                .profiles
                .get_key_value(name)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() });
        }
        self.default_profile
            .as_deref()
            .and_then(|name| self.profiles.get_key_value(name))
            .map(|(k, v)| (k.as_str(), v))
            .ok_or(ConfigError::NoSnapshot)
    }

    /// The built-in catalog followed by configured services. A configured
    /// service replaces a built-in one of the same name (ignoring case).
    pub fn service_checks(&self) -> Result<Vec<ServicePorts>, ConfigError> {
        let configured = self
            .services
            .iter()
            .map(|(name, spec)| spec.to_service_ports(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut checks: Vec<ServicePorts> = builtin_services()
            .into_iter()
            .filter(|builtin| {
                !configured
                    .iter()
                    .any(|c| c.name.eq_ignore_ascii_case(&builtin.name))
            })
            .collect();
        checks.extend(configured);
        Ok(checks)
    }

    /// Look up one service check by name (ignoring case).
    pub fn find_service(&self, name: &str) -> Result<Option<ServicePorts>, ConfigError> {
        Ok(self
            .service_checks()?
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name)))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "exposure", "exposure").map_or_else(
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
    p.push("exposure");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + environment. A missing file yields
/// the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    tracing::debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("EXPOSURE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent
/// directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
