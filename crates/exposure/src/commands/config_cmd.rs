//! Config subcommand handlers.

use std::path::Path;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config as TOML-like text for the table view.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "snapshot = \"{}\"", p.snapshot.display());
        if let Some(ref project) = p.project {
            let _ = writeln!(out, "project = \"{project}\"");
        }
    }

    for (name, spec) in &cfg.services {
        let _ = writeln!(out);
        let _ = writeln!(out, "[services.{name}]");
        if !spec.tcp.is_empty() {
            let _ = writeln!(out, "tcp = {:?}", spec.tcp);
        }
        if !spec.udp.is_empty() {
            let _ = writeln!(out, "udp = {:?}", spec.udp);
        }
    }

    out.trim_end().to_owned()
}

/// Config written by `config init`.
fn initial_config(name: &str, snapshot: &Path, project: Option<String>) -> Config {
    let mut cfg = Config {
        default_profile: Some(name.to_owned()),
        ..Config::default()
    };
    cfg.profiles.insert(
        name.to_owned(),
        Profile {
            snapshot: snapshot.to_path_buf(),
            project,
        },
    );
    cfg
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            snapshot,
            name,
            project_name,
            force,
        } => {
            let path = config::config_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            if name.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "profile name must not be empty".into(),
                });
            }

            let cfg = initial_config(&name, &snapshot, project_name);
            config::save_config_to(&cfg, &path)?;
            tracing::info!(path = %path.display(), profile = %name, "config written");

            eprintln!("✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {name}");
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config(global)?;
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.default_profile.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path(global).display());
            Ok(())
        }
    }
}
