//! Command dispatch: bridges CLI args -> snapshot-backed analysis -> output
//! formatting.

pub mod clusters;
pub mod config_cmd;
pub mod firewall;
pub mod functions;
pub mod instances;
pub mod paths;
pub mod util;

use exposure_core::Snapshot;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Everything a snapshot-bound command needs.
pub struct Context {
    pub snapshot: Snapshot,
    /// Project label for resource names; empty when unknown.
    pub project: String,
    pub config: Config,
}

impl Context {
    pub fn new(snapshot: Snapshot, project_override: Option<String>, config: Config) -> Self {
        let project = project_override
            .or_else(|| snapshot.project())
            .unwrap_or_default();
        Self {
            snapshot,
            project,
            config,
        }
    }
}

/// Dispatch a snapshot-bound command to the appropriate handler.
pub fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Firewall(args) => firewall::handle(ctx, args, global),
        Command::Paths(args) => paths::handle(ctx, &args, global),
        Command::Instances => instances::handle(ctx, global),
        Command::Functions => functions::handle(ctx, global),
        Command::Clusters => clusters::handle(ctx, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
