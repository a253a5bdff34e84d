//! Delivery path handler.

use tabled::Tabled;

use exposure_core::{DeliveryChainResolver, DeliveryPath, LoadBalancerInventory, TargetResource};

use crate::cli::{GlobalOpts, PathsArgs};
use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Tabled)]
struct PathRow {
    #[tabled(rename = "Forwarding Rule")]
    forwarding_rule: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Scheme")]
    scheme: String,
    #[tabled(rename = "Public")]
    public: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&DeliveryPath> for PathRow {
    fn from(p: &DeliveryPath) -> Self {
        Self {
            forwarding_rule: p.forwarding_rule.clone(),
            ip: p.ip_address.clone().unwrap_or_else(|| "-".into()),
            scheme: p
                .load_balancing_scheme
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string),
            public: if p.is_public() { "yes" } else { "no" }.into(),
            path: p.rule_path(),
        }
    }
}

/// Interpret a `--resource` argument: resource links contain a
/// `projects/` segment, anything else is taken as a trigger URL.
pub fn parse_target(resource: &str) -> Result<TargetResource, CliError> {
    let resource = resource.trim();
    if resource.is_empty() {
        return Err(CliError::Validation {
            field: "resource".into(),
            reason: "must not be empty".into(),
        });
    }
    if resource.starts_with("projects/") || resource.contains("/projects/") {
        Ok(TargetResource::SelfLink(resource.to_owned()))
    } else {
        Ok(TargetResource::HttpsTrigger(resource.to_owned()))
    }
}

pub fn handle(ctx: &Context, args: &PathsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let target = parse_target(&args.resource)?;
    let inventory = LoadBalancerInventory::from_snapshot(&ctx.snapshot);
    let paths = DeliveryChainResolver::new(&inventory).resolve(&target);
    tracing::debug!(paths = paths.len(), "delivery paths resolved");

    let out = output::render_list(
        &global.output,
        &paths,
        |p| PathRow::from(p),
        DeliveryPath::describe,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
