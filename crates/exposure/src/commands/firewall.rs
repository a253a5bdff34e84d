//! Firewall command handlers (verdicts + port scans).

use indexmap::IndexMap;
use serde::Serialize;
use tabled::Tabled;

use exposure_core::model::{last_segment, links_match, project_scoped};
use exposure_core::{
    CacheKey, Direction, ExposureVerdict, FirewallRule, ServicePorts, evaluate, scan_all_ports,
    scan_open_ports,
};

use crate::cli::{FirewallArgs, FirewallCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util;

// ── Verdict row ─────────────────────────────────────────────────────

/// One network's evaluated rule set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NetworkVerdict {
    network: String,
    rules: usize,
    #[serde(flatten)]
    verdict: ExposureVerdict,
}

impl NetworkVerdict {
    fn decided_by(&self) -> &'static str {
        match (self.verdict.exposed, &self.verdict.network_name) {
            (true, Some(_)) => "allow from anywhere",
            (true, None) => "no decisive rule",
            (false, _) => "deny all from anywhere",
        }
    }
}

#[derive(Tabled)]
struct VerdictRow {
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Rules")]
    rules: usize,
    #[tabled(rename = "Exposed")]
    exposed: String,
    #[tabled(rename = "Decided By")]
    decided_by: String,
}

impl From<&NetworkVerdict> for VerdictRow {
    fn from(v: &NetworkVerdict) -> Self {
        Self {
            network: last_segment(&v.network).to_owned(),
            rules: v.rules,
            exposed: if v.verdict.exposed { "yes" } else { "no" }.into(),
            decided_by: v.decided_by().into(),
        }
    }
}

/// Group rules by network, in first-seen order. Rules without a network
/// cannot be scoped and are left out.
fn group_by_network(rules: &[FirewallRule]) -> IndexMap<String, Vec<&FirewallRule>> {
    let mut groups: IndexMap<String, Vec<&FirewallRule>> = IndexMap::new();
    for rule in rules {
        if let Some(network) = rule.network.as_deref() {
            groups
                .entry(project_scoped(network).to_owned())
                .or_default()
                .push(rule);
        }
    }
    groups
}

fn network_verdicts(rules: &[FirewallRule], filter: Option<&str>) -> Vec<NetworkVerdict> {
    group_by_network(rules)
        .into_iter()
        .filter(|(network, _)| {
            filter.is_none_or(|wanted| {
                last_segment(network) == wanted || links_match(network, wanted)
            })
        })
        .map(|(network, group)| NetworkVerdict {
            rules: group.len(),
            verdict: evaluate(group),
            network,
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(ctx: &Context, args: FirewallArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let rules: Vec<FirewallRule> = ctx.snapshot.collect(CacheKey::FIREWALLS);
    tracing::debug!(rules = rules.len(), "firewall rules loaded");

    match args.command {
        FirewallCommand::Verdict { network } => {
            let verdicts = network_verdicts(&rules, network.as_deref());
            if let Some(network) = network.filter(|_| verdicts.is_empty()) {
                return Err(CliError::NotFound {
                    resource_type: "network".into(),
                    identifier: network,
                    list_command: "firewall verdict".into(),
                });
            }
            let out = output::render_list(
                &global.output,
                &verdicts,
                |v| VerdictRow::from(v),
                |v| {
                    format!(
                        "{}\t{}",
                        last_segment(&v.network),
                        if v.verdict.exposed { "exposed" } else { "blocked" }
                    )
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FirewallCommand::OpenPorts { service, port } => {
            let services = select_services(ctx, &service, &port)?;
            let mut findings =
                util::query_findings(&ctx.snapshot, CacheKey::FIREWALLS, "firewall rules");
            for service in &services {
                findings.extend(scan_open_ports(&rules, service, &ctx.project, "global"));
            }
            util::print_findings(&findings, global)
        }

        FirewallCommand::AllPorts { egress } => {
            let direction = if egress {
                Direction::Egress
            } else {
                Direction::Ingress
            };
            let mut findings =
                util::query_findings(&ctx.snapshot, CacheKey::FIREWALLS, "firewall rules");
            findings.extend(scan_all_ports(&rules, direction, &ctx.project, "global"));
            util::print_findings(&findings, global)
        }
    }
}

/// Named services plus ad-hoc port specs; every known service when
/// neither is given.
fn select_services(
    ctx: &Context,
    names: &[String],
    specs: &[String],
) -> Result<Vec<ServicePorts>, CliError> {
    let mut services = Vec::with_capacity(names.len() + specs.len());
    for name in names {
        let service = ctx
            .config
            .find_service(name)?
            .ok_or_else(|| CliError::NotFound {
                resource_type: "service".into(),
                identifier: name.clone(),
                list_command: "config show".into(),
            })?;
        services.push(service);
    }
    for spec in specs {
        services.push(ServicePorts::parse_spec(spec.as_str(), spec)?);
    }
    if services.is_empty() {
        services = ctx.config.service_checks()?;
    }
    Ok(services)
}
