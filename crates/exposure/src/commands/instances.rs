//! Compute instance exposure handler.

use exposure_core::{
    CacheKey, ComputeInstance, ExposureResolver, Finding, FirewallRule, LoadBalancerInventory,
    ResourceName, Scope, TargetResource,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::Context;
use super::util;

/// One finding per instance: firewall rules of each attached network,
/// then load-balancer paths ending at the instance.
pub fn instance_findings(ctx: &Context) -> Vec<Finding> {
    let mut findings = util::query_findings(&ctx.snapshot, CacheKey::INSTANCES, "instances");

    let instances: Vec<ComputeInstance> = ctx.snapshot.collect(CacheKey::INSTANCES);
    let rules: Vec<FirewallRule> = ctx.snapshot.collect(CacheKey::FIREWALLS);
    let inventory = LoadBalancerInventory::from_snapshot(&ctx.snapshot);
    let resolver = ExposureResolver::new(&inventory, &rules);

    for instance in &instances {
        let exposure =
            resolver.for_networks(&TargetResource::from(instance), &instance.networks());
        let (region, scope) = match instance.zone_name() {
            Some(zone) => (zone, Scope::Zone(zone.to_owned())),
            None => ("global", Scope::Global),
        };
        let resource = ResourceName::new("instances", &instance.name)
            .project(&ctx.project)
            .scope(scope);

        let finding = if exposure.is_exposed() {
            Finding::fail(format!(
                "Instance is exposed to the internet through {}",
                exposure.description
            ))
        } else {
            Finding::ok("Instance is not exposed to the internet")
        };
        findings.push(finding.region(region).resource(resource.to_string()));
    }
    findings
}

pub fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    util::print_findings(&instance_findings(ctx), global)
}
