//! Managed cluster control-plane handler.

use exposure_core::{CacheKey, Cluster, Finding, ResourceName, Scope, check_cluster};

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::Context;
use super::util;

pub fn cluster_findings(ctx: &Context) -> Vec<Finding> {
    let mut findings = util::query_findings(&ctx.snapshot, CacheKey::CLUSTERS, "clusters");

    let clusters: Vec<Cluster> = ctx.snapshot.collect(CacheKey::CLUSTERS);
    for cluster in &clusters {
        let location = cluster.location.as_deref().filter(|l| !l.is_empty());
        let resource = ResourceName::new("clusters", &cluster.name)
            .project(&ctx.project)
            .scope(location.map_or(Scope::Global, |l| Scope::Location(l.to_owned())));

        let check = check_cluster(cluster);
        let finding = if check.is_exposed() {
            Finding::fail(format!(
                "Cluster is exposed to the internet through {}",
                check.describe()
            ))
        } else {
            Finding::ok("Cluster is not exposed to the internet")
        };
        findings.push(
            finding
                .region(location.unwrap_or("global"))
                .resource(resource.to_string()),
        );
    }
    findings
}

pub fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    util::print_findings(&cluster_findings(ctx), global)
}
