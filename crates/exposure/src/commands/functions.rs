//! HTTPS-triggered function exposure handler.

use exposure_core::{
    CacheKey, CloudFunction, ExposureResolver, Finding, LoadBalancerInventory, ResourceName,
    Scope, TargetResource,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::Context;
use super::util;

/// The `<location>` of `projects/<p>/locations/<location>/functions/<f>`.
fn location_of(name: &str) -> Option<&str> {
    let mut segments = name.split('/');
    segments.find(|s| *s == "locations")?;
    segments.next().filter(|s| !s.is_empty())
}

/// One finding per function. Functions are matched to load balancers by
/// trigger URL; firewall rules do not apply to them.
pub fn function_findings(ctx: &Context) -> Vec<Finding> {
    let mut findings = util::query_findings(&ctx.snapshot, CacheKey::FUNCTIONS, "functions");

    let functions: Vec<CloudFunction> = ctx.snapshot.collect(CacheKey::FUNCTIONS);
    let inventory = LoadBalancerInventory::from_snapshot(&ctx.snapshot);
    let resolver = ExposureResolver::new(&inventory, &[]);

    for function in &functions {
        let location = location_of(&function.name);
        let resource = ResourceName::new("functions", function.short_name())
            .project(&ctx.project)
            .scope(location.map_or(Scope::Global, |l| Scope::Location(l.to_owned())));

        let exposure = function
            .trigger_url()
            .map(|url| resolver.for_target(&TargetResource::HttpsTrigger(url.to_owned()), None))
            .unwrap_or_default();

        let finding = if exposure.is_exposed() {
            Finding::fail(format!(
                "Function is exposed to the internet through {}",
                exposure.description
            ))
        } else {
            Finding::ok("Function is not exposed to the internet")
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
    util::print_findings(&function_findings(ctx), global)
}
