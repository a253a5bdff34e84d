//! Shared helpers for command handlers.

use tabled::Tabled;

use exposure_core::{CacheKey, Finding, Snapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Finding table row ───────────────────────────────────────────────

#[derive(Tabled)]
pub struct FindingRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl FindingRow {
    fn new(finding: &Finding, color: bool) -> Self {
        Self {
            status: output::status_label(finding.status, color),
            region: finding.region.clone(),
            resource: finding.resource.clone().unwrap_or_else(|| "-".into()),
            message: finding.message.clone(),
        }
    }
}

/// Render findings in the selected format and print them.
pub fn print_findings(findings: &[Finding], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        findings,
        |f| FindingRow::new(f, color),
        |f| format!("{}\t{}\t{}", f.status, f.region, f.message),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Findings for a cached call that is missing or errored.
///
/// A call absent from the snapshot yields a single global UNKNOWN finding;
/// each errored region is classified by [`Finding::from_query_error`].
pub fn query_findings(snapshot: &Snapshot, key: CacheKey, what: &str) -> Vec<Finding> {
    if !snapshot.contains(key) {
        return vec![Finding::unknown_query(what, "no cached data")];
    }
    snapshot
        .error_values(key)
        .into_iter()
        .flat_map(|(region, err)| {
            Finding::from_query_error(what, err)
                .into_iter()
                .map(move |finding| finding.region(region))
        })
        .collect()
}
