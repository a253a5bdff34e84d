// ── Hierarchical resource identifiers ──
//
// Provider collections reference each other through full resource URLs
// (`https://www.googleapis.com/compute/v1/projects/p/global/urlMaps/m`)
// whose prefixes vary between APIs and scopes. Joins compare the
// project-scoped tail of these links, never the raw strings.

use std::fmt;

const PROJECT_SEGMENT: &str = "projects/";

/// Return the part of `link` starting at its `projects/` segment.
///
/// Links without a project segment are returned unchanged.
pub fn project_scoped(link: &str) -> &str {
    if link.starts_with(PROJECT_SEGMENT) {
        return link;
    }
    link.find("/projects/").map_or(link, |idx| &link[idx + 1..])
}

/// True when either link ends with the other's project-scoped form.
///
/// Empty links never match anything.
pub fn links_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.ends_with(project_scoped(b)) || b.ends_with(project_scoped(a))
}

/// Text after the final `/` of a link (the short resource name).
pub fn last_segment(link: &str) -> &str {
    link.rsplit_once('/').map_or(link, |(_, tail)| tail)
}

// ── ResourceName ────────────────────────────────────────────────────

/// Where a resource lives in the provider hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Global,
    Region(String),
    Zone(String),
    Location(String),
    Unscoped,
}

/// Canonical resource path used to label findings, e.g.
/// `projects/acme/global/firewalls/allow-ssh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceName {
    project: Option<String>,
    scope: Scope,
    resource_type: String,
    id: String,
}

impl ResourceName {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            project: None,
            scope: Scope::Global,
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        let project = project.into();
        self.project = (!project.is_empty()).then_some(project);
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref project) = self.project {
            write!(f, "projects/{project}/")?;
        }
        let (kind, id) = (&self.resource_type, &self.id);
        match self.scope {
            Scope::Global => write!(f, "global/{kind}/{id}"),
            Scope::Region(ref r) => write!(f, "regions/{r}/{kind}/{id}"),
            Scope::Zone(ref z) => write!(f, "zones/{z}/{kind}/{id}"),
            Scope::Location(ref l) => write!(f, "locations/{l}/{kind}/{id}"),
            Scope::Unscoped => write!(f, "{kind}/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BS: &str =
        "https://www.googleapis.com/compute/v1/projects/acme/global/backendServices/web";

    #[test]
    fn project_scoped_strips_api_prefix() {
        assert_eq!(project_scoped(BS), "projects/acme/global/backendServices/web");
    }

    #[test]
    fn project_scoped_keeps_links_without_project() {
        assert_eq!(project_scoped("global/urlMaps/m"), "global/urlMaps/m");
        assert_eq!(project_scoped("projects/p/x"), "projects/p/x");
    }

    #[test]
    fn project_scoped_ignores_partial_segment_names() {
        assert_eq!(project_scoped("myprojects/x"), "myprojects/x");
    }

    #[test]
    fn links_match_across_api_prefixes() {
        assert!(links_match(BS, "projects/acme/global/backendServices/web"));
        assert!(links_match(
            "projects/acme/global/backendServices/web",
            "https://compute.googleapis.com/compute/beta/projects/acme/global/backendServices/web"
        ));
    }

    #[test]
    fn links_match_rejects_different_scope_or_name() {
        assert!(!links_match(
            BS,
            "projects/acme/regions/us-east1/backendServices/web"
        ));
        assert!(!links_match(BS, "projects/acme/global/backendServices/web-2"));
        assert!(!links_match(BS, ""));
    }

    #[test]
    fn last_segment_returns_short_name() {
        assert_eq!(last_segment(BS), "web");
        assert_eq!(last_segment("plain"), "plain");
    }

    #[test]
    fn resource_name_formats_each_scope() {
        let global = ResourceName::new("firewalls", "allow-ssh").project("acme");
        assert_eq!(global.to_string(), "projects/acme/global/firewalls/allow-ssh");

        let zonal = ResourceName::new("instances", "vm-1")
            .project("acme")
            .scope(Scope::Zone("us-central1-a".into()));
        assert_eq!(zonal.to_string(), "projects/acme/zones/us-central1-a/instances/vm-1");

        let regional = ResourceName::new("forwardingRules", "fr")
            .scope(Scope::Region("europe-west1".into()));
        assert_eq!(regional.to_string(), "regions/europe-west1/forwardingRules/fr");

        let located = ResourceName::new("clusters", "gke")
            .project("acme")
            .scope(Scope::Location("us-central1".into()));
        assert_eq!(located.to_string(), "projects/acme/locations/us-central1/clusters/gke");

        let bare = ResourceName::new("serviceAccounts", "svc").scope(Scope::Unscoped);
        assert_eq!(bare.to_string(), "serviceAccounts/svc");
    }

    #[test]
    fn empty_project_is_omitted() {
        let name = ResourceName::new("firewalls", "fw").project("");
        assert_eq!(name.to_string(), "global/firewalls/fw");
    }
}
