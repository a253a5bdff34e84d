// ── Load-balancer domain types ──
//
// Forwarding rule → target proxy → URL map → backend service. Each entity
// references the next by full resource link; see `self_link` for how those
// links are joined.

use serde::{Deserialize, Serialize};

use super::self_link::last_segment;

/// Load-balancing scheme of a forwarding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadBalancingScheme {
    External,
    ExternalManaged,
    Internal,
    InternalManaged,
    InternalSelfManaged,
    #[serde(other)]
    Other,
}

impl LoadBalancingScheme {
    /// Internet-facing schemes.
    pub fn is_external(self) -> bool {
        matches!(self, Self::External | Self::ExternalManaged)
    }
}

/// Forwarding rule: a frontend IP bound to a proxy or a backend service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardingRule {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(rename = "IPAddress", default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub load_balancing_scheme: Option<LoadBalancingScheme>,
    /// Link to a target proxy (or other target type).
    #[serde(default)]
    pub target: Option<String>,
    /// Direct backend link, used by proxy-less load balancers.
    #[serde(default)]
    pub backend_service: Option<String>,
}

/// Which proxy collection a forwarding-rule target points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum ProxyKind {
    #[strum(serialize = "HTTP")]
    Http,
    #[strum(serialize = "HTTPS")]
    Https,
}

impl ProxyKind {
    /// Classify a forwarding-rule `target` link. Only HTTP(S) target
    /// proxies are recognized; anything else yields `None`.
    pub fn of_target(target: &str) -> Option<Self> {
        if target.contains("/targetHttpsProxies/") {
            Some(Self::Https)
        } else if target.contains("/targetHttpProxies/") {
            Some(Self::Http)
        } else {
            None
        }
    }
}

/// HTTP or HTTPS target proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetProxy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub self_link: String,
    #[serde(default)]
    pub url_map: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMap {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub self_link: String,
    #[serde(default)]
    pub default_service: Option<String>,
}

/// A single backend of a backend service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

impl Backend {
    /// All resource links this backend points at.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.group.as_deref().into_iter().chain(self.target.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendService {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub self_link: String,
    #[serde(default)]
    pub backends: Vec<Backend>,
}

/// Short display name: the `name` field, else the last link segment.
pub(crate) fn display_name<'a>(name: &'a str, self_link: &'a str) -> &'a str {
    if name.is_empty() {
        last_segment(self_link)
    } else {
        name
    }
}

impl TargetProxy {
    pub fn display_name(&self) -> &str {
        display_name(&self.name, &self.self_link)
    }
}

impl UrlMap {
    pub fn display_name(&self) -> &str {
        display_name(&self.name, &self.self_link)
    }
}

impl BackendService {
    pub fn display_name(&self) -> &str {
        display_name(&self.name, &self.self_link)
    }
}
