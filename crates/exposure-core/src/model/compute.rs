// ── Compute-side resources that can sit behind a load balancer ──

use serde::{Deserialize, Serialize};

use super::load_balancing::Backend;
use super::self_link::{last_segment, links_match};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(rename = "natIP", default)]
    pub nat_ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,
}

/// VM instance from `instances.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeInstance {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub self_link: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

impl ComputeInstance {
    /// Distinct network links across all interfaces, in interface order.
    pub fn networks(&self) -> Vec<&str> {
        let mut networks: Vec<&str> = Vec::new();
        for network in self
            .network_interfaces
            .iter()
            .filter_map(|nic| nic.network.as_deref())
        {
            if !networks.contains(&network) {
                networks.push(network);
            }
        }
        networks
    }

    /// Short zone name (`us-central1-a`), when known.
    pub fn zone_name(&self) -> Option<&str> {
        self.zone.as_deref().map(last_segment)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpsTrigger {
    #[serde(default)]
    pub url: Option<String>,
}

/// HTTP-triggered function from `functions.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFunction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub https_trigger: Option<HttpsTrigger>,
}

impl CloudFunction {
    pub fn trigger_url(&self) -> Option<&str> {
        self.https_trigger
            .as_ref()
            .and_then(|t| t.url.as_deref())
            .filter(|url| !url.is_empty())
    }

    pub fn short_name(&self) -> &str {
        last_segment(&self.name)
    }
}

/// The resource a delivery chain must end at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TargetResource {
    /// Compute-backed resource, matched against backend group links.
    SelfLink(String),
    /// Trigger-based resource, matched by URL substring.
    HttpsTrigger(String),
}

impl TargetResource {
    /// Whether `backend` delivers traffic to this resource.
    pub fn is_backed_by(&self, backend: &Backend) -> bool {
        match self {
            Self::SelfLink(link) => backend.references().any(|r| links_match(r, link)),
            Self::HttpsTrigger(url) => {
                !url.is_empty() && backend.references().any(|r| r.contains(url.as_str()))
            }
        }
    }
}

impl From<&ComputeInstance> for TargetResource {
    fn from(instance: &ComputeInstance) -> Self {
        Self::SelfLink(instance.self_link.clone())
    }
}
