// ── Managed Kubernetes control-plane configuration ──

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateClusterConfig {
    #[serde(default)]
    pub enable_private_endpoint: bool,
    #[serde(default)]
    pub private_endpoint: Option<String>,
    #[serde(default)]
    pub public_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CidrBlock {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub cidr_block: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterAuthorizedNetworksConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub gcp_public_cidrs_access_enabled: Option<bool>,
    #[serde(default)]
    pub cidr_blocks: Vec<CidrBlock>,
}

/// Cluster from `clusters.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub private_cluster_config: Option<PrivateClusterConfig>,
    #[serde(default)]
    pub master_authorized_networks_config: Option<MasterAuthorizedNetworksConfig>,
}

impl Cluster {
    /// The control plane's public address, if it has one.
    pub fn public_endpoint(&self) -> Option<&str> {
        self.private_cluster_config
            .as_ref()
            .and_then(|p| p.public_endpoint.as_deref())
            .or(self.endpoint.as_deref())
            .filter(|e| !e.is_empty())
    }

    /// True when the control plane only listens on its private endpoint.
    ///
    /// A private endpoint address alone does not close the public one.
    pub fn private_endpoint_only(&self) -> bool {
        self.private_cluster_config
            .as_ref()
            .is_some_and(|p| p.enable_private_endpoint)
    }
}
