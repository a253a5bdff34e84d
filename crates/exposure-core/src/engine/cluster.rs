// ── Cluster control-plane exposure ──
//
// Managed clusters are judged from their own configuration flags; no
// firewall rules or load balancers are involved. Each condition is
// independent and any one of them makes the control plane exposed.

use std::fmt;

use serde::Serialize;

use crate::model::Cluster;

/// Authorized-network CIDRs that admit every address.
const OPEN_CIDRS: [&str; 4] = ["0.0.0.0/0", "::/0", "*", "::0"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ClusterExposureReason {
    /// A public endpoint that is not switched off in favour of the private one.
    PublicEndpoint(String),
    /// Authorized networks admit the cloud provider's public ranges.
    GooglePublicCidrs,
    /// An authorized CIDR block open to everyone.
    OpenCidrBlock(String),
}

impl fmt::Display for ClusterExposureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicEndpoint(endpoint) => write!(f, "public endpoint {endpoint}"),
            Self::GooglePublicCidrs => f.write_str("Google Cloud public IP access"),
            Self::OpenCidrBlock(cidr) => write!(f, "authorized network {cidr}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterExposure {
    pub cluster: String,
    pub reasons: Vec<ClusterExposureReason>,
}

impl ClusterExposure {
    pub fn is_exposed(&self) -> bool {
        !self.reasons.is_empty()
    }

    /// Reasons joined with `" and "`; empty when not exposed.
    pub fn describe(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

pub fn check_cluster(cluster: &Cluster) -> ClusterExposure {
    let mut reasons = Vec::new();

    if let Some(endpoint) = cluster
        .public_endpoint()
        .filter(|_| !cluster.private_endpoint_only())
    {
        reasons.push(ClusterExposureReason::PublicEndpoint(endpoint.to_owned()));
    }

    if let Some(authorized) = &cluster.master_authorized_networks_config {
        if authorized.gcp_public_cidrs_access_enabled == Some(true) {
            reasons.push(ClusterExposureReason::GooglePublicCidrs);
        }
        for cidr in authorized
            .cidr_blocks
            .iter()
            .filter_map(|block| block.cidr_block.as_deref())
            .filter(|cidr| OPEN_CIDRS.contains(cidr))
        {
            reasons.push(ClusterExposureReason::OpenCidrBlock(cidr.to_owned()));
        }
    }

    tracing::debug!(cluster = %cluster.name, reasons = reasons.len(), "cluster checked");
    ClusterExposure {
        cluster: cluster.name.clone(),
        reasons,
    }
}
