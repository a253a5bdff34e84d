// ── Exposure resolution ──
//
// Combines the firewall verdict with load-balancer delivery paths into a
// single answer: an empty description means no public exposure was found,
// anything else describes how the resource is reached.

use serde::Serialize;

use super::delivery::{DeliveryChainResolver, DeliveryPath};
use super::firewall::{ExposureVerdict, evaluate, rules_for_network};
use crate::model::{FirewallRule, TargetResource};
use crate::snapshot::LoadBalancerInventory;

/// Address prefixes treated as private.
const PRIVATE_PREFIXES: [&str; 3] = ["10.", "192.168.", "172."];

pub fn is_private_address(ip: &str) -> bool {
    PRIVATE_PREFIXES.iter().any(|prefix| ip.starts_with(prefix))
}

/// Resolve exposure from one network's firewall rules and the forwarding
/// rules (with their traced paths) that front the resource.
///
/// - A firewall allow rule from anywhere returns `"vpc <network>"`.
/// - A firewall deny-all from anywhere returns `""`, whatever the load
///   balancers say.
/// - Otherwise the first internet-facing path on a public address wins.
pub fn resolve_exposure<'a>(
    firewall_rules: impl IntoIterator<Item = &'a FirewallRule>,
    paths: &[DeliveryPath],
) -> String {
    let rules: Vec<&FirewallRule> = firewall_rules.into_iter().collect();
    if !rules.is_empty() {
        match evaluate(rules) {
            ExposureVerdict {
                exposed: true,
                network_name: Some(network),
            } => return network,
            ExposureVerdict { exposed: false, .. } => return String::new(),
            ExposureVerdict { .. } => {}
        }
    }

    paths
        .iter()
        .find(|path| path.is_public())
        .map(DeliveryPath::describe)
        .unwrap_or_default()
}

/// Result of resolving one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Exposure {
    /// Empty when the resource is not exposed.
    pub description: String,
    /// Every delivery path traced to the resource, public or not.
    pub paths: Vec<DeliveryPath>,
}

impl Exposure {
    pub fn is_exposed(&self) -> bool {
        !self.description.is_empty()
    }
}

/// Resolves exposure for resources against one project's data.
pub struct ExposureResolver<'a> {
    inventory: &'a LoadBalancerInventory,
    firewall_rules: &'a [FirewallRule],
}

impl<'a> ExposureResolver<'a> {
    pub fn new(inventory: &'a LoadBalancerInventory, firewall_rules: &'a [FirewallRule]) -> Self {
        Self {
            inventory,
            firewall_rules,
        }
    }

    /// Resolve `target`, scoping firewall rules to `network` when given.
    ///
    /// Without a network no firewall signal is used, only load-balancer
    /// paths.
    pub fn for_target(&self, target: &TargetResource, network: Option<&str>) -> Exposure {
        let paths = DeliveryChainResolver::new(self.inventory).resolve(target);
        let rules = network
            .map(|network| rules_for_network(self.firewall_rules, network))
            .unwrap_or_default();
        let description = resolve_exposure(rules, &paths);
        tracing::debug!(?target, network, %description, "exposure resolved");
        Exposure { description, paths }
    }

    /// Resolve `target` across several networks; the first network that
    /// yields an exposure wins.
    pub fn for_networks(&self, target: &TargetResource, networks: &[&str]) -> Exposure {
        if networks.is_empty() {
            return self.for_target(target, None);
        }
        let mut last = Exposure::default();
        for network in networks {
            last = self.for_target(target, Some(network));
            if last.is_exposed() {
                break;
            }
        }
        last
    }
}
