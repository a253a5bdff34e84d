// ── Delivery chain resolution ──
//
// Reconstructs forwarding rule → target proxy → URL map → backend service
// chains that end at a given resource. The four collections are fetched
// independently and cross-reference each other only through resource
// links, so every hop is a link-suffix lookup.

use serde::Serialize;

use super::exposure::is_private_address;
use crate::model::{
    BackendService, ForwardingRule, LoadBalancingScheme, ProxyKind, TargetProxy, TargetResource,
    links_match,
};
use crate::snapshot::LoadBalancerInventory;

/// A forwarding rule annotated with the chain it delivers through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPath {
    pub forwarding_rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancing_scheme: Option<LoadBalancingScheme>,
    /// `["FR web", "TP web-proxy", "UM web-map", "BS web-backend"]`.
    pub hops: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_service_link: Option<String>,
}

impl DeliveryPath {
    /// `"FR a > TP b > UM c > BS d"`.
    pub fn rule_path(&self) -> String {
        self.hops.join(" > ")
    }

    /// The path string, or the forwarding rule's name when no path was
    /// traced.
    pub fn describe(&self) -> String {
        if self.hops.is_empty() {
            self.forwarding_rule.clone()
        } else {
            self.rule_path()
        }
    }

    /// Internet-facing scheme on a non-private address.
    ///
    /// A missing address is not considered private.
    pub fn is_public(&self) -> bool {
        self.load_balancing_scheme
            .is_some_and(LoadBalancingScheme::is_external)
            && !self.ip_address.as_deref().is_some_and(is_private_address)
    }
}

/// A forwarding rule with no traced chain.
impl From<&ForwardingRule> for DeliveryPath {
    fn from(rule: &ForwardingRule) -> Self {
        Self {
            forwarding_rule: rule.name.clone(),
            ip_address: rule.ip_address.clone(),
            load_balancing_scheme: rule.load_balancing_scheme,
            hops: Vec::new(),
            backend_service_link: None,
        }
    }
}

/// Traces delivery chains through one inventory.
pub struct DeliveryChainResolver<'a> {
    inventory: &'a LoadBalancerInventory,
}

impl<'a> DeliveryChainResolver<'a> {
    pub fn new(inventory: &'a LoadBalancerInventory) -> Self {
        Self { inventory }
    }

    /// Every forwarding rule whose chain ends at a backend service that
    /// serves `target`, in forwarding-rule order.
    ///
    /// An empty result only means no load-balancer path was found; it says
    /// nothing about exposure through other routes.
    pub fn resolve(&self, target: &TargetResource) -> Vec<DeliveryPath> {
        let backends: Vec<&BackendService> = self
            .inventory
            .backend_services
            .iter()
            .filter(|service| service.backends.iter().any(|b| target.is_backed_by(b)))
            .collect();

        if backends.is_empty() || self.inventory.forwarding_rules.is_empty() {
            tracing::debug!(?target, "no backend service or forwarding rule to trace");
            return Vec::new();
        }

        self.inventory
            .forwarding_rules
            .iter()
            .filter_map(|rule| self.trace(rule, &backends))
            .collect()
    }

    fn trace(&self, rule: &ForwardingRule, backends: &[&BackendService]) -> Option<DeliveryPath> {
        let mut path = DeliveryPath::from(rule);
        path.hops.push(format!("FR {}", rule.name));

        let proxy_target = rule
            .target
            .as_deref()
            .and_then(|target| ProxyKind::of_target(target).map(|kind| (kind, target)));

        let service = if let Some((kind, target)) = proxy_target {
            self.trace_proxy(kind, target, backends, &mut path.hops)
        } else if let Some(link) = rule.backend_service.as_deref() {
            find_backend(backends, link)
        } else {
            None
        };

        let Some(service) = service else {
            tracing::trace!(rule = %rule.name, "forwarding rule reaches no matching backend");
            return None;
        };
        path.hops.push(format!("BS {}", service.display_name()));
        path.backend_service_link = Some(service.self_link.clone());
        tracing::debug!(path = %path.rule_path(), "delivery path traced");
        Some(path)
    }

    fn trace_proxy<'b>(
        &self,
        kind: ProxyKind,
        target: &str,
        backends: &[&'b BackendService],
        hops: &mut Vec<String>,
    ) -> Option<&'b BackendService> {
        let proxies: &[TargetProxy] = match kind {
            ProxyKind::Http => &self.inventory.http_proxies,
            ProxyKind::Https => &self.inventory.https_proxies,
        };
        let proxy = proxies.iter().find(|p| links_match(&p.self_link, target))?;
        hops.push(format!("TP {}", proxy.display_name()));

        let Some(map_link) = proxy.url_map.as_deref() else {
            return find_backend(backends, &proxy.self_link);
        };
        let map = self
            .inventory
            .url_maps
            .iter()
            .find(|m| links_match(&m.self_link, map_link))?;
        hops.push(format!("UM {}", map.display_name()));

        map.default_service
            .as_deref()
            .and_then(|link| find_backend(backends, link))
    }
}

fn find_backend<'b>(backends: &[&'b BackendService], link: &str) -> Option<&'b BackendService> {
    backends
        .iter()
        .copied()
        .find(|service| links_match(&service.self_link, link))
}
