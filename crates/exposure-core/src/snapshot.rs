// ── Cached API snapshot ──
//
// The caching collaborator stores every API call as
// `{ service: { call: { region: { "data": [...], "err": ... } } } }`.
// This module reads that shape and merges regions into flat collections.
// Nothing here performs I/O; callers hand in already-read JSON.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::model::{BackendService, ForwardingRule, TargetProxy, UrlMap};

const GLOBAL_REGION: &str = "global";

/// Address of one cached API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey {
    pub service: &'static str,
    pub call: &'static str,
}

impl CacheKey {
    pub const PROJECTS: Self = Self::new("projects", "get");
    pub const FIREWALLS: Self = Self::new("firewalls", "list");
    pub const FORWARDING_RULES: Self = Self::new("forwardingRules", "list");
    pub const BACKEND_SERVICES: Self = Self::new("backendServices", "list");
    pub const TARGET_HTTP_PROXIES: Self = Self::new("targetHttpProxies", "list");
    pub const TARGET_HTTPS_PROXIES: Self = Self::new("targetHttpsProxies", "list");
    pub const URL_MAPS: Self = Self::new("urlMaps", "list");
    pub const INSTANCES: Self = Self::new("instances", "list");
    pub const FUNCTIONS: Self = Self::new("functions", "list");
    pub const CLUSTERS: Self = Self::new("kubernetes", "list");

    pub const fn new(service: &'static str, call: &'static str) -> Self {
        Self { service, call }
    }
}

/// One region's cached response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub err: Option<Value>,
}

impl CacheEntry {
    fn error_message(&self) -> Option<String> {
        match self.err.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => Some(
                map.get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| Value::Object(map.clone()).to_string(), str::to_owned),
            ),
            other => Some(other.to_string()),
        }
    }
}

type RegionMap = BTreeMap<String, CacheEntry>;

/// A full cache document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    services: BTreeMap<String, BTreeMap<String, RegionMap>>,
}

impl Snapshot {
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Store a region's response. Mainly useful for building fixtures.
    pub fn insert(&mut self, key: CacheKey, region: impl Into<String>, entry: CacheEntry) {
        self.services
            .entry(key.service.to_owned())
            .or_default()
            .entry(key.call.to_owned())
            .or_default()
            .insert(region.into(), entry);
    }

    /// Whether the cache holds the call at all (in any region).
    pub fn contains(&self, key: CacheKey) -> bool {
        self.regions(key).is_some()
    }

    fn regions(&self, key: CacheKey) -> Option<&RegionMap> {
        self.services.get(key.service)?.get(key.call)
    }

    /// Region entries in merge order: `global` first, then the rest
    /// lexically.
    fn ordered_entries(&self, key: CacheKey) -> Vec<(&str, &CacheEntry)> {
        let Some(regions) = self.regions(key) else {
            return Vec::new();
        };
        let global = regions
            .get_key_value(GLOBAL_REGION)
            .map(|(r, e)| (r.as_str(), e));
        global
            .into_iter()
            .chain(
                regions
                    .iter()
                    .filter(|(r, _)| r.as_str() != GLOBAL_REGION)
                    .map(|(r, e)| (r.as_str(), e)),
            )
            .collect()
    }

    /// Merge every region's `data` into one list of `T`.
    ///
    /// Regions that errored or carry no data contribute nothing, and items
    /// that do not deserialize as `T` are skipped with a warning.
    pub fn collect<T: DeserializeOwned>(&self, key: CacheKey) -> Vec<T> {
        let mut items = Vec::new();
        for (region, entry) in self.ordered_entries(key) {
            if entry.error_message().is_some() {
                tracing::debug!(service = key.service, region, "skipping errored region");
                continue;
            }
            let values: Vec<&Value> = match entry.data.as_ref() {
                Some(Value::Array(values)) => values.iter().collect(),
                Some(value @ Value::Object(_)) => vec![value],
                _ => continue,
            };
            for value in values {
                match T::deserialize(value) {
                    Ok(item) => items.push(item),
                    Err(err) => {
                        tracing::warn!(
                            service = key.service,
                            region,
                            error = %err,
                            "skipping malformed cache item"
                        );
                    }
                }
            }
        }
        items
    }

    /// Per-region error messages for a call.
    pub fn errors(&self, key: CacheKey) -> Vec<(String, String)> {
        self.ordered_entries(key)
            .into_iter()
            .filter_map(|(region, entry)| entry.error_message().map(|m| (region.to_owned(), m)))
            .collect()
    }

    /// Per-region raw error objects, for callers that classify them.
    pub fn error_values(&self, key: CacheKey) -> Vec<(&str, &Value)> {
        self.ordered_entries(key)
            .into_iter()
            .filter_map(|(region, entry)| {
                entry
                    .err
                    .as_ref()
                    .filter(|err| !err.is_null())
                    .map(|err| (region, err))
            })
            .collect()
    }

    /// Project name from the cached `projects.get` call.
    pub fn project(&self) -> Option<String> {
        self.collect::<Value>(CacheKey::PROJECTS)
            .into_iter()
            .find_map(|p| {
                p.get("name")
                    .or_else(|| p.get("projectId"))
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
    }
}

// ── LoadBalancerInventory ───────────────────────────────────────────

/// The four delivery-chain collections, each merged across scopes.
#[derive(Debug, Clone, Default)]
pub struct LoadBalancerInventory {
    pub forwarding_rules: Vec<ForwardingRule>,
    pub backend_services: Vec<BackendService>,
    pub http_proxies: Vec<TargetProxy>,
    pub https_proxies: Vec<TargetProxy>,
    pub url_maps: Vec<UrlMap>,
}

impl LoadBalancerInventory {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let inventory = Self {
            forwarding_rules: snapshot.collect(CacheKey::FORWARDING_RULES),
            backend_services: snapshot.collect(CacheKey::BACKEND_SERVICES),
            http_proxies: snapshot.collect(CacheKey::TARGET_HTTP_PROXIES),
            https_proxies: snapshot.collect(CacheKey::TARGET_HTTPS_PROXIES),
            url_maps: snapshot.collect(CacheKey::URL_MAPS),
        };
        tracing::debug!(
            forwarding_rules = inventory.forwarding_rules.len(),
            backend_services = inventory.backend_services.len(),
            http_proxies = inventory.http_proxies.len(),
            https_proxies = inventory.https_proxies.len(),
            url_maps = inventory.url_maps.len(),
            "load balancer inventory assembled"
        );
        inventory
    }
}
