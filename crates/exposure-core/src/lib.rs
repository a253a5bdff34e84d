//! Network exposure resolution over cached cloud resource snapshots.
//!
//! Given a project's firewall rules and load-balancing configuration, this
//! crate answers "is this resource reachable from the public internet, and
//! how?":
//!
//! - **[`Snapshot`]**: the cached API document, merged across regions into
//!   flat collections. The only fallible entry point.
//!
//! - **Firewall evaluation** ([`engine::firewall`]): the lowest-priority
//!   enabled ingress rule from anywhere decides; no decisive rule means
//!   exposed.
//!
//! - **Delivery chains** ([`DeliveryChainResolver`]): traces forwarding
//!   rule → target proxy → URL map → backend service for a compute- or
//!   trigger-backed [`TargetResource`].
//!
//! - **[`ExposureResolver`]**: combines both signals into a single
//!   description (`"vpc prod"`, `"FR web > TP web-tp > UM web > BS web"`,
//!   or empty when not exposed).
//!
//! - **Port scans** ([`engine::ports`], [`finding`]): which well-known
//!   service ports, or the whole port space, each rule opens to the public,
//!   rendered as [`Finding`]s.
//!
//! - **[`check_cluster`]**: control-plane exposure for managed clusters.
//!
//! The engine performs no I/O and holds no state between calls.

pub mod engine;
pub mod error;
pub mod finding;
pub mod model;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use engine::{
    ClusterExposure, ClusterExposureReason, DeliveryChainResolver, DeliveryPath, Exposure,
    ExposureResolver, ExposureVerdict, OrderedSet, PortSpec, ServicePorts, check_cluster,
    evaluate, resolve_exposure, rules_for_network,
};
pub use error::CoreError;
pub use finding::{Finding, Status, scan_all_ports, scan_open_ports};
pub use snapshot::{CacheEntry, CacheKey, LoadBalancerInventory, Snapshot};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Backend, BackendService, Cluster, CloudFunction, ComputeInstance, Direction, FirewallRule,
    ForwardingRule, LoadBalancingScheme, ResourceName, RuleEntry, Scope, TargetProxy,
    TargetResource, UrlMap,
};
