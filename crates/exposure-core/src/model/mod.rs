//! Canonical, read-only snapshots of provider resources.
//!
//! Every type deserializes directly from the provider's JSON. Optional
//! fields default to empty so that absent data reads as "no signal".

pub mod cluster;
pub mod compute;
pub mod firewall;
pub mod load_balancing;
pub mod self_link;

pub use cluster::{CidrBlock, Cluster, MasterAuthorizedNetworksConfig, PrivateClusterConfig};
pub use compute::{
    AccessConfig, CloudFunction, ComputeInstance, HttpsTrigger, NetworkInterface, TargetResource,
};
pub use firewall::{DEFAULT_PRIORITY, Direction, FirewallRule, RuleEntry};
pub use load_balancing::{
    Backend, BackendService, ForwardingRule, LoadBalancingScheme, ProxyKind, TargetProxy, UrlMap,
};
pub use self_link::{ResourceName, Scope, last_segment, links_match, project_scoped};
