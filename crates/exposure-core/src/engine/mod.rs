//! Exposure analysis over the model types.
//!
//! - [`ports`]: which service ports, or the whole port space, a rule opens
//! - [`firewall`]: priority-ordered verdict for one network's rules
//! - [`delivery`]: forwarding rule → proxy → URL map → backend service paths
//! - [`exposure`]: combines the two signals into one description
//! - [`cluster`]: control-plane exposure from cluster configuration

pub mod cluster;
pub mod delivery;
pub mod exposure;
pub mod firewall;
pub mod ports;

pub use cluster::{ClusterExposure, ClusterExposureReason, check_cluster};
pub use delivery::{DeliveryChainResolver, DeliveryPath};
pub use exposure::{Exposure, ExposureResolver, is_private_address, resolve_exposure};
pub use firewall::{ExposureVerdict, evaluate, rules_for_network};
pub use ports::{
    ALL_PORTS_OPEN, OrderedSet, PortSpec, ServicePorts, all_ports_exposures, any_public,
    builtin_services, find_builtin, is_public_range, open_port_exposures,
};
