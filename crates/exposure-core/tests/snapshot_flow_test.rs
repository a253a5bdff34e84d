#![allow(clippy::unwrap_used)]

// End-to-end checks from a cached snapshot document to exposure answers.

use exposure_core::{
    CacheKey, CloudFunction, Cluster, ComputeInstance, Direction, ExposureResolver, FirewallRule,
    LoadBalancerInventory, Snapshot, Status, TargetResource, check_cluster, engine::find_builtin,
    scan_all_ports, scan_open_ports,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const API: &str = "https://www.googleapis.com/compute/v1/";

fn link(path: &str) -> String {
    format!("{API}projects/acme/{path}")
}

fn snapshot() -> Snapshot {
    Snapshot::from_value(json!({
        "projects": { "get": { "global": { "data": [{ "name": "acme" }] } } },
        "firewalls": { "list": { "global": { "data": [
            {
                "name": "allow-ssh",
                "network": link("global/networks/prod"),
                "direction": "INGRESS",
                "priority": 1000,
                "sourceRanges": ["0.0.0.0/0"],
                "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }]
            },
            {
                "name": "deny-all",
                "network": link("global/networks/locked"),
                "direction": "INGRESS",
                "priority": 10,
                "sourceRanges": ["0.0.0.0/0"],
                "denied": [{ "IPProtocol": "all" }]
            }
        ] } } },
        "instances": { "list": {
            "us-central1-a": { "data": [
                {
                    "name": "bastion",
                    "selfLink": link("zones/us-central1-a/instances/bastion"),
                    "networkInterfaces": [{ "network": link("global/networks/prod") }]
                },
                {
                    "name": "web-1",
                    "selfLink": link("zones/us-central1-a/instances/web-1"),
                    "networkInterfaces": [{ "network": link("global/networks/locked") }]
                },
                {
                    "name": "batch",
                    "selfLink": link("zones/us-central1-a/instances/batch"),
                    "networkInterfaces": [{ "network": link("global/networks/locked") }]
                }
            ] }
        } },
        "forwardingRules": { "list": { "global": { "data": [{
            "name": "web-fr",
            "IPAddress": "34.120.0.10",
            "loadBalancingScheme": "EXTERNAL_MANAGED",
            "target": link("global/targetHttpsProxies/web-tp")
        }] } } },
        "targetHttpsProxies": { "list": { "global": { "data": [{
            "name": "web-tp",
            "selfLink": link("global/targetHttpsProxies/web-tp"),
            "urlMap": link("global/urlMaps/web-um")
        }] } } },
        "urlMaps": { "list": { "global": { "data": [{
            "name": "web-um",
            "selfLink": link("global/urlMaps/web-um"),
            "defaultService": link("global/backendServices/web-bs")
        }] } } },
        "backendServices": { "list": { "global": { "data": [{
            "name": "web-bs",
            "selfLink": link("global/backendServices/web-bs"),
            "backends": [{ "group": link("zones/us-central1-a/instanceGroups/web") }]
        }] } } },
        "functions": { "list": { "us-central1": { "err": { "message": "API not enabled" } } } },
        "kubernetes": { "list": { "global": { "data": [
            { "name": "open", "endpoint": "35.1.1.1" },
            { "name": "closed", "privateClusterConfig": { "enablePrivateEndpoint": true } }
        ] } } }
    }))
    .unwrap()
}

fn instance_exposure(snapshot: &Snapshot, name: &str) -> String {
    let inventory = LoadBalancerInventory::from_snapshot(snapshot);
    let rules: Vec<FirewallRule> = snapshot.collect(CacheKey::FIREWALLS);
    let instances: Vec<ComputeInstance> = snapshot.collect(CacheKey::INSTANCES);
    let instance = instances.iter().find(|i| i.name == name).unwrap();
    let resolver = ExposureResolver::new(&inventory, &rules);
    resolver
        .for_networks(&TargetResource::from(instance), &instance.networks())
        .description
}

#[test]
fn firewall_allow_names_the_vpc() {
    assert_eq!(instance_exposure(&snapshot(), "bastion"), "vpc prod");
}

#[test]
fn deny_all_network_hides_the_instance() {
    assert_eq!(instance_exposure(&snapshot(), "batch"), "");
}

#[test]
fn instance_group_target_is_reached_through_the_load_balancer() {
    let snapshot = snapshot();
    let inventory = LoadBalancerInventory::from_snapshot(&snapshot);
    let none: Vec<FirewallRule> = Vec::new();
    let resolver = ExposureResolver::new(&inventory, &none);
    let group = TargetResource::SelfLink("projects/acme/zones/us-central1-a/instanceGroups/web".into());

    let exposure = resolver.for_target(&group, None);
    assert_eq!(
        exposure.description,
        "FR web-fr > TP web-tp > UM web-um > BS web-bs"
    );
    assert_eq!(exposure.paths.len(), 1);
}

#[test]
fn instance_links_do_not_match_their_instance_group() {
    let snapshot = snapshot();
    let inventory = LoadBalancerInventory::from_snapshot(&snapshot);
    let instances: Vec<ComputeInstance> = snapshot.collect(CacheKey::INSTANCES);
    let web = instances.iter().find(|i| i.name == "web-1").unwrap();
    let none: Vec<FirewallRule> = Vec::new();

    let exposure =
        ExposureResolver::new(&inventory, &none).for_target(&TargetResource::from(web), None);
    assert!(exposure.paths.is_empty());
    assert!(!exposure.is_exposed());
}

#[test]
fn failed_regions_surface_as_errors_not_items() {
    let snapshot = snapshot();
    let functions: Vec<CloudFunction> = snapshot.collect(CacheKey::FUNCTIONS);
    assert!(functions.is_empty());
    assert_eq!(
        snapshot.errors(CacheKey::FUNCTIONS),
        [("us-central1".to_owned(), "API not enabled".to_owned())]
    );
}

#[test]
fn port_scans_label_findings_with_the_project() {
    let snapshot = snapshot();
    let rules: Vec<FirewallRule> = snapshot.collect(CacheKey::FIREWALLS);
    let project = snapshot.project().unwrap();

    let ssh = scan_open_ports(&rules, &find_builtin("SSH").unwrap(), &project, "global");
    let summary: Vec<_> = ssh
        .iter()
        .map(|f| (f.status, f.resource.as_deref().unwrap()))
        .collect();
    assert_eq!(
        summary,
        [
            (Status::Fail, "projects/acme/global/firewalls/allow-ssh"),
            (Status::Ok, "projects/acme/global/firewalls/deny-all"),
        ]
    );

    let all = scan_all_ports(&rules, Direction::Ingress, &project, "global");
    assert!(all.iter().all(|f| f.status == Status::Ok));
}

#[test]
fn clusters_are_checked_from_configuration() {
    let clusters: Vec<Cluster> = snapshot().collect(CacheKey::CLUSTERS);
    let exposed: Vec<_> = clusters
        .iter()
        .map(check_cluster)
        .map(|c| (c.cluster.clone(), c.is_exposed()))
        .collect();
    assert_eq!(
        exposed,
        [("open".to_owned(), true), ("closed".to_owned(), false)]
    );
}
