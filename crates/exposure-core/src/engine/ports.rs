// ── Port matching ──
//
// Decides whether a firewall rule opens specific service ports, or the
// whole port space, to the public internet, and renders each hit as a
// human-readable phrase for a finding message.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Direction, FirewallRule};

/// Phrase emitted for rules that open every port.
pub const ALL_PORTS_OPEN: &str = "all ports open to the public";

const HIGHEST_PORT: u16 = 65535;

/// Source/destination literals meaning "anywhere".
const PUBLIC_RANGE_LITERALS: [&str; 5] = ["*", "", "0.0.0.0/0", "::/0", "<nw>/0"];

/// Whether a single range string denotes the whole internet.
pub fn is_public_range(range: &str) -> bool {
    PUBLIC_RANGE_LITERALS.contains(&range)
        || range.contains("/0")
        || range.eq_ignore_ascii_case("internet")
}

pub fn any_public(ranges: &[String]) -> bool {
    ranges.iter().any(|r| is_public_range(r))
}

// ── OrderedSet ──────────────────────────────────────────────────────

/// Append-only list of phrases, deduplicated on insert, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderedSet(IndexSet<String>);

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` unless already present. Returns `true` if appended.
    pub fn insert(&mut self, item: impl Into<String>) -> bool {
        self.0.insert(item.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn join(&self, separator: &str) -> String {
        self.iter().collect::<Vec<_>>().join(separator)
    }
}

impl<'a> IntoIterator for &'a OrderedSet {
    type Item = &'a String;
    type IntoIter = indexmap::set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── PortSpec ────────────────────────────────────────────────────────

/// One entry of a rule's `ports` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Single(u16),
    /// `"N-M"`. Queried ports match only strictly inside the bounds.
    Range { start: u16, end: u16 },
    /// The literal `"all"`.
    All,
    /// `"*"`. Accepted as a port token but never read as the whole port
    /// space.
    Wildcard,
    /// Anything unparseable. Matches nothing.
    Invalid,
}

impl PortSpec {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "all" => return Self::All,
            "*" => return Self::Wildcard,
            _ => {}
        }
        if let Some((start, end)) = raw.split_once('-') {
            return match (start.trim().parse(), end.trim().parse()) {
                (Ok(start), Ok(end)) => Self::Range { start, end },
                _ => Self::Invalid,
            };
        }
        raw.parse().map_or(Self::Invalid, Self::Single)
    }

    /// Whether a specific queried port is opened by this entry.
    ///
    /// Range bounds are exclusive: `"21-23"` opens 22 but not 21 or 23.
    /// `All` and `Wildcard` never match a specific port query.
    pub fn matches_port(self, port: u16) -> bool {
        match self {
            Self::Single(p) => p == port,
            Self::Range { start, end } => start < port && port < end,
            Self::All | Self::Wildcard | Self::Invalid => false,
        }
    }

    /// Whether this entry covers the entire port space.
    pub fn spans_all(self) -> bool {
        matches!(
            self,
            Self::All
                | Self::Range {
                    start: 0,
                    end: HIGHEST_PORT
                }
        )
    }
}

// ── ServicePorts ────────────────────────────────────────────────────

/// A named set of ports to look for, keyed by protocol (`tcp`, `udp`, `*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePorts {
    pub name: String,
    pub protocols: IndexMap<String, Vec<u16>>,
}

impl ServicePorts {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            protocols: IndexMap::new(),
        }
    }

    pub fn with(mut self, protocol: &str, ports: &[u16]) -> Self {
        self.protocols
            .entry(protocol.to_owned())
            .or_default()
            .extend_from_slice(ports);
        self
    }

    /// Parse an ad-hoc `protocol:port[,port...]` specification, e.g.
    /// `tcp:8080,8443`.
    pub fn parse_spec(name: impl Into<String>, spec: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidPort {
            protocol: spec.split(':').next().unwrap_or_default().to_owned(),
            spec: spec.to_owned(),
        };
        let (protocol, ports) = spec.split_once(':').ok_or_else(invalid)?;
        let ports = ports
            .split(',')
            .map(|p| p.trim().parse::<u16>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        if protocol.is_empty() || ports.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(name).with(&protocol.to_lowercase(), &ports))
    }
}

impl fmt::Display for ServicePorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .protocols
            .iter()
            .map(|(protocol, ports)| {
                let ports: Vec<String> = ports.iter().map(ToString::to_string).collect();
                format!("{protocol}:{}", ports.join(","))
            })
            .collect();
        write!(f, "{} ({})", self.name, parts.join(" "))
    }
}

/// Well-known services checked by default.
pub fn builtin_services() -> Vec<ServicePorts> {
    vec![
        ServicePorts::new("SSH").with("tcp", &[22]),
        ServicePorts::new("Telnet").with("tcp", &[23]),
        ServicePorts::new("FTP").with("tcp", &[20, 21]),
        ServicePorts::new("SMTP").with("tcp", &[25]),
        ServicePorts::new("DNS").with("tcp", &[53]).with("udp", &[53]),
        ServicePorts::new("HTTP").with("tcp", &[80]),
        ServicePorts::new("POP3").with("tcp", &[110]),
        ServicePorts::new("NetBIOS").with("udp", &[137, 138]),
        ServicePorts::new("HTTPS").with("tcp", &[443]),
        ServicePorts::new("SMBoTCP").with("tcp", &[445]),
        ServicePorts::new("SQLServer").with("tcp", &[1433]),
        ServicePorts::new("Oracle").with("tcp", &[1521]),
        ServicePorts::new("MySQL").with("tcp", &[3306]),
        ServicePorts::new("RDP").with("tcp", &[3389]),
        ServicePorts::new("Salt").with("tcp", &[4505, 4506]),
        ServicePorts::new("PostgreSQL").with("tcp", &[5432]),
        ServicePorts::new("Kibana").with("tcp", &[5601]),
        ServicePorts::new("VNC").with("tcp", &[5900]),
        ServicePorts::new("Redis").with("tcp", &[6379]),
        ServicePorts::new("Cassandra").with("tcp", &[7001]),
        ServicePorts::new("Hadoop").with("tcp", &[8020, 50070]),
        ServicePorts::new("Elasticsearch").with("tcp", &[9200, 9300]),
        ServicePorts::new("MongoDB").with("tcp", &[27017]),
    ]
}

/// Look up a built-in service by name, ignoring case.
pub fn find_builtin(name: &str) -> Option<ServicePorts> {
    builtin_services()
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
}

// ── Matching ────────────────────────────────────────────────────────

fn protocol_label(protocol: &str) -> String {
    if protocol == "*" {
        "All protocols".to_owned()
    } else {
        protocol.to_uppercase()
    }
}

fn source_filter(ranges: &[String]) -> String {
    match ranges {
        [only] if only == "0.0.0.0/0" => "any IP".to_owned(),
        _ => ranges.join(","),
    }
}

/// Phrases describing which of `service`'s ports `rule` opens to the public,
/// e.g. `"TCP port 22 open to any IP"`.
///
/// Only enabled ingress rules with a public source range contribute.
pub fn open_port_exposures(rule: &FirewallRule, service: &ServicePorts) -> OrderedSet {
    let mut exposures = OrderedSet::new();
    if rule.allowed.is_empty()
        || rule.disabled
        || !rule.applies_to(Direction::Ingress)
        || !any_public(&rule.source_ranges)
    {
        return exposures;
    }

    let filter = source_filter(&rule.source_ranges);
    for entry in &rule.allowed {
        for (protocol, ports) in &service.protocols {
            if entry.protocol().is_empty() || (protocol != "*" && entry.protocol() != protocol) {
                continue;
            }
            for &port in ports {
                if entry
                    .ports
                    .iter()
                    .any(|spec| PortSpec::parse(spec).matches_port(port))
                {
                    exposures.insert(format!(
                        "{} port {port} open to {filter}",
                        protocol_label(protocol)
                    ));
                }
            }
        }
    }
    exposures
}

/// Whether `rule` opens the entire port space to the public in `direction`.
///
/// A tcp or udp entry must list `"0-65535"` or `"all"`; an entry whose
/// protocol is `all` qualifies regardless of ports.
pub fn all_ports_exposures(rule: &FirewallRule, direction: Direction) -> OrderedSet {
    let mut exposures = OrderedSet::new();
    let ranges = rule.ranges_for(direction);
    if rule.allowed.is_empty()
        || rule.disabled
        || !rule.applies_to(direction)
        || !any_public(ranges)
    {
        return exposures;
    }

    for entry in &rule.allowed {
        let opens_all = match entry.protocol() {
            "tcp" | "udp" => entry.ports.iter().any(|p| PortSpec::parse(p).spans_all()),
            "all" => true,
            _ => false,
        };
        if opens_all {
            exposures.insert(ALL_PORTS_OPEN);
        }
    }
    exposures
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn rule(value: Value) -> FirewallRule {
        serde_json::from_value(value).unwrap()
    }

    fn ssh() -> ServicePorts {
        find_builtin("ssh").unwrap()
    }

    #[test]
    fn range_bounds_are_exclusive() {
        let spec = PortSpec::parse("21-23");
        assert!(spec.matches_port(22));
        assert!(!spec.matches_port(21));
        assert!(!spec.matches_port(23));
    }

    #[test]
    fn parse_handles_each_form() {
        assert_eq!(PortSpec::parse("22"), PortSpec::Single(22));
        assert_eq!(PortSpec::parse(" 0-65535 "), PortSpec::Range { start: 0, end: 65535 });
        assert_eq!(PortSpec::parse("all"), PortSpec::All);
        assert_eq!(PortSpec::parse("*"), PortSpec::Wildcard);
        assert_eq!(PortSpec::parse("ALL"), PortSpec::Invalid);
        assert_eq!(PortSpec::parse("ssh"), PortSpec::Invalid);
        assert_eq!(PortSpec::parse("1-x"), PortSpec::Invalid);
        assert_eq!(PortSpec::parse("70000"), PortSpec::Invalid);
    }

    #[test]
    fn spans_all_requires_full_range() {
        assert!(PortSpec::parse("0-65535").spans_all());
        assert!(PortSpec::parse("all").spans_all());
        assert!(!PortSpec::parse("1-65535").spans_all());
        assert!(!PortSpec::parse("22").spans_all());
        assert!(!PortSpec::parse("*").spans_all());
        assert!(!PortSpec::parse("All").spans_all());
    }

    #[test]
    fn all_token_does_not_match_single_port_query() {
        assert!(!PortSpec::All.matches_port(22));
    }

    #[test]
    fn public_range_literals() {
        for range in ["*", "", "0.0.0.0/0", "::/0", "<nw>/0", "Internet", "10.0.0.0/0"] {
            assert!(is_public_range(range), "{range} should be public");
        }
        assert!(!is_public_range("10.0.0.0/8"));
        assert!(!is_public_range("35.1.1.1/32"));
    }

    #[test]
    fn open_ssh_to_any_ip() {
        let fw = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "tcp", "ports": ["22", "20-30"] }]
        }));
        let hits = open_port_exposures(&fw, &ssh());
        assert_eq!(hits.iter().collect::<Vec<_>>(), ["TCP port 22 open to any IP"]);
    }

    #[test]
    fn multiple_sources_are_listed_raw() {
        let fw = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0", "::/0"],
            "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }]
        }));
        let hits = open_port_exposures(&fw, &ssh());
        assert_eq!(hits.join(" and "), "TCP port 22 open to 0.0.0.0/0,::/0");
    }

    #[test]
    fn wildcard_protocol_renders_all_protocols() {
        let fw = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["*"],
            "allowed": [{ "IPProtocol": "*", "ports": ["3389"] }]
        }));
        let service = ServicePorts::new("RDP").with("*", &[3389]);
        let hits = open_port_exposures(&fw, &service);
        assert_eq!(hits.join(""), "All protocols port 3389 open to *");
    }

    #[test]
    fn wildcard_service_protocol_matches_any_rule_protocol() {
        let fw = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [
                { "IPProtocol": "tcp", "ports": ["3389"] },
                { "IPProtocol": "udp", "ports": ["3389"] }
            ]
        }));
        let service = ServicePorts::new("RDP").with("*", &[3389]);
        let hits = open_port_exposures(&fw, &service);
        assert_eq!(
            hits.iter().collect::<Vec<_>>(),
            ["All protocols port 3389 open to any IP"]
        );
    }

    #[test]
    fn restricted_disabled_or_egress_rules_open_nothing() {
        let restricted = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["10.0.0.0/8"],
            "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }]
        }));
        let disabled = rule(json!({
            "direction": "INGRESS",
            "disabled": true,
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }]
        }));
        let egress = rule(json!({
            "direction": "EGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }]
        }));
        for fw in [restricted, disabled, egress] {
            assert!(open_port_exposures(&fw, &ssh()).is_empty());
        }
    }

    #[test]
    fn entry_without_ports_contributes_nothing() {
        let fw = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "tcp" }]
        }));
        assert!(open_port_exposures(&fw, &ssh()).is_empty());
    }

    #[test]
    fn duplicate_hits_are_collapsed() {
        let fw = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [
                { "IPProtocol": "tcp", "ports": ["22"] },
                { "IPProtocol": "tcp", "ports": ["10-100"] }
            ]
        }));
        assert_eq!(open_port_exposures(&fw, &ssh()).len(), 1);
    }

    #[test]
    fn all_ports_via_full_range_or_all_protocol() {
        let full_range = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "udp", "ports": ["0-65535"] }]
        }));
        let all_protocol = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "all" }]
        }));
        let partial = rule(json!({
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "tcp", "ports": ["1-65535"] }]
        }));

        assert_eq!(
            all_ports_exposures(&full_range, Direction::Ingress).join(""),
            ALL_PORTS_OPEN
        );
        assert_eq!(all_ports_exposures(&all_protocol, Direction::Ingress).len(), 1);
        assert!(all_ports_exposures(&partial, Direction::Ingress).is_empty());
    }

    #[test]
    fn egress_reads_destination_ranges() {
        let fw = rule(json!({
            "direction": "EGRESS",
            "sourceRanges": ["10.0.0.0/8"],
            "destinationRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "tcp", "ports": ["all"] }]
        }));
        assert_eq!(all_ports_exposures(&fw, Direction::Egress).len(), 1);
        assert!(all_ports_exposures(&fw, Direction::Ingress).is_empty());
    }

    #[test]
    fn parse_spec_builds_ad_hoc_service() {
        let service = ServicePorts::parse_spec("custom", "TCP:8080, 8443").unwrap();
        assert_eq!(service.protocols["tcp"], [8080, 8443]);
        assert_eq!(service.to_string(), "custom (tcp:8080,8443)");

        assert!(ServicePorts::parse_spec("bad", "tcp").is_err());
        assert!(ServicePorts::parse_spec("bad", "tcp:http").is_err());
        assert!(ServicePorts::parse_spec("bad", ":22").is_err());
    }

    #[test]
    fn builtin_lookup_ignores_case() {
        assert_eq!(find_builtin("postgresql").unwrap().protocols["tcp"], [5432]);
        assert!(find_builtin("gopher").is_none());
    }
}
