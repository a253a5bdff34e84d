// ── Findings ──
//
// A finding is one line of audit output: a status, a message, and the
// resource it is about. The scans here turn port matcher output into
// per-rule findings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::ports::{ServicePorts, all_ports_exposures, open_port_exposures};
use crate::model::{Direction, FirewallRule, ResourceName};

const DEFAULT_REGION: &str = "global";

/// Error text the provider uses for an API that is switched off.
const DISABLED_KEYWORDS: [&str; 2] = ["has not been used", "it is disabled"];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Status {
    Ok,
    Warn,
    Fail,
    Unknown,
}

impl Status {
    /// Numeric severity: 0 OK, 1 WARN, 2 FAIL, 3 UNKNOWN.
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warn => 1,
            Self::Fail => 2,
            Self::Unknown => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub status: Status,
    pub message: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl Finding {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            region: DEFAULT_REGION.to_owned(),
            resource: None,
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Status::Ok, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Status::Fail, message)
    }

    /// `Unable to query for <what>: <err>`
    pub fn unknown_query(what: &str, err: &str) -> Self {
        Self::new(Status::Unknown, format!("Unable to query for {what}: {err}"))
    }

    /// Classify a cached query error.
    ///
    /// A 404 means the project is going away and a 403 for a disabled API
    /// means the service is off; both are OK. A 403 carrying an `errors`
    /// list yields one finding per entry. Anything else is UNKNOWN.
    pub fn from_query_error(what: &str, err: &Value) -> Vec<Self> {
        let message = error_text(err);
        let nested = err
            .get("errors")
            .and_then(Value::as_array)
            .filter(|entries| !entries.is_empty());

        match (error_code(err), nested) {
            (Some(404), _) => vec![Self::ok("Project is deleted or pending deletion.")],
            (Some(403), _) if message.as_deref().is_some_and(mentions_disabled) => {
                vec![Self::service_disabled()]
            }
            (Some(403), Some(entries)) => entries
                .iter()
                .map(|entry| match error_text(entry) {
                    Some(text) if mentions_disabled(&text) => Self::service_disabled(),
                    Some(text) => Self::unknown_query(what, &text),
                    None => Self::unknown_query(what, message.as_deref().unwrap_or_default()),
                })
                .collect(),
            (Some(_), _) => vec![Self::unknown_query(
                what,
                &message.unwrap_or_else(|| err.to_string()),
            )],
            (None, _) => match message {
                Some(text) if mentions_disabled(&text) => vec![Self::service_disabled()],
                Some(text) => vec![Self::unknown_query(what, &text)],
                None => vec![Self::unknown_query(what, &err.to_string())],
            },
        }
    }

    fn service_disabled() -> Self {
        Self::ok("Service is not enabled")
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

fn error_code(err: &Value) -> Option<u64> {
    match err.get("code")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn error_text(err: &Value) -> Option<String> {
    match err {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("message").and_then(Value::as_str).map(str::to_owned),
        _ => None,
    }
}

fn mentions_disabled(message: &str) -> bool {
    DISABLED_KEYWORDS.iter().any(|k| message.contains(k))
}

fn firewall_resource(rule: &FirewallRule, project: &str) -> ResourceName {
    ResourceName::new("firewalls", &rule.name).project(project)
}

/// One finding per rule: FAIL when the rule opens any of `service`'s
/// ports to the public, OK otherwise.
///
/// Rules with `allowed` entries but no source ranges produce no finding.
pub fn scan_open_ports(
    rules: &[FirewallRule],
    service: &ServicePorts,
    project: &str,
    region: &str,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for rule in rules {
        if !rule.allowed.is_empty() && rule.source_ranges.is_empty() {
            continue;
        }
        let exposures = open_port_exposures(rule, service);
        let finding = if exposures.is_empty() {
            Finding::ok(format!(
                "Firewall Rule:({}) does not have {} port open",
                rule.name, service.name
            ))
        } else {
            Finding::fail(format!(
                "Firewall Rule:({}) has {}: {}",
                rule.name,
                service.name,
                exposures.join(" and ")
            ))
        };
        findings.push(
            finding
                .region(region)
                .resource(firewall_resource(rule, project).to_string()),
        );
    }
    findings
}

/// One finding per rule: FAIL when the rule opens every port to the
/// public in `direction`, OK otherwise.
///
/// Rules with `allowed` entries but none of the direction's ranges produce
/// no finding.
pub fn scan_all_ports(
    rules: &[FirewallRule],
    direction: Direction,
    project: &str,
    region: &str,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for rule in rules {
        if !rule.allowed.is_empty() && rule.ranges_for(direction).is_empty() {
            continue;
        }
        let exposures = all_ports_exposures(rule, direction);
        let finding = if exposures.is_empty() {
            Finding::ok(format!(
                "Firewall Rule:({}) does not have all ports open to the public",
                rule.name
            ))
        } else {
            Finding::fail(format!(
                "Firewall Rule:({}) has {}",
                rule.name,
                exposures.join(" and ")
            ))
        };
        findings.push(
            finding
                .region(region)
                .resource(firewall_resource(rule, project).to_string()),
        );
    }
    findings
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::engine::ports::find_builtin;

    fn rules(value: Value) -> Vec<FirewallRule> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn open_ssh_rule_fails() {
        let set = rules(json!([{
            "name": "allow-ssh",
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }]
        }]));
        let findings = scan_open_ports(&set, &find_builtin("ssh").unwrap(), "acme", "global");
        assert_eq!(
            findings,
            [Finding {
                status: Status::Fail,
                message: "Firewall Rule:(allow-ssh) has SSH: TCP port 22 open to any IP".into(),
                region: "global".into(),
                resource: Some("projects/acme/global/firewalls/allow-ssh".into()),
            }]
        );
    }

    #[test]
    fn multiple_hits_are_joined_with_and() {
        let set = rules(json!([{
            "name": "salt",
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "tcp", "ports": ["4505", "4000-5000"] }]
        }]));
        let findings = scan_open_ports(&set, &find_builtin("Salt").unwrap(), "acme", "global");
        assert_eq!(
            findings[0].message,
            "Firewall Rule:(salt) has Salt: TCP port 4505 open to any IP and TCP port 4506 open to any IP"
        );
    }

    #[test]
    fn rules_without_allowed_get_ok_and_rules_without_sources_are_skipped() {
        let set = rules(json!([
            { "name": "deny-only", "direction": "INGRESS", "sourceRanges": ["0.0.0.0/0"],
              "denied": [{ "IPProtocol": "all" }] },
            { "name": "no-sources", "direction": "INGRESS",
              "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }] },
            { "name": "internal", "direction": "INGRESS", "sourceRanges": ["10.0.0.0/8"],
              "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }] }
        ]));
        let findings = scan_open_ports(&set, &find_builtin("SSH").unwrap(), "", "global");
        let messages: Vec<_> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Firewall Rule:(deny-only) does not have SSH port open",
                "Firewall Rule:(internal) does not have SSH port open",
            ]
        );
        assert!(findings.iter().all(|f| f.status == Status::Ok));
        assert_eq!(findings[0].resource.as_deref(), Some("global/firewalls/deny-only"));
    }

    #[test]
    fn all_ports_scan_reads_direction_ranges() {
        let set = rules(json!([
            { "name": "wide-out", "direction": "EGRESS", "destinationRanges": ["0.0.0.0/0"],
              "allowed": [{ "IPProtocol": "all" }] },
            { "name": "wide-in", "direction": "INGRESS", "sourceRanges": ["0.0.0.0/0"],
              "allowed": [{ "IPProtocol": "tcp", "ports": ["0-65535"] }] }
        ]));

        let egress = scan_all_ports(&set, Direction::Egress, "acme", "global");
        assert_eq!(egress.len(), 1);
        assert_eq!(egress[0].status, Status::Fail);
        assert_eq!(
            egress[0].message,
            "Firewall Rule:(wide-out) has all ports open to the public"
        );

        let ingress = scan_all_ports(&set, Direction::Ingress, "acme", "global");
        let statuses: Vec<_> = ingress.iter().map(|f| (f.message.as_str(), f.status)).collect();
        assert_eq!(
            statuses,
            [("Firewall Rule:(wide-in) has all ports open to the public", Status::Fail)]
        );
    }

    #[test]
    fn unknown_query_message() {
        let finding = Finding::unknown_query("firewall rules", "permission denied").region("us-east1");
        assert_eq!(finding.status, Status::Unknown);
        assert_eq!(finding.status.code(), 3);
        assert_eq!(finding.message, "Unable to query for firewall rules: permission denied");
        assert_eq!(finding.region, "us-east1");
    }

    #[test]
    fn deleted_project_is_ok() {
        let findings = Finding::from_query_error("instances", &json!({ "code": 404, "message": "Not found" }));
        assert_eq!(findings, [Finding::ok("Project is deleted or pending deletion.")]);
    }

    #[test]
    fn disabled_api_is_ok_not_unknown() {
        let err = json!({
            "code": 403,
            "message": "Cloud Functions API has not been used in project acme before"
        });
        let findings = Finding::from_query_error("functions", &err);
        assert_eq!(findings, [Finding::ok("Service is not enabled")]);

        let plain = Finding::from_query_error("functions", &json!("it is disabled"));
        assert_eq!(plain[0].status, Status::Ok);
    }

    #[test]
    fn nested_403_errors_are_classified_one_by_one() {
        let err = json!({
            "code": "403",
            "message": "Forbidden",
            "errors": [
                { "message": "Compute Engine API it is disabled" },
                { "message": "Required 'compute.firewalls.list' permission" },
                { "reason": "forbidden" }
            ]
        });
        let findings = Finding::from_query_error("firewall rules", &err);
        let summary: Vec<_> = findings.iter().map(|f| (f.status, f.message.as_str())).collect();
        assert_eq!(
            summary,
            [
                (Status::Ok, "Service is not enabled"),
                (
                    Status::Unknown,
                    "Unable to query for firewall rules: Required 'compute.firewalls.list' permission"
                ),
                (Status::Unknown, "Unable to query for firewall rules: Forbidden"),
            ]
        );
    }

    #[test]
    fn other_errors_stay_unknown() {
        let quota = Finding::from_query_error("clusters", &json!({ "code": 429, "message": "quota exceeded" }));
        assert_eq!(quota[0].status, Status::Unknown);
        assert_eq!(quota[0].message, "Unable to query for clusters: quota exceeded");

        let bare = Finding::from_query_error("clusters", &json!({ "code": 500 }));
        assert_eq!(bare[0].message, r#"Unable to query for clusters: {"code":500}"#);
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(Status::Fail.to_string(), "FAIL");
        assert_eq!("warn".parse::<Status>().unwrap(), Status::Warn);
        assert_eq!(serde_json::to_value(Status::Ok).unwrap(), json!("OK"));
    }
}
