// ── Firewall rule evaluation ──
//
// Walks a network's rules in priority order and stops at the first
// enabled ingress rule that either allows traffic from anywhere or denies
// all protocols from anywhere. No decisive rule means exposed.

use serde::Serialize;

use super::ports::any_public;
use crate::model::{Direction, FirewallRule, links_match};

/// Outcome of evaluating one network's firewall rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureVerdict {
    pub exposed: bool,
    /// `"vpc <network>"` when a specific allow rule decided the verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,
}

impl ExposureVerdict {
    fn allowed_by(rule: &FirewallRule) -> Self {
        Self {
            exposed: true,
            network_name: Some(format!("vpc {}", rule.network_name())),
        }
    }

    fn blocked() -> Self {
        Self {
            exposed: false,
            network_name: None,
        }
    }

    /// No rule was decisive. Treated as exposed.
    fn undecided() -> Self {
        Self {
            exposed: true,
            network_name: None,
        }
    }
}

/// Evaluate `rules` (all belonging to one network) into a verdict.
///
/// Rules are ordered by ascending priority, missing priorities counting as
/// 1000; the sort is stable, so equal priorities keep their input order.
pub fn evaluate<'a>(rules: impl IntoIterator<Item = &'a FirewallRule>) -> ExposureVerdict {
    let mut ordered: Vec<&FirewallRule> = rules.into_iter().collect();
    ordered.sort_by_key(|rule| rule.effective_priority());

    for rule in ordered {
        if !rule.applies_to(Direction::Ingress) || rule.disabled {
            continue;
        }
        if !any_public(&rule.source_ranges) {
            continue;
        }

        if rule.allowed.iter().any(|entry| !entry.protocol().is_empty()) {
            tracing::debug!(
                rule = %rule.name,
                priority = rule.effective_priority(),
                "ingress from any source allowed"
            );
            return ExposureVerdict::allowed_by(rule);
        }

        if rule.denied.iter().any(|entry| entry.protocol() == "all") {
            tracing::debug!(
                rule = %rule.name,
                priority = rule.effective_priority(),
                "ingress from any source denied"
            );
            return ExposureVerdict::blocked();
        }
    }

    tracing::trace!("no decisive firewall rule; defaulting to exposed");
    ExposureVerdict::undecided()
}

/// The subset of a project's rules that apply to `network`.
pub fn rules_for_network<'a>(rules: &'a [FirewallRule], network: &str) -> Vec<&'a FirewallRule> {
    rules
        .iter()
        .filter(|rule| {
            rule.network
                .as_deref()
                .is_some_and(|link| links_match(link, network))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn rules(value: Value) -> Vec<FirewallRule> {
        serde_json::from_value(value).unwrap()
    }

    const PROD: &str = "https://www.googleapis.com/compute/v1/projects/acme/global/networks/prod";

    #[test]
    fn allow_from_anywhere_names_the_network() {
        let set = rules(json!([{
            "priority": 100,
            "direction": "INGRESS",
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{ "IPProtocol": "tcp" }],
            "network": PROD
        }]));
        let verdict = evaluate(&set);
        assert!(verdict.exposed);
        assert_eq!(verdict.network_name.as_deref(), Some("vpc prod"));
    }

    #[test]
    fn earlier_deny_all_wins_over_allow() {
        let set = rules(json!([
            {
                "priority": 100,
                "direction": "INGRESS",
                "sourceRanges": ["0.0.0.0/0"],
                "allowed": [{ "IPProtocol": "tcp" }],
                "network": PROD
            },
            {
                "priority": 50,
                "direction": "INGRESS",
                "sourceRanges": ["0.0.0.0/0"],
                "denied": [{ "IPProtocol": "all" }],
                "network": PROD
            }
        ]));
        assert_eq!(evaluate(&set), ExposureVerdict::blocked());
    }

    #[test]
    fn verdict_ignores_input_order_for_distinct_priorities() {
        let mut set = rules(json!([
            { "name": "deny", "priority": 10, "direction": "INGRESS",
              "sourceRanges": ["::/0"], "denied": [{ "IPProtocol": "all" }] },
            { "name": "allow", "priority": 20, "direction": "INGRESS",
              "sourceRanges": ["0.0.0.0/0"], "allowed": [{ "IPProtocol": "udp" }] }
        ]));
        let forward = evaluate(&set);
        set.reverse();
        assert_eq!(evaluate(&set), forward);
        assert!(!forward.exposed);
    }

    #[test]
    fn equal_priorities_keep_input_order() {
        let allow_first = rules(json!([
            { "direction": "INGRESS", "sourceRanges": ["0.0.0.0/0"],
              "allowed": [{ "IPProtocol": "tcp" }], "network": PROD },
            { "direction": "INGRESS", "sourceRanges": ["0.0.0.0/0"],
              "denied": [{ "IPProtocol": "all" }] }
        ]));
        assert!(evaluate(&allow_first).exposed);

        let mut deny_first = allow_first.clone();
        deny_first.reverse();
        assert!(!evaluate(&deny_first).exposed);
    }

    #[test]
    fn empty_rule_set_defaults_to_exposed() {
        let none: Vec<FirewallRule> = Vec::new();
        let verdict = evaluate(&none);
        assert_eq!(verdict, ExposureVerdict::undecided());
        assert_eq!(verdict.network_name, None);
    }

    #[test]
    fn ineligible_rules_default_to_exposed() {
        let set = rules(json!([
            { "direction": "EGRESS", "destinationRanges": ["0.0.0.0/0"],
              "sourceRanges": ["0.0.0.0/0"], "denied": [{ "IPProtocol": "all" }] },
            { "direction": "INGRESS", "disabled": true, "sourceRanges": ["0.0.0.0/0"],
              "denied": [{ "IPProtocol": "all" }] },
            { "direction": "INGRESS", "sourceRanges": ["10.0.0.0/8"],
              "denied": [{ "IPProtocol": "all" }] }
        ]));
        assert_eq!(evaluate(&set), ExposureVerdict::undecided());
    }

    #[test]
    fn deny_of_single_protocol_is_not_decisive() {
        let set = rules(json!([
            { "priority": 1, "direction": "INGRESS", "sourceRanges": ["0.0.0.0/0"],
              "denied": [{ "IPProtocol": "tcp" }] },
            { "priority": 2, "direction": "INGRESS", "sourceRanges": ["internet"],
              "allowed": [{ "IPProtocol": "icmp" }], "network": PROD }
        ]));
        assert_eq!(evaluate(&set).network_name.as_deref(), Some("vpc prod"));
    }

    #[test]
    fn allow_without_protocol_is_skipped() {
        let set = rules(json!([
            { "priority": 1, "direction": "INGRESS", "sourceRanges": ["0.0.0.0/0"],
              "allowed": [{ "ports": ["22"] }] }
        ]));
        assert_eq!(evaluate(&set), ExposureVerdict::undecided());
    }

    #[test]
    fn zero_priority_sorts_first() {
        let set = rules(json!([
            { "priority": 1000, "direction": "INGRESS", "sourceRanges": ["0.0.0.0/0"],
              "allowed": [{ "IPProtocol": "tcp" }] },
            { "priority": 0, "direction": "INGRESS", "sourceRanges": ["0.0.0.0/0"],
              "denied": [{ "IPProtocol": "all" }] }
        ]));
        assert!(!evaluate(&set).exposed);
    }

    #[test]
    fn rules_for_network_matches_by_link_suffix() {
        let set = rules(json!([
            { "name": "a", "network": PROD },
            { "name": "b", "network": "projects/acme/global/networks/dev" },
            { "name": "c" }
        ]));
        let scoped = rules_for_network(&set, "projects/acme/global/networks/prod");
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].name, "a");
    }
}
