// ── Firewall domain types ──

use serde::{Deserialize, Serialize};

use super::self_link::last_segment;

/// Priority assumed for rules that omit one.
pub const DEFAULT_PRIORITY: u32 = 1000;

/// Traffic direction a rule applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Direction {
    Ingress,
    Egress,
    /// Any value the provider adds later. Never eligible for evaluation.
    #[serde(other)]
    Unknown,
}

/// One `allowed` / `denied` entry: a protocol plus optional port list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    #[serde(rename = "IPProtocol", default)]
    pub ip_protocol: Option<String>,
    #[serde(default)]
    pub ports: Vec<String>,
}

impl RuleEntry {
    /// The protocol name, or `""` when absent.
    pub fn protocol(&self) -> &str {
        self.ip_protocol.as_deref().unwrap_or_default()
    }
}

/// Firewall rule as returned by the `firewalls.list` API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub source_ranges: Vec<String>,
    #[serde(default)]
    pub destination_ranges: Vec<String>,
    #[serde(default)]
    pub allowed: Vec<RuleEntry>,
    #[serde(default)]
    pub denied: Vec<RuleEntry>,
}

impl FirewallRule {
    /// Priority used for ordering; lower values win.
    pub fn effective_priority(&self) -> u32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }

    pub fn applies_to(&self, direction: Direction) -> bool {
        direction != Direction::Unknown && self.direction == Some(direction)
    }

    /// Short network name (`prod` for `.../global/networks/prod`), `""` when absent.
    pub fn network_name(&self) -> &str {
        self.network.as_deref().map(last_segment).unwrap_or_default()
    }

    /// The address ranges that are meaningful for `direction`:
    /// `sourceRanges` for ingress, `destinationRanges` for egress.
    pub fn ranges_for(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Ingress => &self.source_ranges,
            Direction::Egress => &self.destination_ranges,
            Direction::Unknown => &[],
        }
    }
}
