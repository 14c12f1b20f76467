// src/enrich/region.rs
//! Coarse IP to region heuristic.
//!
//! This is best-effort, not geolocation. Rules are CIDR blocks checked in
//! order and the first match wins. The built-in table keeps the historical
//! ordering, so some later entries can never match (see
//! [`RegionTable::shadowed_rules`]). Reordering the table is a behavior
//! change and should bump [`BUILTIN_TABLE_VERSION`].

use ipnetwork::Ipv4Network;
use lazy_static::lazy_static;
use serde::Deserialize;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const UNKNOWN_REGION: &str = "Unknown";
pub const BUILTIN_TABLE_VERSION: u32 = 1;

/// Ordered (label, networks) pairs. A bare first octet `N` is `N.0.0.0/8`.
const BUILTIN_RULES: &[(&str, &[&str])] = &[
    (
        "North America West",
        &["24.0.0.0/8", "76.0.0.0/8", "99.0.0.0/8", "68.128.0.0/10", "72.0.0.0/11", "75.0.0.0/10"],
    ),
    (
        "North America East",
        &["23.0.0.0/8", "64.0.0.0/8", "65.0.0.0/8", "66.0.0.0/9", "71.0.0.0/8", "74.0.0.0/8"],
    ),
    (
        "North America Central",
        &["67.0.0.0/8", "70.0.0.0/8", "72.0.0.0/8", "76.16.0.0/12"],
    ),
    (
        "Europe",
        &[
            "146.0.0.0/8", "178.0.0.0/8", "185.0.0.0/8", "188.0.0.0/8",
            "193.0.0.0/8", "194.0.0.0/8", "195.0.0.0/8",
        ],
    ),
    (
        "Europe",
        &["155.0.0.0/8", "176.0.0.0/8", "177.0.0.0/8", "179.0.0.0/8", "181.0.0.0/8", "192.0.0.0/8"],
    ),
    (
        "Europe",
        &["151.0.0.0/8", "160.0.0.0/8", "171.0.0.0/8", "175.0.0.0/8", "186.0.0.0/8", "187.0.0.0/8"],
    ),
    (
        "Europe",
        &["149.0.0.0/8", "156.0.0.0/8", "161.0.0.0/8", "164.0.0.0/8", "165.0.0.0/8", "169.0.0.0/8"],
    ),
    (
        "Asia East",
        &["103.0.0.0/8", "106.0.0.0/8", "111.0.0.0/8", "112.0.0.0/8", "113.0.0.0/8", "114.0.0.0/8"],
    ),
    (
        "Asia Southeast",
        &["101.0.0.0/8", "115.0.0.0/8", "116.0.0.0/8", "117.0.0.0/8", "118.0.0.0/8", "119.0.0.0/8"],
    ),
    (
        "Asia Pacific",
        &["121.0.0.0/8", "122.0.0.0/8", "123.0.0.0/8", "124.0.0.0/8", "125.0.0.0/8", "126.0.0.0/8"],
    ),
    (
        "Australia",
        &["27.0.0.0/8", "43.0.0.0/8", "49.0.0.0/8", "58.0.0.0/8", "59.0.0.0/8", "60.0.0.0/8"],
    ),
    (
        "New Zealand",
        &["49.0.0.0/8", "103.0.0.0/8", "110.0.0.0/8", "111.0.0.0/8", "114.0.0.0/8", "118.0.0.0/8"],
    ),
    (
        "South America",
        &[
            "177.0.0.0/8", "179.0.0.0/8", "181.0.0.0/8", "186.0.0.0/8", "187.0.0.0/8",
            "189.0.0.0/8", "190.0.0.0/8", "191.0.0.0/8", "200.0.0.0/8", "201.0.0.0/8",
        ],
    ),
    // Legacy address classes: A (1-127), B (128-191), C (192-223)
    (
        "North America",
        &["1.0.0.0/8", "2.0.0.0/7", "4.0.0.0/6", "8.0.0.0/5", "16.0.0.0/4", "32.0.0.0/3", "64.0.0.0/2"],
    ),
    ("Europe", &["128.0.0.0/2"]),
    ("Asia/Pacific", &["192.0.0.0/3"]),
];

/// The built-in rules as owned `(label, networks)` pairs, in match order.
pub fn builtin_rules() -> impl Iterator<Item = (String, Vec<String>)> {
    BUILTIN_RULES
        .iter()
        .map(|(label, networks)| (label.to_string(), networks.iter().map(|n| n.to_string()).collect()))
}

lazy_static! {
    static ref BUILTIN_TABLE: RegionTable = RegionTable::builtin_uncached();
}

#[derive(Debug, Error)]
pub enum RegionTableError {
    #[error("failed to read region table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode region table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid network {network:?} for region {label:?}: {reason}")]
    InvalidNetwork {
        label: String,
        network: String,
        reason: String,
    },
}

/// On-disk shape of a rule, e.g. `{"label": "Europe", "networks": ["185.0.0.0/8"]}`.
#[derive(Debug, Deserialize)]
struct RuleSpec {
    label: String,
    networks: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RegionRule {
    pub label: String,
    pub network: Ipv4Network,
}

#[derive(Debug, Clone)]
pub struct RegionTable {
    rules: Vec<RegionRule>,
}

impl RegionTable {
    /// Shared copy of the compiled-in table.
    pub fn builtin() -> &'static RegionTable {
        &BUILTIN_TABLE
    }

    /// Parse the built-in rules, reporting a bad entry instead of panicking.
    pub fn try_builtin() -> Result<Self, RegionTableError> {
        Self::from_rules(builtin_rules())
    }

    fn builtin_uncached() -> Self {
        // Compile-time table; startup goes through try_builtin first, so a bad
        // entry surfaces as a RegionTableError before this is ever forced.
        Self::try_builtin().expect("built-in region table must parse")
    }

    pub fn from_rules<I>(rules: I) -> Result<Self, RegionTableError>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut compiled = Vec::new();
        for (label, networks) in rules {
            for network in networks {
                let parsed = Ipv4Network::from_str(network.trim()).map_err(|e| {
                    RegionTableError::InvalidNetwork {
                        label: label.clone(),
                        network: network.clone(),
                        reason: e.to_string(),
                    }
                })?;
                compiled.push(RegionRule {
                    label: label.clone(),
                    network: parsed,
                });
            }
        }
        Ok(Self { rules: compiled })
    }

    pub fn from_json_str(json: &str) -> Result<Self, RegionTableError> {
        let specs: Vec<RuleSpec> = serde_json::from_str(json)?;
        Self::from_rules(specs.into_iter().map(|s| (s.label, s.networks)))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegionTableError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Region label for a host string. Anything that is not a dotted-quad
    /// IPv4 address is `Unknown`.
    pub fn classify(&self, host: &str) -> &str {
        match host.trim().parse::<Ipv4Addr>() {
            Ok(ip) => self.classify_ip(ip),
            Err(_) => UNKNOWN_REGION,
        }
    }

    pub fn classify_ip(&self, ip: Ipv4Addr) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.network.contains(ip))
            .map(|rule| rule.label.as_str())
            .unwrap_or(UNKNOWN_REGION)
    }

    /// Rules fully covered by a single earlier rule, so they never match.
    pub fn shadowed_rules(&self) -> Vec<&RegionRule> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(i, rule)| {
                self.rules[..*i].iter().any(|earlier| {
                    earlier.network.prefix() <= rule.network.prefix()
                        && earlier.network.contains(rule.network.network())
                })
            })
            .map(|(_, rule)| rule)
            .collect()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
