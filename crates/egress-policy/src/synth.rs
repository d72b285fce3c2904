//! Egress rule synthesis.
//!
//! Tracked addresses are turned into peers per rule, filtered by the private
//! address policy, then merged so that every distinct port set appears in
//! exactly one output rule. Output is fully ordered: rules by port-set key,
//! peers by canonical CIDR string, ports by token.

use std::collections::{BTreeMap, BTreeSet};

use egress_core::{Cidr, EgressRule, Fqdn, FqdnStatus, PolicySpec, PortSpec};
use serde::Serialize;

/// Port-set key for a rule without port restrictions
pub const ALL_PORTS: &str = "all-ports";

/// One merged egress rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedRule {
    /// Canonical port list, sorted by token; empty allows all ports
    pub ports: Vec<PortSpec>,
    /// Allowed destinations, sorted and unique
    pub to: Vec<Cidr>,
}

impl SynthesizedRule {
    /// Port-set key of this rule
    #[must_use]
    pub fn key(&self) -> String {
        port_set_key(&self.ports)
    }
}

/// Minimal, deterministically ordered egress rule set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EgressPolicy {
    /// Rules ordered by port-set key
    pub egress: Vec<SynthesizedRule>,
}

impl EgressPolicy {
    /// Returns true if no rule survived synthesis (deny-all)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.egress.is_empty()
    }

    /// Every distinct CIDR across all rules, sorted
    #[must_use]
    pub fn unique_cidrs(&self) -> Vec<Cidr> {
        self.egress
            .iter()
            .flat_map(|rule| rule.to.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Canonical fingerprint of a port set.
///
/// Tokens are `PROTOCOL:port` (or `PROTOCOL:any`), sorted, de-duplicated
/// and comma-joined; an empty set maps to [`ALL_PORTS`].
#[must_use]
pub fn port_set_key(ports: &[PortSpec]) -> String {
    if ports.is_empty() {
        return ALL_PORTS.to_string();
    }
    let tokens: BTreeSet<String> = ports.iter().map(PortSpec::token).collect();
    tokens.into_iter().collect::<Vec<_>>().join(",")
}

/// Ports sorted by token with duplicates removed
fn canonical_ports(ports: &[PortSpec]) -> Vec<PortSpec> {
    let by_token: BTreeMap<String, PortSpec> = ports
        .iter()
        .map(|port| (port.token(), *port))
        .collect();
    by_token.into_values().collect()
}

/// Addresses a rule grants, after private filtering, sorted by CIDR
#[must_use]
pub fn candidate_peers(
    rule: &EgressRule,
    statuses: &BTreeMap<&Fqdn, &FqdnStatus>,
    block_private_default: bool,
) -> Vec<Cidr> {
    let block_private = rule.blocks_private(block_private_default);
    let mut peers: Vec<Cidr> = rule
        .to_fqdns
        .iter()
        .filter_map(|fqdn| statuses.get(fqdn))
        .flat_map(|status| status.addresses.iter().copied())
        .filter(|cidr| !(block_private && cidr.is_private()))
        .collect();
    peers.sort();
    peers
}

/// Build the merged rule set for `spec` from tracked statuses.
///
/// Returns `None` when the policy names no egress rules at all. A policy
/// whose rules all come up without peers yields an empty [`EgressPolicy`].
#[must_use]
pub fn synthesize(spec: &PolicySpec, statuses: &[FqdnStatus]) -> Option<EgressPolicy> {
    if spec.egress.is_empty() {
        return None;
    }

    let lookup: BTreeMap<&Fqdn, &FqdnStatus> =
        statuses.iter().map(|status| (&status.fqdn, status)).collect();

    let mut groups: BTreeMap<String, (Vec<PortSpec>, BTreeSet<Cidr>)> = BTreeMap::new();
    for rule in &spec.egress {
        let peers = candidate_peers(rule, &lookup, spec.block_private_ips);
        if peers.is_empty() {
            continue;
        }
        let (_, to) = groups
            .entry(port_set_key(&rule.ports))
            .or_insert_with(|| (canonical_ports(&rule.ports), BTreeSet::new()));
        to.extend(peers);
    }

    let egress = groups
        .into_values()
        .map(|(ports, to)| SynthesizedRule {
            ports,
            to: to.into_iter().collect(),
        })
        .collect();
    Some(EgressPolicy { egress })
}
