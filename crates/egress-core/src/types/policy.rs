use super::{AddressFamily, Fqdn, PortSpec};
use crate::error::EgressError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Maximum egress rules per policy
pub const MAX_EGRESS_RULES: usize = 30;
/// Maximum target domains per rule
pub const MAX_FQDNS_PER_RULE: usize = 50;
/// Maximum port entries per rule
pub const MAX_PORTS_PER_RULE: usize = 10;

/// Outbound traffic rule: the listed domains may be reached on the listed
/// ports.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgressRule {
    /// Domains to which traffic is allowed
    #[serde(rename = "toFQDNs")]
    pub to_fqdns: Vec<Fqdn>,

    /// Ports traffic is allowed on; empty allows all ports
    #[serde(default)]
    pub ports: Vec<PortSpec>,

    /// Overrides the policy-wide private address behavior for this rule
    #[serde(
        default,
        rename = "blockPrivateIPs",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_private_ips: Option<bool>,
}

impl EgressRule {
    /// Rule for the given domains on the given ports
    pub fn new<I, F>(domains: I, ports: Vec<PortSpec>) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fqdn>,
    {
        Self {
            to_fqdns: domains.into_iter().map(Into::into).collect(),
            ports,
            block_private_ips: None,
        }
    }

    /// Set the private address override
    #[must_use]
    pub const fn block_private_ips(mut self, block: bool) -> Self {
        self.block_private_ips = Some(block);
        self
    }

    /// Whether private blocks are dropped for this rule, given the
    /// policy-wide default
    #[must_use]
    pub fn blocks_private(&self, policy_default: bool) -> bool {
        self.block_private_ips.unwrap_or(policy_default)
    }
}

/// Desired state of an FQDN egress policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    /// Egress rules, in declaration order
    #[serde(default)]
    pub egress: Vec<EgressRule>,

    /// Omit private addresses unless a rule says otherwise
    #[serde(default, rename = "blockPrivateIPs")]
    pub block_private_ips: bool,

    /// Address families to resolve
    #[serde(default)]
    pub enabled_network_type: AddressFamily,

    /// Per-lookup timeout (seconds)
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout_seconds: u32,

    /// Grace window before stale addresses are dropped (seconds)
    #[serde(default = "default_retry_timeout")]
    pub retry_timeout_seconds: u32,

    /// Re-resolution interval (seconds)
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u32,
}

impl Default for PolicySpec {
    fn default() -> Self {
        Self {
            egress: Vec::new(),
            block_private_ips: false,
            enabled_network_type: AddressFamily::default(),
            resolve_timeout_seconds: default_resolve_timeout(),
            retry_timeout_seconds: default_retry_timeout(),
            ttl_seconds: default_ttl(),
        }
    }
}

impl PolicySpec {
    /// All unique domains named by any rule, sorted
    #[must_use]
    pub fn fqdns(&self) -> Vec<Fqdn> {
        self.egress
            .iter()
            .flat_map(|rule| rule.to_fqdns.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Per-lookup timeout
    #[must_use]
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.resolve_timeout_seconds))
    }

    /// Grace window for transient failures
    #[must_use]
    pub fn retry_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.retry_timeout_seconds))
    }

    /// Interval between reconciliations
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_seconds))
    }

    /// Check ranges and limits
    pub fn validate(&self) -> crate::Result<()> {
        if !(1..=60).contains(&self.resolve_timeout_seconds) {
            return Err(EgressError::config(format!(
                "resolveTimeoutSeconds must be between 1 and 60, got {}",
                self.resolve_timeout_seconds
            )));
        }
        if self.retry_timeout_seconds > 86_400 {
            return Err(EgressError::config(format!(
                "retryTimeoutSeconds must be at most 86400, got {}",
                self.retry_timeout_seconds
            )));
        }
        if !(5..=1800).contains(&self.ttl_seconds) {
            return Err(EgressError::config(format!(
                "ttlSeconds must be between 5 and 1800, got {}",
                self.ttl_seconds
            )));
        }
        if self.ttl_seconds <= self.resolve_timeout_seconds {
            return Err(EgressError::config(
                "ttlSeconds must be greater than resolveTimeoutSeconds",
            ));
        }
        if self.egress.len() > MAX_EGRESS_RULES {
            return Err(EgressError::config(format!(
                "at most {MAX_EGRESS_RULES} egress rules are allowed, got {}",
                self.egress.len()
            )));
        }
        for (index, rule) in self.egress.iter().enumerate() {
            if rule.to_fqdns.len() > MAX_FQDNS_PER_RULE {
                return Err(EgressError::config(format!(
                    "egress[{index}]: at most {MAX_FQDNS_PER_RULE} FQDNs are allowed"
                )));
            }
            if rule.ports.len() > MAX_PORTS_PER_RULE {
                return Err(EgressError::config(format!(
                    "egress[{index}]: at most {MAX_PORTS_PER_RULE} ports are allowed"
                )));
            }
            for port in &rule.ports {
                port.validate()?;
            }
        }
        Ok(())
    }
}

// Default value functions for serde.
const fn default_resolve_timeout() -> u32 {
    3
}

const fn default_retry_timeout() -> u32 {
    3600
}

const fn default_ttl() -> u32 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let spec: PolicySpec = serde_json::from_str(r#"{"egress": []}"#).unwrap();
        assert_eq!(spec, PolicySpec::default());
        assert_eq!(spec.enabled_network_type, AddressFamily::Ipv4);
        assert_eq!(spec.resolve_timeout(), Duration::from_secs(3));
        assert_eq!(spec.retry_timeout(), Duration::from_secs(3600));
        assert_eq!(spec.ttl(), Duration::from_secs(60));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_deserialize_rule() {
        let spec: PolicySpec = serde_json::from_str(
            r#"{
                "egress": [{
                    "toFQDNs": ["api.example.com"],
                    "ports": [{"protocol": "UDP", "port": 53}, {"port": 443}],
                    "blockPrivateIPs": false
                }],
                "blockPrivateIPs": true,
                "enabledNetworkType": "all"
            }"#,
        )
        .unwrap();
        let rule = &spec.egress[0];
        assert_eq!(rule.to_fqdns, vec![Fqdn::from("api.example.com")]);
        assert_eq!(rule.ports, vec![PortSpec::udp(53), PortSpec::tcp(443)]);
        assert!(!rule.blocks_private(spec.block_private_ips));
        assert_eq!(spec.enabled_network_type, AddressFamily::All);
    }

    #[test]
    fn test_fqdns_unique_and_sorted() {
        let spec = PolicySpec {
            egress: vec![
                EgressRule::new(["b.example.com", "a.example.com"], vec![]),
                EgressRule::new(["a.example.com", "c.example.com"], vec![PortSpec::tcp(443)]),
            ],
            ..PolicySpec::default()
        };
        let names: Vec<String> = spec.fqdns().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["a.example.com", "b.example.com", "c.example.com"]);
    }

    #[test]
    fn test_rule_override() {
        let rule = EgressRule::new(["example.com"], vec![]);
        assert!(rule.blocks_private(true));
        assert!(!rule.clone().block_private_ips(false).blocks_private(true));
        assert!(rule.block_private_ips(true).blocks_private(false));
    }

    #[test_case(0, 3600, 60 ; "resolve timeout too small")]
    #[test_case(61, 3600, 600 ; "resolve timeout too large")]
    #[test_case(3, 86_401, 60 ; "retry timeout too large")]
    #[test_case(3, 3600, 4 ; "ttl too small")]
    #[test_case(3, 3600, 1801 ; "ttl too large")]
    #[test_case(10, 3600, 10 ; "ttl not above resolve timeout")]
    fn test_invalid_timing(resolve: u32, retry: u32, ttl: u32) {
        let spec = PolicySpec {
            resolve_timeout_seconds: resolve,
            retry_timeout_seconds: retry,
            ttl_seconds: ttl,
            ..PolicySpec::default()
        };
        let err = spec.validate().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_too_many_rules() {
        let spec = PolicySpec {
            egress: vec![EgressRule::new(["example.com"], vec![]); MAX_EGRESS_RULES + 1],
            ..PolicySpec::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_port_zero_fails_validation() {
        let spec = PolicySpec {
            egress: vec![EgressRule::new(
                ["example.com"],
                vec![PortSpec {
                    port: Some(0),
                    ..PortSpec::default()
                }],
            )],
            ..PolicySpec::default()
        };
        assert!(spec.validate().is_err());
    }
}
