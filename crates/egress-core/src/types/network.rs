use crate::error::EgressError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which address families to resolve and allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// Both IPv4 and IPv6
    All,
    /// IPv4 only
    #[default]
    Ipv4,
    /// IPv6 only
    Ipv6,
}

impl AddressFamily {
    /// Network token handed to the name-lookup capability
    #[must_use]
    pub const fn resolver_token(self) -> &'static str {
        match self {
            Self::All => "ip",
            Self::Ipv4 => "ip4",
            Self::Ipv6 => "ip6",
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Ipv4 => write!(f, "ipv4"),
            Self::Ipv6 => write!(f, "ipv6"),
        }
    }
}

impl FromStr for AddressFamily {
    type Err = EgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "ip" => Ok(Self::All),
            "ipv4" | "ip4" => Ok(Self::Ipv4),
            "ipv6" | "ip6" => Ok(Self::Ipv6),
            _ => Err(EgressError::InvalidNetworkType(s.to_string())),
        }
    }
}

/// Transport protocol of an allowed port
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// TCP protocol
    #[default]
    Tcp,
    /// UDP protocol
    Udp,
    /// SCTP protocol
    Sctp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
            Self::Sctp => write!(f, "SCTP"),
        }
    }
}

/// One allowed `protocol:port` pair. A missing port allows every port of
/// the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PortSpec {
    /// Transport protocol (defaults to TCP)
    #[serde(default)]
    pub protocol: Protocol,

    /// Port number, 1-65535
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl PortSpec {
    /// A TCP port
    #[must_use]
    pub const fn tcp(port: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            port: Some(port),
        }
    }

    /// A UDP port
    #[must_use]
    pub const fn udp(port: u16) -> Self {
        Self {
            protocol: Protocol::Udp,
            port: Some(port),
        }
    }

    /// Canonical `PROTOCOL:port` token, with `any` for an unrestricted port
    #[must_use]
    pub fn token(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{port}", self.protocol),
            None => format!("{}:any", self.protocol),
        }
    }

    /// Reject port zero
    pub fn validate(&self) -> crate::Result<()> {
        if self.port == Some(0) {
            return Err(EgressError::InvalidPort(format!(
                "{}: port must be between 1 and 65535",
                self.token()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for PortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token())
    }
}
