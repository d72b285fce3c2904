use crate::error::EgressError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::net::IpAddr;
use std::str::FromStr;

/// An IP address plus prefix length (e.g. `93.184.216.34/32`).
///
/// Resolution always produces host blocks (`/32` for IPv4, `/128` for
/// IPv6); wider blocks can be parsed from user input. The address is kept
/// as given and not masked to its network.
///
/// Ordering is lexicographic on the canonical `ip/prefix` string so that
/// every list of blocks sorts identically regardless of where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    ip: IpAddr,
    prefix: u8,
}

impl Cidr {
    /// Build a block, rejecting prefixes longer than the address family allows
    pub fn new(ip: IpAddr, prefix: u8) -> crate::Result<Self> {
        let max = Self::max_prefix(ip);
        if prefix > max {
            return Err(EgressError::InvalidCidr(format!(
                "{ip}/{prefix}: prefix exceeds {max}"
            )));
        }
        Ok(Self { ip, prefix })
    }

    /// Build a single-host block (`/32` or `/128`).
    ///
    /// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) become IPv4 blocks.
    #[must_use]
    pub fn host(ip: IpAddr) -> Self {
        let ip = ip.to_canonical();
        Self {
            ip,
            prefix: Self::max_prefix(ip),
        }
    }

    const fn max_prefix(ip: IpAddr) -> u8 {
        match ip {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }

    /// The address part
    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.ip
    }

    /// The prefix length
    #[must_use]
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Returns true for RFC 1918 IPv4 space, including its IPv4-mapped
    /// IPv6 form, and IPv6 unique local addresses (`fc00::/7`).
    #[must_use]
    pub fn is_private(&self) -> bool {
        match self.ip {
            IpAddr::V4(v4) => v4.is_private(),
            IpAddr::V6(v6) => {
                v6.to_ipv4_mapped().is_some_and(|v4| v4.is_private())
                    || (v6.segments()[0] & 0xfe00) == 0xfc00
            }
        }
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix)
    }
}

impl FromStr for Cidr {
    type Err = EgressError;

    /// Parses `ip/prefix`; a bare address is treated as a host block.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((ip, prefix)) => {
                let ip: IpAddr = ip
                    .parse()
                    .map_err(|_| EgressError::InvalidCidr(s.to_string()))?;
                let prefix: u8 = prefix
                    .parse()
                    .map_err(|_| EgressError::InvalidCidr(s.to_string()))?;
                Self::new(ip, prefix)
            }
            None => s
                .parse()
                .map(Self::host)
                .map_err(|_| EgressError::InvalidCidr(s.to_string())),
        }
    }
}

impl From<IpAddr> for Cidr {
    fn from(ip: IpAddr) -> Self {
        Self::host(ip)
    }
}

impl Ord for Cidr {
    fn cmp(&self, other: &Self) -> Ordering {
        Canonical::of(self).as_bytes().cmp(Canonical::of(other).as_bytes())
    }
}

/// Canonical form rendered into a stack buffer, for comparisons.
///
/// Textual IPv6 is at most 45 bytes, plus `/128`.
struct Canonical {
    buf: [u8; 64],
    len: usize,
}

impl Canonical {
    fn of(cidr: &Cidr) -> Self {
        let mut canonical = Self {
            buf: [0; 64],
            len: 0,
        };
        // Cannot overflow the buffer
        let _ = write!(canonical, "{cidr}");
        canonical
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl fmt::Write for Canonical {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        self.buf
            .get_mut(self.len..end)
            .ok_or(fmt::Error)?
            .copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

impl PartialOrd for Cidr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Sort blocks ascending by canonical string form and drop duplicates
pub fn sort_cidrs(cidrs: &mut Vec<Cidr>) {
    cidrs.sort();
    cidrs.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_prefix_by_family() {
        let v4 = Cidr::host("93.184.216.34".parse().unwrap());
        let v6 = Cidr::host("2606:2800:220:1::1".parse().unwrap());
        assert_eq!(v4.to_string(), "93.184.216.34/32");
        assert_eq!(v6.to_string(), "2606:2800:220:1::1/128");
    }

    #[test]
    fn test_parse() {
        let cidr: Cidr = "10.0.0.0/8".parse().unwrap();
        assert_eq!(cidr.prefix(), 8);
        assert_eq!(cidr.to_string(), "10.0.0.0/8");

        let bare: Cidr = "1.1.1.1".parse().unwrap();
        assert_eq!(bare.prefix(), 32);

        assert!("1.1.1.1/33".parse::<Cidr>().is_err());
        assert!("not-an-ip/8".parse::<Cidr>().is_err());
        assert!("10.0.0.0/abc".parse::<Cidr>().is_err());
    }

    #[test]
    fn test_is_private() {
        for private in ["10.0.0.5", "172.16.3.4", "192.168.1.1", "fd00::1", "fc12::7"] {
            let cidr: Cidr = private.parse().unwrap();
            assert!(cidr.is_private(), "{private} should be private");
        }
        for public in ["8.8.8.8", "172.32.0.1", "2001:4860:4860::8888", "fe80::1"] {
            let cidr: Cidr = public.parse().unwrap();
            assert!(!cidr.is_private(), "{public} should be public");
        }
    }

    #[test]
    fn test_mapped_ipv4_host_is_canonical() {
        let mapped = Cidr::host("::ffff:10.0.0.5".parse().unwrap());
        assert_eq!(mapped.to_string(), "10.0.0.5/32");
        assert!(mapped.is_private());

        let bare: Cidr = "::ffff:93.184.216.34".parse().unwrap();
        assert_eq!(bare.to_string(), "93.184.216.34/32");
        assert!(!bare.is_private());
    }

    #[test]
    fn test_mapped_ipv4_block_is_private() {
        let block: Cidr = "::ffff:192.168.0.0/120".parse().unwrap();
        assert_eq!(block.prefix(), 120);
        assert!(block.is_private());

        let public: Cidr = "::ffff:8.8.8.0/120".parse().unwrap();
        assert!(!public.is_private());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut cidrs: Vec<Cidr> = ["9.9.9.9", "10.0.0.1", "10.0.0.1", "1.2.3.4"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        sort_cidrs(&mut cidrs);
        let rendered: Vec<String> = cidrs.iter().map(ToString::to_string).collect();
        // "10..." sorts before "9..." as strings
        assert_eq!(rendered, vec!["1.2.3.4/32", "10.0.0.1/32", "9.9.9.9/32"]);
    }

    #[test]
    fn test_ordering_matches_display() {
        let widest: Cidr = "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff/128".parse().unwrap();
        let cidrs: Vec<Cidr> = ["2001:db8::1/128", "10.0.0.0/8", "fd00::/8", "1.1.1.1/32"]
            .iter()
            .map(|s| s.parse().unwrap())
            .chain([widest])
            .collect();
        for a in &cidrs {
            for b in &cidrs {
                assert_eq!(a.cmp(b), a.to_string().cmp(&b.to_string()), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_serde_as_string() {
        let cidr: Cidr = "192.0.2.1/32".parse().unwrap();
        let json = serde_json::to_string(&cidr).unwrap();
        assert_eq!(json, "\"192.0.2.1/32\"");
        let back: Cidr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cidr);
    }
}
