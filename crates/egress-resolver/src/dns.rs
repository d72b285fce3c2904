//! Single-domain resolution.

use std::sync::Arc;

use egress_core::{sort_cidrs, AddressFamily, Cidr, Fqdn};
use tracing::debug;

use crate::error::{LookupError, LookupResult};
use crate::lookup::NameLookup;
use crate::result::ResolutionResult;

/// Resolves one domain into host CIDRs through a [`NameLookup`]
#[derive(Clone)]
pub struct Resolver {
    lookup: Arc<dyn NameLookup>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver over the given lookup
    #[must_use]
    pub fn new(lookup: Arc<dyn NameLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve `domain` to sorted, de-duplicated host CIDRs.
    ///
    /// Invalid names fail with [`LookupError::InvalidDomain`] without
    /// touching the network.
    pub async fn resolve(&self, domain: &Fqdn, family: AddressFamily) -> LookupResult<Vec<Cidr>> {
        if !domain.is_valid() {
            return Err(LookupError::InvalidDomain(domain.to_string()));
        }

        let addresses = self.lookup.lookup_ip(family, domain.as_str()).await?;
        let mut cidrs: Vec<Cidr> = addresses.into_iter().map(Cidr::host).collect();
        sort_cidrs(&mut cidrs);

        debug!(domain = %domain, count = cidrs.len(), "resolved");
        Ok(cidrs)
    }

    /// Resolve `domain` into a per-domain result record
    pub async fn resolve_one(&self, domain: &Fqdn, family: AddressFamily) -> ResolutionResult {
        ResolutionResult::from_lookup(domain.clone(), self.resolve(domain, family).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::StaticLookup;
    use egress_core::ResolveStatus;
    use std::net::IpAddr;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_resolve_sorts_and_dedups() {
        let lookup = StaticLookup::new().with_addresses(
            "example.com",
            [ip("10.0.0.2"), ip("1.1.1.1"), ip("10.0.0.2")],
        );
        let resolver = Resolver::new(Arc::new(lookup));

        let cidrs = resolver
            .resolve(&Fqdn::from("example.com"), AddressFamily::Ipv4)
            .await
            .unwrap();
        let rendered: Vec<String> = cidrs.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1.1.1.1/32", "10.0.0.2/32"]);
    }

    #[tokio::test]
    async fn test_invalid_domain_skips_lookup() {
        let lookup = Arc::new(StaticLookup::new());
        let resolver = Resolver::new(lookup.clone());

        let result = resolver
            .resolve_one(&Fqdn::from("not_a domain"), AddressFamily::Ipv4)
            .await;
        assert_eq!(result.status, ResolveStatus::InvalidDomain);
        assert_eq!(result.message, "Received invalid FQDN 'not_a domain'");
        assert!(result.cidrs.is_empty());
        assert_eq!(lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_ipv6_hosts_use_128_prefix() {
        let lookup = StaticLookup::new().with_addresses("v6.example.com", [ip("2001:db8::1")]);
        let resolver = Resolver::new(Arc::new(lookup));

        let result = resolver
            .resolve_one(&Fqdn::from("v6.example.com"), AddressFamily::All)
            .await;
        assert_eq!(result.status, ResolveStatus::Success);
        assert_eq!(result.cidrs[0].to_string(), "2001:db8::1/128");
    }
}
