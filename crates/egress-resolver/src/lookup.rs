//! Name-lookup capability used by the resolver.
//!
//! [`NameLookup`] is the seam between resolution logic and the network:
//! [`HickoryLookup`] talks to real DNS servers, [`StaticLookup`] answers
//! from a canned table without any I/O.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use egress_core::AddressFamily;
use hickory_resolver::config::{LookupIpStrategy, NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::{ResolveError, Resolver, TokioResolver};
use tracing::debug;

use crate::error::{LookupError, LookupResult};

/// Resolves a host name to IP addresses of the requested family.
///
/// Implementations must be cancel-safe: the caller abandons the returned
/// future when its deadline passes.
#[async_trait]
pub trait NameLookup: Send + Sync {
    /// Look up `host`, returning only addresses of `family`
    async fn lookup_ip(&self, family: AddressFamily, host: &str) -> LookupResult<Vec<IpAddr>>;
}

/// Lookup settings for the DNS-backed implementation
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Nameservers to query; empty uses the system configuration
    pub nameservers: Vec<SocketAddr>,

    /// Attempts per query before giving up
    pub attempts: usize,

    /// Number of cached responses
    pub cache_size: usize,

    /// Timeout for each individual DNS request
    pub request_timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            nameservers: Vec::new(),
            attempts: 2,
            cache_size: 256,
            request_timeout: Duration::from_secs(3),
        }
    }
}

impl LookupConfig {
    /// Use specific nameservers instead of the system configuration
    #[must_use]
    pub fn nameservers(mut self, nameservers: Vec<SocketAddr>) -> Self {
        self.nameservers = nameservers;
        self
    }

    /// Set attempts per query
    #[must_use]
    pub const fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the response cache size
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn resolver_opts(&self) -> ResolverOpts {
        let mut opts = ResolverOpts::default();
        opts.attempts = self.attempts;
        opts.cache_size = self.cache_size;
        opts.timeout = self.request_timeout;
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        opts
    }
}

/// DNS-backed lookup using hickory
#[derive(Clone)]
pub struct HickoryLookup {
    resolver: TokioResolver,
}

impl HickoryLookup {
    /// Build a lookup from the given settings
    pub fn new(config: &LookupConfig) -> LookupResult<Self> {
        let opts = config.resolver_opts();
        let resolver = if config.nameservers.is_empty() {
            TokioResolver::builder_tokio()
                .map_err(|e| LookupError::Other(format!("failed to create resolver: {e}")))?
                .with_options(opts)
                .build()
        } else {
            let mut resolver_config = ResolverConfig::new();
            for addr in &config.nameservers {
                resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Udp));
                resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Tcp));
            }
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .with_options(opts)
                .build()
        };
        Ok(Self { resolver })
    }
}

#[async_trait]
impl NameLookup for HickoryLookup {
    async fn lookup_ip(&self, family: AddressFamily, host: &str) -> LookupResult<Vec<IpAddr>> {
        debug!(host, network = family.resolver_token(), "DNS lookup");
        let addresses = match family {
            AddressFamily::All => self
                .resolver
                .lookup_ip(host)
                .await
                .map_err(|e| classify(&e))?
                .iter()
                .collect(),
            AddressFamily::Ipv4 => self
                .resolver
                .ipv4_lookup(host)
                .await
                .map_err(|e| classify(&e))?
                .iter()
                .map(|a| IpAddr::V4(a.0))
                .collect(),
            AddressFamily::Ipv6 => self
                .resolver
                .ipv6_lookup(host)
                .await
                .map_err(|e| classify(&e))?
                .iter()
                .map(|aaaa| IpAddr::V6(aaaa.0))
                .collect(),
        };
        Ok(addresses)
    }
}

/// Sort a hickory failure into the lookup taxonomy
fn classify(err: &ResolveError) -> LookupError {
    let Some(proto) = err.proto() else {
        return LookupError::Other(err.to_string());
    };
    match proto.kind() {
        ProtoErrorKind::NoRecordsFound { response_code, .. }
            if *response_code == ResponseCode::ServFail =>
        {
            LookupError::Temporary(err.to_string())
        }
        ProtoErrorKind::NoRecordsFound { .. } => LookupError::NotFound,
        ProtoErrorKind::Timeout => LookupError::Timeout,
        ProtoErrorKind::Io(_) | ProtoErrorKind::Busy => LookupError::Temporary(err.to_string()),
        _ => LookupError::Other(err.to_string()),
    }
}

/// Canned lookup table for tests and dry runs.
///
/// Answers are filtered by the requested family, so a host configured
/// with both IPv4 and IPv6 addresses behaves like a dual-stack name.
/// Unknown hosts answer [`LookupError::NotFound`].
#[derive(Debug, Default)]
pub struct StaticLookup {
    answers: HashMap<String, LookupResult<Vec<IpAddr>>>,
    calls: AtomicUsize,
}

impl StaticLookup {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `host` with the given addresses
    #[must_use]
    pub fn with_addresses<I>(mut self, host: &str, addresses: I) -> Self
    where
        I: IntoIterator<Item = IpAddr>,
    {
        self.answers
            .insert(host.to_string(), Ok(addresses.into_iter().collect()));
        self
    }

    /// Answer `host` with an error
    #[must_use]
    pub fn with_error(mut self, host: &str, error: LookupError) -> Self {
        self.answers.insert(host.to_string(), Err(error));
        self
    }

    /// Number of lookups performed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameLookup for StaticLookup {
    async fn lookup_ip(&self, family: AddressFamily, host: &str) -> LookupResult<Vec<IpAddr>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .answers
            .get(host)
            .cloned()
            .unwrap_or(Err(LookupError::NotFound))?;
        Ok(answer
            .into_iter()
            .filter(|ip| match family {
                AddressFamily::All => true,
                AddressFamily::Ipv4 => ip.is_ipv4(),
                AddressFamily::Ipv6 => ip.is_ipv6(),
            })
            .collect())
    }
}
