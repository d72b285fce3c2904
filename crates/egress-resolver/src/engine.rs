//! Bounded concurrent resolution of many domains.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use egress_core::{AddressFamily, EgressError, Fqdn};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, instrument};

use crate::cancel::CancelToken;
use crate::dns::Resolver;
use crate::error::LookupError;
use crate::lookup::{HickoryLookup, LookupConfig, NameLookup};
use crate::result::{ResolutionResult, ResolutionResults};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum lookups in flight at once
    pub max_concurrent: usize,
    /// Settings for the DNS-backed lookup
    pub lookup: LookupConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            lookup: LookupConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Set the concurrency bound
    #[must_use]
    pub const fn max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Query these nameservers instead of the system configuration
    #[must_use]
    pub fn nameservers(mut self, nameservers: Vec<SocketAddr>) -> Self {
        self.lookup = self.lookup.nameservers(nameservers);
        self
    }

    /// Set attempts per query
    #[must_use]
    pub const fn attempts(mut self, attempts: usize) -> Self {
        self.lookup.attempts = attempts;
        self
    }

    /// Set the response cache size
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.lookup.cache_size = size;
        self
    }
}

/// Resolves many domains concurrently behind an admission gate.
///
/// Every domain gets its own task. A task waits for a gate slot, runs one
/// lookup under the per-lookup deadline, releases the slot and hands its
/// result to the collector. All three waits give way to the caller's
/// [`CancelToken`]; a domain whose task is cancelled contributes no result.
#[derive(Debug, Clone)]
pub struct ResolveEngine {
    resolver: Resolver,
    max_concurrent: usize,
}

impl ResolveEngine {
    /// Create an engine over `lookup` allowing `max_concurrent` lookups in
    /// flight. A zero bound is rejected.
    pub fn new(lookup: Arc<dyn NameLookup>, max_concurrent: usize) -> egress_core::Result<Self> {
        if max_concurrent == 0 {
            return Err(EgressError::config("max concurrent resolves must be greater than 0"));
        }
        Ok(Self {
            resolver: Resolver::new(lookup),
            max_concurrent,
        })
    }

    /// Create an engine backed by DNS
    pub fn from_config(config: &EngineConfig) -> egress_core::Result<Self> {
        let lookup = HickoryLookup::new(&config.lookup)
            .map_err(|e| EgressError::config(e.to_string()))?;
        Self::new(Arc::new(lookup), config.max_concurrent)
    }

    /// Concurrency bound
    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Resolve every domain, returning results in arrival order.
    ///
    /// Completes once every task has either delivered a result or given up
    /// because `cancel` fired.
    #[instrument(skip(self, domains, cancel), fields(domains = domains.len(), max = self.max_concurrent))]
    pub async fn resolve_all(
        &self,
        domains: &[Fqdn],
        timeout: Duration,
        family: AddressFamily,
        cancel: &CancelToken,
    ) -> ResolutionResults {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, mut rx) = mpsc::channel(self.max_concurrent);

        for domain in domains {
            let semaphore = semaphore.clone();
            let resolver = self.resolver.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();
            let domain = domain.clone();

            tokio::spawn(async move {
                let permit = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!(domain = %domain, "cancelled before admission");
                        return;
                    }
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return,
                    },
                };

                let outcome = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!(domain = %domain, "cancelled during lookup");
                        return;
                    }
                    outcome = tokio::time::timeout(timeout, resolver.resolve(&domain, family)) => {
                        outcome.unwrap_or(Err(LookupError::Timeout))
                    }
                };
                drop(permit);

                let result = ResolutionResult::from_lookup(domain, outcome);
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    _ = tx.send(result) => {}
                }
            });
        }
        drop(tx);

        let mut results = ResolutionResults::default();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }

        debug!(
            resolved = results.len(),
            skipped = domains.len() - results.len(),
            "resolution run complete"
        );
        results
    }
}
