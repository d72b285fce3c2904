//! Merging resolution results into persisted per-domain status.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use egress_core::util::format_duration;
use egress_core::{Fqdn, FqdnStatus};
use egress_resolver::ResolutionResults;
use tracing::warn;

/// Status table after one tracking pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedStatuses {
    /// Updated statuses, sorted by domain
    pub statuses: Vec<FqdnStatus>,
    /// Domains whose addresses were cleared during this pass, sorted
    pub cleared: Vec<Fqdn>,
}

/// Merge `results` into the `previous` status table.
///
/// Known domains go through [`FqdnStatus::update`]; first-seen domains get a
/// fresh status. Entries without a result this pass are carried forward
/// unchanged. Every clear is logged as a warning since it narrows effective
/// network access.
pub fn update_statuses(
    previous: &[FqdnStatus],
    results: &ResolutionResults,
    retry_timeout: Duration,
    now: DateTime<Utc>,
) -> TrackedStatuses {
    let mut table: BTreeMap<Fqdn, FqdnStatus> = previous
        .iter()
        .map(|status| (status.fqdn.clone(), status.clone()))
        .collect();
    let mut cleared = Vec::new();

    for result in results {
        match table.get_mut(&result.domain) {
            Some(status) => {
                let was_cleared = status.update(
                    &result.cidrs,
                    result.status,
                    result.message.as_str(),
                    retry_timeout,
                    now,
                );
                if was_cleared {
                    warn!(
                        domain = %status.fqdn,
                        status = %status.resolve_reason,
                        "IP addresses of FQDN {} removed after being stale for {}. \
                         Resolve status at removal time was {} (for {}). \
                         Last successful resolve time was {} ago.",
                        status.fqdn,
                        format_duration(retry_timeout),
                        status.resolve_reason,
                        format_duration(status.since_transition(now)),
                        format_duration(status.since_success(now)),
                    );
                    cleared.push(status.fqdn.clone());
                }
            }
            None => {
                table.insert(
                    result.domain.clone(),
                    FqdnStatus::new(
                        result.domain.clone(),
                        &result.cidrs,
                        result.status,
                        result.message.as_str(),
                        now,
                    ),
                );
            }
        }
    }

    cleared.sort();
    TrackedStatuses {
        statuses: table.into_values().collect(),
        cleared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use egress_core::{Cidr, ResolveStatus};
    use egress_resolver::{LookupError, ResolutionResult};
    use pretty_assertions::assert_eq;

    const HOUR: Duration = Duration::from_secs(3600);

    fn cidrs(list: &[&str]) -> Vec<Cidr> {
        list.iter().map(|c| c.parse().unwrap()).collect()
    }

    fn known(domain: &str, addresses: &[&str], last_success: DateTime<Utc>) -> FqdnStatus {
        FqdnStatus::new(
            Fqdn::from(domain),
            &cidrs(addresses),
            ResolveStatus::Success,
            "Resolve succeeded",
            last_success,
        )
    }

    fn failure(domain: &str, err: LookupError) -> ResolutionResult {
        ResolutionResult::from_lookup(Fqdn::from(domain), Err(err))
    }

    #[test]
    fn test_new_domain_gets_fresh_status() {
        let now = Utc::now();
        let results = ResolutionResults::new(vec![ResolutionResult::success(
            Fqdn::from("api.example.com"),
            cidrs(&["1.1.1.1/32"]),
        )]);

        let tracked = update_statuses(&[], &results, HOUR, now);

        assert_eq!(tracked.statuses.len(), 1);
        let status = &tracked.statuses[0];
        assert_eq!(status.addresses, cidrs(&["1.1.1.1/32"]));
        assert_eq!(status.last_successful_time, now);
        assert_eq!(status.last_transition_time, now);
        assert!(tracked.cleared.is_empty());
    }

    #[test]
    fn test_transient_failure_within_grace_keeps_addresses() {
        let now = Utc::now();
        let previous = vec![known("api.example.com", &["1.1.1.1/32"], now - TimeDelta::seconds(10))];
        let results = ResolutionResults::new(vec![failure(
            "api.example.com",
            LookupError::Temporary("servfail".into()),
        )]);

        let tracked = update_statuses(&previous, &results, HOUR, now);

        let status = &tracked.statuses[0];
        assert_eq!(status.addresses, cidrs(&["1.1.1.1/32"]));
        assert_eq!(status.resolve_reason, ResolveStatus::TemporaryError);
        assert_eq!(status.last_transition_time, now);
        assert!(tracked.cleared.is_empty());
    }

    #[test]
    fn test_transient_failure_after_grace_clears() {
        let now = Utc::now();
        let previous = vec![known("api.example.com", &["1.1.1.1/32"], now - TimeDelta::seconds(3601))];
        let results = ResolutionResults::new(vec![failure("api.example.com", LookupError::Timeout)]);

        let tracked = update_statuses(&previous, &results, HOUR, now);

        assert!(tracked.statuses[0].addresses.is_empty());
        assert_eq!(tracked.cleared, vec![Fqdn::from("api.example.com")]);
    }

    #[test]
    fn test_permanent_failure_clears_immediately() {
        let now = Utc::now();
        let previous = vec![known("gone.example.com", &["1.1.1.1/32"], now)];
        let results = ResolutionResults::new(vec![failure("gone.example.com", LookupError::NotFound)]);

        let tracked = update_statuses(&previous, &results, HOUR, now);

        let status = &tracked.statuses[0];
        assert!(status.addresses.is_empty());
        assert_eq!(status.resolve_reason, ResolveStatus::DomainNotFound);
        assert_eq!(status.resolve_message, "Domain not found");
        assert_eq!(tracked.cleared, vec![Fqdn::from("gone.example.com")]);
    }

    #[test]
    fn test_domains_without_result_are_carried_forward() {
        let now = Utc::now();
        let earlier = now - TimeDelta::seconds(30);
        let previous = vec![
            known("b.example.com", &["2.2.2.2/32"], earlier),
            known("a.example.com", &["1.1.1.1/32"], earlier),
        ];
        let results = ResolutionResults::new(vec![ResolutionResult::success(
            Fqdn::from("a.example.com"),
            cidrs(&["1.1.1.2/32"]),
        )]);

        let tracked = update_statuses(&previous, &results, HOUR, now);

        let domains: Vec<&str> = tracked.statuses.iter().map(|s| s.fqdn.as_str()).collect();
        assert_eq!(domains, vec!["a.example.com", "b.example.com"]);
        assert_eq!(tracked.statuses[0].addresses, cidrs(&["1.1.1.2/32"]));
        assert_eq!(tracked.statuses[1], previous[0]);
    }
}
