//! Per-domain resolution results and their aggregation.

use std::collections::BTreeMap;

use egress_core::{Cidr, Fqdn, ResolveStatus};

use crate::error::LookupResult;

/// Message recorded for a successful lookup
pub const SUCCESS_MESSAGE: &str = "Resolve succeeded";

/// Outcome of resolving one domain in one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// Domain that was resolved
    pub domain: Fqdn,
    /// Outcome classification
    pub status: ResolveStatus,
    /// Human-readable message
    pub message: String,
    /// Sorted host CIDRs; empty on error
    pub cidrs: Vec<Cidr>,
}

impl ResolutionResult {
    /// Successful result with the given (already sorted) CIDRs
    #[must_use]
    pub fn success(domain: Fqdn, cidrs: Vec<Cidr>) -> Self {
        Self {
            domain,
            status: ResolveStatus::Success,
            message: SUCCESS_MESSAGE.to_string(),
            cidrs,
        }
    }

    /// Build a result from a resolver outcome
    #[must_use]
    pub fn from_lookup(domain: Fqdn, outcome: LookupResult<Vec<Cidr>>) -> Self {
        match outcome {
            Ok(cidrs) => Self::success(domain, cidrs),
            Err(err) => Self {
                domain,
                status: err.status(),
                message: err.message(),
                cidrs: Vec::new(),
            },
        }
    }
}

/// Results of a resolution run, in arrival order.
///
/// Arrival order is not meaningful; use [`ResolutionResults::sorted`] or
/// [`ResolutionResults::lookup_table`] before depending on order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResults(Vec<ResolutionResult>);

impl ResolutionResults {
    /// Wrap a list of results
    #[must_use]
    pub const fn new(results: Vec<ResolutionResult>) -> Self {
        Self(results)
    }

    /// Reduce all results to the single worst outcome.
    ///
    /// The first result seeds the fold and is replaced only by a strictly
    /// higher priority, so ties keep the earliest message. An empty run
    /// reports success.
    #[must_use]
    pub fn aggregate(&self) -> (ResolveStatus, String) {
        let mut iter = self.0.iter();
        let Some(first) = iter.next() else {
            return (ResolveStatus::Success, SUCCESS_MESSAGE.to_string());
        };
        let worst = iter.fold(first, |worst, result| {
            if result.status.priority() > worst.status.priority() {
                result
            } else {
                worst
            }
        });
        (worst.status, worst.message.clone())
    }

    /// Worst status of the run
    #[must_use]
    pub fn aggregated_status(&self) -> ResolveStatus {
        self.aggregate().0
    }

    /// Message of the worst result
    #[must_use]
    pub fn aggregated_message(&self) -> String {
        self.aggregate().1
    }

    /// Every CIDR across all results, including duplicates
    #[must_use]
    pub fn cidrs(&self) -> Vec<Cidr> {
        self.0.iter().flat_map(|r| r.cidrs.iter().copied()).collect()
    }

    /// Results keyed by domain
    #[must_use]
    pub fn lookup_table(&self) -> BTreeMap<&Fqdn, &ResolutionResult> {
        self.0.iter().map(|r| (&r.domain, r)).collect()
    }

    /// Results ordered by domain
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.0.sort_by(|a, b| a.domain.cmp(&b.domain));
        self
    }

    /// Iterate over results
    pub fn iter(&self) -> std::slice::Iter<'_, ResolutionResult> {
        self.0.iter()
    }

    /// Number of results
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the run produced no results
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a result
    pub fn push(&mut self, result: ResolutionResult) {
        self.0.push(result);
    }
}

impl FromIterator<ResolutionResult> for ResolutionResults {
    fn from_iter<T: IntoIterator<Item = ResolutionResult>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ResolutionResults {
    type Item = ResolutionResult;
    type IntoIter = std::vec::IntoIter<ResolutionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolutionResults {
    type Item = &'a ResolutionResult;
    type IntoIter = std::slice::Iter<'a, ResolutionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use pretty_assertions::assert_eq;

    fn failed(domain: &str, err: LookupError) -> ResolutionResult {
        ResolutionResult::from_lookup(Fqdn::from(domain), Err(err))
    }

    fn ok(domain: &str, cidrs: &[&str]) -> ResolutionResult {
        ResolutionResult::success(
            Fqdn::from(domain),
            cidrs.iter().map(|c| c.parse().unwrap()).collect(),
        )
    }

    #[test]
    fn test_empty_aggregates_to_success() {
        let results = ResolutionResults::default();
        assert_eq!(
            results.aggregate(),
            (ResolveStatus::Success, "Resolve succeeded".to_string())
        );
    }

    #[test]
    fn test_worst_status_wins() {
        let results: ResolutionResults = vec![
            ok("a.example.com", &["1.1.1.1"]),
            failed("b.example.com", LookupError::Timeout),
            failed("c.example.com", LookupError::NotFound),
            failed("d.example.com", LookupError::Temporary("servfail".into())),
        ]
        .into_iter()
        .collect();

        assert_eq!(results.aggregated_status(), ResolveStatus::DomainNotFound);
        assert_eq!(results.aggregated_message(), "Domain not found");
    }

    #[test]
    fn test_ties_keep_first_message() {
        let results = ResolutionResults::new(vec![
            failed("a.example.com", LookupError::Other("first".into())),
            failed("b.example.com", LookupError::Other("second".into())),
        ]);
        assert_eq!(
            results.aggregate(),
            (ResolveStatus::OtherError, "first".to_string())
        );
    }

    #[test]
    fn test_cidrs_and_lookup_table() {
        let results = ResolutionResults::new(vec![
            ok("b.example.com", &["2.2.2.2", "1.1.1.1"]),
            ok("a.example.com", &["1.1.1.1"]),
        ]);
        assert_eq!(results.cidrs().len(), 3);

        let table = results.lookup_table();
        let keys: Vec<&str> = table.keys().map(|d| d.as_str()).collect();
        assert_eq!(keys, vec!["a.example.com", "b.example.com"]);

        let sorted = results.sorted();
        assert_eq!(sorted.iter().next().unwrap().domain.as_str(), "a.example.com");
    }
}
