//! One reconciliation pass: resolve, track, synthesize, summarize.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use egress_core::{Fqdn, FqdnStatus, PolicySpec, ResolveStatus};
use egress_resolver::{CancelToken, ResolutionResults, ResolveEngine};
use serde::Serialize;
use tracing::{info, instrument};

use crate::conditions::Condition;
use crate::synth::{synthesize, EgressPolicy};
use crate::tracker::update_statuses;

/// Everything a caller needs to persist and apply after one pass
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    /// Status table to persist, sorted by domain
    pub statuses: Vec<FqdnStatus>,
    /// Domains whose addresses were cleared this pass
    pub cleared: Vec<Fqdn>,
    /// Worst-case resolve status of the pass
    pub resolve_status: ResolveStatus,
    /// Message belonging to `resolve_status`
    pub resolve_message: String,
    /// `Resolved` condition
    pub resolve_condition: Condition,
    /// `Ready` condition
    pub ready_condition: Condition,
    /// Synthesized rules; `None` when the policy has no egress rules
    pub policy: Option<EgressPolicy>,
    /// CIDRs returned by this pass's lookups, before filtering
    pub total_address_count: usize,
    /// Unique CIDRs in the synthesized rules
    pub applied_address_count: usize,
    /// When this pass ran
    pub latest_lookup_time: DateTime<Utc>,
    /// When to run again; `None` waits for the policy to change
    #[serde(skip)]
    pub requeue_after: Option<Duration>,
    /// Raw per-domain results of this pass
    #[serde(skip)]
    pub results: ResolutionResults,
}

impl ReconcileOutcome {
    /// Returns true when there is nothing to apply and any downstream
    /// policy should be removed
    #[must_use]
    pub const fn has_no_rules(&self) -> bool {
        self.policy.is_none()
    }
}

/// Runs reconciliation passes for policies against a resolve engine
#[derive(Debug, Clone)]
pub struct Reconciler {
    engine: ResolveEngine,
}

impl Reconciler {
    /// Create a reconciler over `engine`
    #[must_use]
    pub const fn new(engine: ResolveEngine) -> Self {
        Self { engine }
    }

    /// Resolve the policy's domains and fold them into `previous`.
    ///
    /// Only an invalid `spec` is an error; lookup failures are reported in
    /// the outcome.
    #[instrument(skip_all, fields(rules = spec.egress.len()))]
    pub async fn reconcile(
        &self,
        spec: &PolicySpec,
        previous: &[FqdnStatus],
        cancel: &CancelToken,
    ) -> egress_core::Result<ReconcileOutcome> {
        spec.validate()?;
        let results = self
            .engine
            .resolve_all(
                &spec.fqdns(),
                spec.resolve_timeout(),
                spec.enabled_network_type,
                cancel,
            )
            .await;
        Ok(plan(spec, previous, results, Utc::now()))
    }
}

/// Build an outcome from results that are already in hand.
///
/// Persisted statuses for domains the policy no longer names are dropped
/// before tracking.
pub fn plan(
    spec: &PolicySpec,
    previous: &[FqdnStatus],
    results: ResolutionResults,
    now: DateTime<Utc>,
) -> ReconcileOutcome {
    let wanted: BTreeSet<Fqdn> = spec.fqdns().into_iter().collect();
    let kept: Vec<FqdnStatus> = previous
        .iter()
        .filter(|status| wanted.contains(&status.fqdn))
        .cloned()
        .collect();

    let tracked = update_statuses(&kept, &results, spec.retry_timeout(), now);
    let policy = synthesize(spec, &tracked.statuses);

    let total_address_count = results.cidrs().len();
    let applied_address_count = policy.as_ref().map_or(0, |p| p.unique_cidrs().len());
    let (resolve_status, resolve_message) = results.aggregate();
    let requeue_after = policy.as_ref().map(|_| spec.ttl());

    info!(
        status = %resolve_status,
        resolved = total_address_count,
        applied = applied_address_count,
        cleared = tracked.cleared.len(),
        requeue_after = ?requeue_after,
        "reconciled"
    );

    ReconcileOutcome {
        resolve_condition: Condition::resolved(resolve_status, &resolve_message),
        ready_condition: Condition::ready(policy.as_ref()),
        statuses: tracked.statuses,
        cleared: tracked.cleared,
        resolve_status,
        resolve_message,
        policy,
        total_address_count,
        applied_address_count,
        latest_lookup_time: now,
        requeue_after,
        results,
    }
}
