//! Status tracking and rule synthesis for FQDN egress policies.
//!
//! A reconciliation pass resolves the policy's domains, merges the results
//! into the persisted [`FqdnStatus`](egress_core::FqdnStatus) table with a
//! retry grace window, and synthesizes a minimal egress rule set grouped by
//! port set:
//!
//! ```text
//! ResolveEngine -> update_statuses -> synthesize -> ReconcileOutcome
//! ```

#![doc(html_root_url = "https://docs.rs/egress-policy/0.3.0")]

pub mod conditions;
mod reconcile;
pub mod synth;
mod tracker;

pub use conditions::{Condition, ConditionKind, ReadyReason};
pub use reconcile::{plan, ReconcileOutcome, Reconciler};
pub use synth::{port_set_key, synthesize, EgressPolicy, SynthesizedRule, ALL_PORTS};
pub use tracker::{update_statuses, TrackedStatuses};
