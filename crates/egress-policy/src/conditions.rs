//! Human-facing conditions summarizing a reconciliation.

use std::fmt;

use egress_core::ResolveStatus;
use serde::Serialize;

use crate::synth::EgressPolicy;

/// Condition kinds reported for a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConditionKind {
    /// Outcome of resolving the policy's domains
    Resolved,
    /// Whether the synthesized policy is in effect
    Ready,
}

/// Reasons for the `Ready` condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadyReason {
    /// Rules were synthesized
    Ready,
    /// Rules exist but none resolved to a usable peer
    EmptyRules,
    /// Nothing to apply
    Failed,
}

impl fmt::Display for ReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::EmptyRules => write!(f, "EmptyRules"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// A status condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition kind
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    /// True when the condition holds
    pub status: bool,
    /// Machine-readable reason
    pub reason: String,
    /// Human-readable message
    pub message: String,
}

impl Condition {
    /// `Resolved` condition for an aggregated resolve outcome
    #[must_use]
    pub fn resolved(status: ResolveStatus, message: &str) -> Self {
        let (holds, message) = if status.is_success() {
            (true, "The network policy resolved successfully.".to_string())
        } else {
            (false, message.to_string())
        };
        Self {
            kind: ConditionKind::Resolved,
            status: holds,
            reason: status.to_string(),
            message,
        }
    }

    /// `Ready` condition for a synthesis outcome
    #[must_use]
    pub fn ready(policy: Option<&EgressPolicy>) -> Self {
        let (holds, reason, message) = match policy {
            None => (false, ReadyReason::Failed, "No Egress rules specified"),
            Some(policy) if policy.is_empty() => (
                true,
                ReadyReason::EmptyRules,
                "Resolved to an empty NetworkPolicy. Egress deny-all in effect.",
            ),
            Some(_) => (true, ReadyReason::Ready, "The network policy is ready."),
        };
        Self {
            kind: ConditionKind::Ready,
            status: holds,
            reason: reason.to_string(),
            message: message.to_string(),
        }
    }
}
