//! Resolve FQDN-based egress policies into deterministic CIDR rule sets.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fqdn_egress::{CancelToken, EgressRule, PolicySpec, PortSpec, Reconciler};
//! use fqdn_egress::resolver::{ResolveEngine, StaticLookup};
//!
//! # tokio_test::block_on(async {
//! let lookup = StaticLookup::new()
//!     .with_addresses("api.example.com", ["93.184.216.34".parse().unwrap()]);
//! let engine = ResolveEngine::new(Arc::new(lookup), 10)?;
//! let reconciler = Reconciler::new(engine);
//!
//! let spec = PolicySpec {
//!     egress: vec![EgressRule::new(["api.example.com"], vec![PortSpec::tcp(443)])],
//!     ..PolicySpec::default()
//! };
//! let outcome = reconciler.reconcile(&spec, &[], &CancelToken::new()).await?;
//!
//! let policy = outcome.policy.expect("rules were specified");
//! assert_eq!(policy.egress[0].to[0].to_string(), "93.184.216.34/32");
//! # Ok::<(), fqdn_egress::EgressError>(())
//! # }).unwrap();
//! ```
//!
//! # Crates
//!
//! - [`egress_core`] - domains, CIDRs, resolve status and policy specs
//! - [`resolver`] - bounded concurrent DNS resolution
//! - [`policy`] - status tracking and rule synthesis

#![doc(html_root_url = "https://docs.rs/fqdn-egress/0.3.0")]

// Re-export core types
pub use egress_core::*;

pub use egress_policy as policy;
pub use egress_policy::{EgressPolicy, ReconcileOutcome, Reconciler};
pub use egress_resolver as resolver;
pub use egress_resolver::{CancelToken, EngineConfig, ResolveEngine};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
