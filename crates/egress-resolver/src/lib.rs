//! Concurrent DNS resolution for FQDN egress policies.
//!
//! The [`ResolveEngine`] resolves a list of domains through a pluggable
//! [`NameLookup`], bounded by an admission gate, a per-lookup deadline and
//! a caller-owned [`CancelToken`]. Failures never abort a run; each domain
//! yields a [`ResolutionResult`] that carries its [`egress_core::ResolveStatus`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use egress_core::{AddressFamily, Fqdn};
//! use egress_resolver::{CancelToken, ResolveEngine, StaticLookup};
//!
//! # tokio_test::block_on(async {
//! let lookup = StaticLookup::new()
//!     .with_addresses("api.example.com", ["93.184.216.34".parse().unwrap()]);
//! let engine = ResolveEngine::new(Arc::new(lookup), 4).unwrap();
//!
//! let results = engine
//!     .resolve_all(
//!         &[Fqdn::from("api.example.com")],
//!         Duration::from_secs(3),
//!         AddressFamily::Ipv4,
//!         &CancelToken::new(),
//!     )
//!     .await;
//! assert_eq!(results.cidrs()[0].to_string(), "93.184.216.34/32");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/egress-resolver/0.3.0")]

mod cancel;
mod dns;
mod engine;
mod error;
mod lookup;
mod result;

pub use cancel::CancelToken;
pub use dns::Resolver;
pub use engine::{EngineConfig, ResolveEngine};
pub use error::{LookupError, LookupResult};
pub use lookup::{HickoryLookup, LookupConfig, NameLookup, StaticLookup};
pub use result::{ResolutionResult, ResolutionResults, SUCCESS_MESSAGE};
