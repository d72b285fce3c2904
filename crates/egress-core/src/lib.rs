//! Core types for FQDN-based egress policies.
//!
//! This crate provides the foundational types shared by the resolver and
//! policy crates:
//!
//! - **Types**: domains ([`Fqdn`]), address blocks ([`Cidr`]), ports, the
//!   [`ResolveStatus`] taxonomy, persisted [`FqdnStatus`] and the desired
//!   [`PolicySpec`]
//! - **Errors**: configuration and parsing failures via [`EgressError`]
//!
//! # Example
//!
//! ```rust
//! use egress_core::{Cidr, Fqdn};
//!
//! assert!(Fqdn::from("api.example.com").is_valid());
//! let cidr: Cidr = "10.0.0.5".parse().unwrap();
//! assert_eq!(cidr.to_string(), "10.0.0.5/32");
//! assert!(cidr.is_private());
//! ```

#![doc(html_root_url = "https://docs.rs/egress-core/0.3.0")]

mod error;
pub mod types;
pub mod util;

pub use error::{EgressError, Result};
pub use types::*;
