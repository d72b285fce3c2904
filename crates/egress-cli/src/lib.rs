//! # egress-cli
//!
//! Command-line interface for FQDN egress policies.
//!
//! ## Commands
//!
//! - **resolve**: resolve a policy's domains, update the state file and
//!   print the synthesized rules
//! - **validate**: check a policy file for range and limit violations
//! - **check**: show the rules the stored state grants, without DNS
//!
//! Output is available as pretty tables, JSON, CSV or YAML.

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
