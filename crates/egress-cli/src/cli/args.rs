//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Resolve FQDN-based egress policies into CIDR rule sets
///
/// Policies are read from TOML or JSON files. Per-domain resolution state
/// is kept in a JSON state file between runs so that transient DNS
/// failures do not immediately revoke access.
#[derive(Parser, Debug)]
#[command(name = "fqdn-egress")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase log verbosity (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// State file holding per-domain resolution status
    #[arg(short, long, global = true, env = "FQDN_EGRESS_STATE")]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a policy's domains and print the synthesized rules
    Resolve(ResolveArgs),

    /// Validate a policy file without resolving anything
    Validate(PolicyArgs),

    /// Show the rules the stored state grants, without DNS lookups
    Check(PolicyArgs),
}

// ============================================================================
// Shared
// ============================================================================

#[derive(Args, Debug)]
pub struct PolicyArgs {
    /// Policy file (.toml or .json)
    pub policy: PathBuf,
}

// ============================================================================
// Resolve command
// ============================================================================

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Policy file (.toml or .json)
    pub policy: PathBuf,

    /// Nameserver to query (repeatable); defaults to the system resolver
    #[arg(short, long = "nameserver", value_name = "ADDR:PORT")]
    pub nameservers: Vec<SocketAddr>,

    /// Maximum concurrent lookups
    #[arg(short = 'c', long, env = "FQDN_EGRESS_MAX_CONCURRENT")]
    pub max_concurrent: Option<usize>,

    /// Answer lookups from a TOML hosts table instead of DNS
    #[arg(long, value_name = "FILE")]
    pub hosts: Option<PathBuf>,

    /// Do not write the updated state file
    #[arg(long)]
    pub dry_run: bool,
}
