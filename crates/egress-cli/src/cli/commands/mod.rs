//! Command implementations.

pub mod check;
pub mod resolve;
pub mod validate;

use anyhow::Result;
use fqdn_egress::FqdnStatus;
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded CLI configuration
    pub config: Config,

    /// Output format
    pub output_format: OutputFormat,

    /// State file location
    pub state_path: PathBuf,
}

impl Context {
    /// Persisted statuses from the state file.
    pub fn load_state(&self) -> Result<Vec<FqdnStatus>> {
        config::load_state(&self.state_path)
    }

    /// Replace the state file contents.
    pub fn save_state(&self, statuses: &[FqdnStatus]) -> Result<()> {
        config::save_state(&self.state_path, statuses)
    }
}
