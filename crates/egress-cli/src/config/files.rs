//! Policy, state and hosts files.

use anyhow::{Context, Result};
use fqdn_egress::resolver::StaticLookup;
use fqdn_egress::{read_statuses, write_statuses, FqdnStatus, PolicySpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::net::IpAddr;
use std::path::Path;

/// Read a policy from a `.json` file, or TOML otherwise.
pub fn load_policy(path: &Path) -> Result<PolicySpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let spec = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON policy {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML policy {}", path.display()))?
    };
    Ok(spec)
}

/// Read persisted statuses; a missing file is an empty table.
pub fn load_state(path: &Path) -> Result<Vec<FqdnStatus>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)
        .with_context(|| format!("Failed to read state {}", path.display()))?;
    read_statuses(BufReader::new(file))
        .with_context(|| format!("Corrupt state file {}", path.display()))
}

/// Write statuses as pretty JSON, creating parent directories.
pub fn save_state(path: &Path, statuses: &[FqdnStatus]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to write state {}", path.display()))?;
    write_statuses(BufWriter::new(file), statuses)
        .with_context(|| format!("Failed to write state {}", path.display()))
}

#[derive(Debug, Deserialize)]
struct HostsFile {
    #[serde(default)]
    hosts: BTreeMap<String, Vec<IpAddr>>,
}

/// Build a canned lookup from a TOML `[hosts]` table mapping names to
/// address lists.
pub fn load_hosts(path: &Path) -> Result<StaticLookup> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts {}", path.display()))?;
    let file: HostsFile = toml::from_str(&content)
        .with_context(|| format!("Invalid hosts file {}", path.display()))?;

    Ok(file
        .hosts
        .into_iter()
        .fold(StaticLookup::new(), |lookup, (host, addresses)| {
            lookup.with_addresses(&host, addresses)
        }))
}
