//! Output formatting for different formats.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use fqdn_egress::policy::{Condition, EgressPolicy};
use fqdn_egress::{FqdnStatus, ResolveStatus};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed tables with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// CSV output (per-domain status)
    Csv,
    /// YAML output
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "table" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => anyhow::bail!(
                "Unknown output format: {s}\n\
                 Valid formats: pretty, json, csv, yaml"
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Print a serializable value in a machine-readable format.
///
/// Returns false for formats that need a hand-written rendering.
pub fn print_structured<T: Serialize>(format: OutputFormat, value: &T) -> Result<bool> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Csv | OutputFormat::Pretty => return Ok(false),
    }
    Ok(true)
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "FQDN")]
    fqdn: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Addresses")]
    addresses: String,
    #[tabled(rename = "Message")]
    message: String,
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Peers")]
    peers: String,
}

fn colored_status(status: ResolveStatus) -> String {
    let text = status.to_string();
    if status.is_success() {
        text.green().to_string()
    } else if status.is_transient() {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// Per-domain statuses as CSV.
pub fn print_statuses_csv(statuses: &[FqdnStatus]) {
    println!("fqdn,status,addresses,last_successful_time");
    for status in statuses {
        let addresses: Vec<String> = status.addresses.iter().map(ToString::to_string).collect();
        println!(
            "{},{},\"{}\",{}",
            status.fqdn,
            status.resolve_reason,
            addresses.join(";"),
            status.last_successful_time.to_rfc3339()
        );
    }
}

/// Per-domain statuses as a table.
pub fn print_statuses_pretty(statuses: &[FqdnStatus]) {
    if statuses.is_empty() {
        println!("{}", "No tracked domains.".dimmed());
        return;
    }

    let rows: Vec<StatusRow> = statuses
        .iter()
        .map(|status| StatusRow {
            fqdn: status.fqdn.to_string(),
            status: colored_status(status.resolve_reason),
            addresses: status
                .addresses
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            message: status.resolve_message.clone(),
        })
        .collect();

    println!("{}", "Domains:".bold().underline());
    println!("{}", Table::new(&rows).with(Style::rounded()));
}

/// Synthesized rules as a table.
pub fn print_policy_pretty(policy: Option<&EgressPolicy>) {
    println!();
    println!("{}", "Egress Rules:".bold().underline());
    let Some(policy) = policy else {
        println!("  {}", "No egress rules specified".yellow());
        return;
    };
    if policy.is_empty() {
        println!("  {}", "Empty rule set, egress deny-all in effect".yellow());
        return;
    }

    let rows: Vec<RuleRow> = policy
        .egress
        .iter()
        .map(|rule| RuleRow {
            ports: rule.key(),
            peers: rule
                .to
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
}

/// One condition line.
pub fn print_condition(condition: &Condition) {
    let mark = if condition.status {
        "✓".green()
    } else {
        "✗".red()
    };
    println!(
        "  {} {:?} ({}): {}",
        mark,
        condition.kind,
        condition.reason.bold(),
        condition.message
    );
}
