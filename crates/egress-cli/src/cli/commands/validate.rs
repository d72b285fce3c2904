//! `fqdn-egress validate` - Check a policy file without resolving.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::Context;
use crate::cli::args::PolicyArgs;
use crate::config;
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    valid: bool,
    error: Option<String>,
    rules: usize,
    fqdns: Vec<String>,
    invalid_fqdns: Vec<String>,
}

pub fn execute(ctx: &Context, args: &PolicyArgs) -> Result<()> {
    let spec = config::load_policy(&args.policy)?;
    let validation = spec.validate();

    let fqdns = spec.fqdns();
    let report = Report {
        valid: validation.is_ok(),
        error: validation.as_ref().err().map(ToString::to_string),
        rules: spec.egress.len(),
        invalid_fqdns: fqdns
            .iter()
            .filter(|fqdn| !fqdn.is_valid())
            .map(ToString::to_string)
            .collect(),
        fqdns: fqdns.iter().map(ToString::to_string).collect(),
    };

    if !output::print_structured(ctx.output_format, &report)? {
        if ctx.output_format == OutputFormat::Csv {
            println!("fqdn,valid");
            for fqdn in &fqdns {
                println!("{},{}", fqdn, fqdn.is_valid());
            }
        } else {
            print_pretty(&report);
        }
    }

    validation?;
    Ok(())
}

fn print_pretty(report: &Report) {
    if report.valid {
        println!("{} {}", "✓".green(), "Policy is valid".bold());
    } else {
        println!(
            "{} {} {}",
            "✗".red(),
            "Policy is invalid:".bold(),
            report.error.as_deref().unwrap_or_default()
        );
    }
    println!("  {} {}", "Rules:".bold(), report.rules);
    println!("  {} {}", "Domains:".bold(), report.fqdns.len());
    for fqdn in &report.invalid_fqdns {
        println!(
            "  {} {} will be reported as INVALID_DOMAIN",
            "!".yellow().bold(),
            fqdn
        );
    }
}
