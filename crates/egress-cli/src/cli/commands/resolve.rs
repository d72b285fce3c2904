//! `fqdn-egress resolve` - Resolve a policy and print the synthesized rules.

use anyhow::{Context as _, Result};
use colored::Colorize;
use fqdn_egress::resolver::NameLookup;
use fqdn_egress::{CancelToken, ReconcileOutcome, Reconciler, ResolveEngine};
use std::sync::Arc;
use tracing::info;

use super::Context;
use crate::cli::args::ResolveArgs;
use crate::config;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: ResolveArgs) -> Result<()> {
    let spec = config::load_policy(&args.policy)?;
    let previous = ctx.load_state()?;

    let engine_config = ctx
        .config
        .engine_config(&args.nameservers, args.max_concurrent);
    let engine = match &args.hosts {
        Some(path) => {
            let lookup: Arc<dyn NameLookup> = Arc::new(config::load_hosts(path)?);
            ResolveEngine::new(lookup, engine_config.max_concurrent)?
        }
        None => ResolveEngine::from_config(&engine_config)?,
    };
    info!(
        domains = spec.fqdns().len(),
        max_concurrent = engine.max_concurrent(),
        "resolving policy"
    );

    // Ctrl-C abandons in-flight lookups; whatever finished is still reported
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let outcome = Reconciler::new(engine)
        .reconcile(&spec, &previous, &cancel)
        .await
        .with_context(|| format!("Invalid policy {}", args.policy.display()))?;
    ctrl_c.abort();

    if args.dry_run {
        info!("dry run, state file left untouched");
    } else {
        ctx.save_state(&outcome.statuses)?;
    }

    print_outcome(ctx.output_format, &outcome)
}

fn print_outcome(format: OutputFormat, outcome: &ReconcileOutcome) -> Result<()> {
    if output::print_structured(format, outcome)? {
        return Ok(());
    }
    if format == OutputFormat::Csv {
        output::print_statuses_csv(&outcome.statuses);
        return Ok(());
    }

    output::print_statuses_pretty(&outcome.statuses);
    output::print_policy_pretty(outcome.policy.as_ref());

    println!();
    println!("{}", "Conditions:".bold().underline());
    output::print_condition(&outcome.resolve_condition);
    output::print_condition(&outcome.ready_condition);

    println!();
    println!(
        "  {} {}   {} {}",
        "Resolved:".bold(),
        outcome.total_address_count,
        "Applied:".bold(),
        outcome.applied_address_count
    );
    for fqdn in &outcome.cleared {
        println!("  {} addresses of {} were removed", "!".red().bold(), fqdn);
    }
    if let Some(requeue) = outcome.requeue_after {
        println!(
            "{}",
            format!("Next resolve due in {}s", requeue.as_secs()).dimmed()
        );
    }
    Ok(())
}
