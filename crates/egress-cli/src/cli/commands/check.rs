//! `fqdn-egress check` - Show what the stored state grants right now.

use anyhow::Result;
use chrono::Utc;
use fqdn_egress::policy::plan;
use fqdn_egress::resolver::ResolutionResults;

use super::Context;
use crate::cli::args::PolicyArgs;
use crate::config;
use crate::output::{self, OutputFormat};

pub fn execute(ctx: &Context, args: &PolicyArgs) -> Result<()> {
    let spec = config::load_policy(&args.policy)?;
    spec.validate()?;

    // No lookups: stored addresses are evaluated as they are
    let outcome = plan(&spec, &ctx.load_state()?, ResolutionResults::default(), Utc::now());

    if output::print_structured(ctx.output_format, &outcome.policy)? {
        return Ok(());
    }
    if ctx.output_format == OutputFormat::Csv {
        output::print_statuses_csv(&outcome.statuses);
        return Ok(());
    }

    output::print_statuses_pretty(&outcome.statuses);
    output::print_policy_pretty(outcome.policy.as_ref());
    println!();
    output::print_condition(&outcome.ready_condition);
    Ok(())
}
