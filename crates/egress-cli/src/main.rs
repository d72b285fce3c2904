//! fqdn-egress - resolve FQDN egress policies into CIDR rule sets.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    egress_cli::run().await
}
