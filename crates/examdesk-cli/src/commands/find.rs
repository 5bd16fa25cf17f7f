//! The `examdesk find` command.

use anyhow::{Context, Result};

use examdesk_core::tree::find_unit_in_tree;

use super::{print_nodes, OutputFormat, ServiceSource};

pub async fn execute(source: &ServiceSource, id: String, format: OutputFormat) -> Result<()> {
    let service = source.open()?;
    let forest = service.units(false).await.context("failed to fetch units")?;

    let node = find_unit_in_tree(&forest, &id)
        .with_context(|| format!("unit not found: {id}"))?;

    print_nodes(&[node], format)
}
