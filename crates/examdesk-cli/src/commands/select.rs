//! The `examdesk select` command.

use anyhow::{Context, Result};
use tracing::warn;

use examdesk_core::tree::extract_selected_units;

use super::{print_nodes, OutputFormat, ServiceSource};

pub async fn execute(source: &ServiceSource, ids: Vec<String>, format: OutputFormat) -> Result<()> {
    let service = source.open()?;
    let forest = service.units(false).await.context("failed to fetch units")?;

    let selected = extract_selected_units(&forest, ids.as_slice());
    if selected.len() < ids.len() {
        warn!(
            requested = ids.len(),
            resolved = selected.len(),
            "some ids are missing or are not units"
        );
    }

    print_nodes(&selected, format)
}
