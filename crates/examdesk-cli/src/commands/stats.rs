//! The `examdesk stats` command.

use anyhow::{Context, Result};
use futures::future::try_join_all;

use examdesk_report::{statistics_table, to_json};

use super::{OutputFormat, ServiceSource};

pub async fn execute(
    source: &ServiceSource,
    unit_ids: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    let service = source.open()?;

    let stats = if unit_ids.is_empty() {
        service
            .all_unit_statistics()
            .await
            .context("failed to fetch unit statistics")?
    } else {
        // Fetched concurrently; the first failure wins.
        try_join_all(unit_ids.iter().map(|id| {
            let service = &service;
            async move {
                service
                    .unit_statistics(id)
                    .await
                    .with_context(|| format!("failed to fetch statistics for unit {id}"))
            }
        }))
        .await?
    };

    match format {
        OutputFormat::Json => println!("{}", to_json(&stats)?),
        OutputFormat::Text | OutputFormat::Markdown => println!("{}", statistics_table(&stats)),
    }

    Ok(())
}
