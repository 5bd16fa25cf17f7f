//! The `examdesk coverage` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examdesk_report::{coverage_markdown, coverage_table, to_json, write_coverage_markdown};

use super::{OutputFormat, ServiceSource};

pub async fn execute(
    source: &ServiceSource,
    exam_sheet_id: String,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let service = source.open()?;
    let coverage = service
        .unit_coverage(&exam_sheet_id)
        .await
        .with_context(|| format!("failed to fetch coverage for exam sheet {exam_sheet_id}"))?;

    match format {
        OutputFormat::Markdown => println!("{}", coverage_markdown(&coverage)),
        OutputFormat::Json => println!("{}", to_json(&coverage)?),
        OutputFormat::Text => print!("{}", coverage_table(&coverage)),
    }

    if let Some(path) = output {
        write_coverage_markdown(&coverage, &path)?;
        eprintln!("Markdown report: {}", path.display());
    }

    Ok(())
}
