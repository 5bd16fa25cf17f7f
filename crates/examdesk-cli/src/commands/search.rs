//! The `examdesk search` command.

use anyhow::{Context, Result};

use examdesk_core::service::UnitSearchQuery;
use examdesk_report::to_json;

use super::{print_nodes, OutputFormat, ServiceSource};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    source: &ServiceSource,
    keyword: Option<String>,
    subject: Option<String>,
    grade: Option<u32>,
    all_grades: bool,
    limit: Option<u32>,
    offset: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let query = UnitSearchQuery {
        keyword,
        subject,
        grade: source.grade_scope(grade, all_grades)?,
        limit,
        offset,
    };

    let service = source.open()?;
    let page = service
        .search_units(&query)
        .await
        .with_context(|| format!("search failed for {query:?}"))?;

    match format {
        OutputFormat::Json => println!("{}", to_json(&page)?),
        OutputFormat::Text | OutputFormat::Markdown => {
            let units: Vec<_> = page.units.iter().collect();
            print_nodes(&units, format)?;
            println!("{} total match(es)", page.total);
        }
    }

    Ok(())
}
