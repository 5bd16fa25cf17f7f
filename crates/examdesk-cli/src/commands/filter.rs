//! The `examdesk filter` command.

use anyhow::{Context, Result};

use examdesk_core::tree::{
    filter_unit_tree_nodes, filter_units_by_subject, subject_subtrees, UnitFilter,
};
use examdesk_core::UnitType;

use super::{print_nodes, OutputFormat, ServiceSource};

pub async fn execute(
    source: &ServiceSource,
    grade: Option<u32>,
    unit_type: Option<String>,
    search: Option<String>,
    subject: Option<String>,
    strict_subject: bool,
    format: OutputFormat,
) -> Result<()> {
    let unit_type = unit_type
        .map(|t| t.parse::<UnitType>())
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let service = source.open()?;
    let mut forest = service.units(false).await.context("failed to fetch units")?;

    if let Some(subject) = &subject {
        forest = if strict_subject {
            filter_units_by_subject(&forest, subject)
        } else {
            subject_subtrees(&forest, subject)
        };
    }

    let filter = UnitFilter {
        grade,
        unit_type,
        search_term: search,
    };
    let matches = filter_unit_tree_nodes(&forest, &filter);

    print_nodes(&matches, format)
}
