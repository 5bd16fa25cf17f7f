//! The `examdesk tree` command.

use anyhow::{Context, Result};

use examdesk_core::tree::{flatten_unit_tree, subject_subtrees};
use examdesk_report::{render_tree_text, to_json};

use super::{OutputFormat, ServiceSource};

pub async fn execute(
    source: &ServiceSource,
    grade: Option<u32>,
    all_grades: bool,
    subject: Option<String>,
    include_questions: bool,
    format: OutputFormat,
) -> Result<()> {
    let grade = source.grade_scope(grade, all_grades)?;
    let service = source.open()?;

    let mut forest = match grade {
        Some(grade) => service
            .units_by_grade(grade, include_questions)
            .await
            .with_context(|| format!("failed to fetch units for grade {grade}"))?,
        None => service
            .units(include_questions)
            .await
            .context("failed to fetch units")?,
    };

    if let Some(subject) = &subject {
        forest = subject_subtrees(&forest, subject);
    }

    let flat = flatten_unit_tree(&forest);
    match format {
        OutputFormat::Json => println!("{}", to_json(&flat)?),
        OutputFormat::Text | OutputFormat::Markdown => {
            print!("{}", render_tree_text(&flat));
            println!("{} node(s)", flat.len());
        }
    }

    Ok(())
}
