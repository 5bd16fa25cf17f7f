//! Plain-text outlines and terminal tables.

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use examdesk_core::labels::{grade_label, unit_type_label};
use examdesk_core::service::{UnitCoverage, UnitStatistics};
use examdesk_core::tree::FlatUnitNode;
use examdesk_core::UnitTreeNode;

/// `name [id] type · grade` on one line.
pub fn describe_node(node: &UnitTreeNode) -> String {
    let mut line = format!(
        "{} [{}] {}",
        node.name,
        node.id,
        unit_type_label(node.unit_type)
    );
    if let Some(grade) = node.grade {
        line.push_str(&format!(" · {}", grade_label(grade)));
    }
    line
}

/// Indented outline of a flattened forest, one node per line.
///
/// ```text
/// 수학 [math] 과목
///   대수 [m1] 단원 · 1학년
/// ```
pub fn render_tree_text(flat: &[FlatUnitNode<'_>]) -> String {
    let mut out = String::new();
    for entry in flat {
        out.push_str(&"  ".repeat(entry.depth));
        out.push_str(&describe_node(entry.node));
        out.push('\n');
    }
    out
}

/// Summary plus subject/grade distribution for one exam sheet.
pub fn coverage_table(coverage: &UnitCoverage) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Group", "Label", "Questions", "Share"]);

    for (group, entries) in [
        ("subject", &coverage.subject_distribution),
        ("grade", &coverage.grade_distribution),
    ] {
        for entry in entries {
            table.add_row(vec![
                Cell::new(group),
                Cell::new(&entry.label),
                Cell::new(entry.count),
                Cell::new(format!("{:.1}%", entry.percentage)),
            ]);
        }
    }

    let mut out = format!(
        "Exam sheet {}: {} questions across {} units\n{table}\n",
        coverage.exam_sheet_id, coverage.total_questions, coverage.covered_units
    );
    if !coverage.missing_units.is_empty() {
        out.push_str("Missing units:\n");
        for unit in &coverage.missing_units {
            out.push_str(&format!("  {} [{}]\n", unit.name, unit.id));
        }
    }
    out
}

pub fn statistics_table(stats: &[UnitStatistics]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Unit", "Name", "Questions", "Used", "Avg difficulty"]);
    for s in stats {
        table.add_row(vec![
            Cell::new(&s.unit_id),
            Cell::new(&s.unit_name),
            Cell::new(s.question_count),
            Cell::new(s.usage_count),
            Cell::new(
                s.average_difficulty
                    .map(|d| format!("{d:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    table.to_string()
}

/// Pretty JSON for any serializable output.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
