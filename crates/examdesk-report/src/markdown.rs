//! Markdown coverage report, for pasting into review threads or wikis.

use std::path::Path;

use anyhow::Result;

use examdesk_core::service::{DistributionEntry, UnitCoverage};

/// Escape characters that would break a markdown table cell.
fn md_escape(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn distribution_section(out: &mut String, title: &str, entries: &[DistributionEntry]) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("\n### {title}\n\n"));
    out.push_str("| Label | Questions | Share |\n");
    out.push_str("|-------|-----------|-------|\n");
    for e in entries {
        out.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            md_escape(&e.label),
            e.count,
            e.percentage
        ));
    }
}

/// Generate a markdown coverage report for one exam sheet.
pub fn coverage_markdown(coverage: &UnitCoverage) -> String {
    let mut md = format!(
        "## Unit coverage — {}\n\n**{}** questions across **{}** units.\n",
        md_escape(&coverage.exam_sheet_id),
        coverage.total_questions,
        coverage.covered_units
    );

    distribution_section(&mut md, "By subject", &coverage.subject_distribution);
    distribution_section(&mut md, "By grade", &coverage.grade_distribution);

    if coverage.missing_units.is_empty() {
        md.push_str("\nAll units covered.\n");
    } else {
        md.push_str(&format!(
            "\n### Missing units ({})\n\n",
            coverage.missing_units.len()
        ));
        for unit in &coverage.missing_units {
            md.push_str(&format!("- {} (`{}`)\n", md_escape(&unit.name), unit.id));
        }
    }
    md
}

/// Write a markdown coverage report to a file.
pub fn write_coverage_markdown(coverage: &UnitCoverage, path: &Path) -> Result<()> {
    let md = coverage_markdown(coverage);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, md)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use examdesk_core::service::MissingUnit;

    fn coverage() -> UnitCoverage {
        UnitCoverage {
            exam_sheet_id: "sheet-3".into(),
            total_questions: 30,
            covered_units: 5,
            subject_distribution: vec![DistributionEntry {
                label: "수학|심화".into(),
                count: 30,
                percentage: 100.0,
            }],
            grade_distribution: vec![
                DistributionEntry {
                    label: "1학년".into(),
                    count: 18,
                    percentage: 60.0,
                },
                DistributionEntry {
                    label: "2학년".into(),
                    count: 12,
                    percentage: 40.0,
                },
            ],
            missing_units: vec![MissingUnit {
                id: "m7".into(),
                name: "통계".into(),
            }],
        }
    }

    #[test]
    fn markdown_has_sections() {
        let md = coverage_markdown(&coverage());
        assert!(md.starts_with("## Unit coverage — sheet-3"));
        assert!(md.contains("### By subject"));
        assert!(md.contains("| 수학\\|심화 | 30 | 100.0% |"));
        assert!(md.contains("| 2학년 | 12 | 40.0% |"));
        assert!(md.contains("### Missing units (1)"));
        assert!(md.contains("- 통계 (`m7`)"));
    }

    #[test]
    fn full_coverage_message() {
        let mut c = coverage();
        c.missing_units.clear();
        c.grade_distribution.clear();
        let md = coverage_markdown(&c);
        assert!(md.contains("All units covered."));
        assert!(!md.contains("By grade"));
    }

    #[test]
    fn markdown_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("coverage.md");
        write_coverage_markdown(&coverage(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("sheet-3"));
    }
}
