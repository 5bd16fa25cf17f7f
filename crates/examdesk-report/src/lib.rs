//! examdesk-report — rendering for unit trees, coverage, and statistics.

pub mod markdown;
pub mod text;

pub use markdown::{coverage_markdown, write_coverage_markdown};
pub use text::{coverage_table, describe_node, render_tree_text, statistics_table, to_json};
