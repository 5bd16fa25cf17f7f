//! Subcommand implementations and the helpers they share.

pub mod coverage;
pub mod filter;
pub mod find;
pub mod init;
pub mod search;
pub mod select;
pub mod stats;
pub mod tree;

use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;
use tracing::debug;

use examdesk_client::config::load_config_from;
use examdesk_client::{create_client, AbortSignal, MockUnitService};
use examdesk_core::{UnitService, UnitTreeNode};
use examdesk_report::describe_node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    #[value(alias = "md")]
    Markdown,
}

/// Where units come from: a local file, or the configured unit service.
pub struct ServiceSource {
    pub input: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub abort: AbortSignal,
}

impl ServiceSource {
    pub fn open(&self) -> Result<Box<dyn UnitService>> {
        if let Some(path) = &self.input {
            debug!(path = %path.display(), "reading units from file");
            return Ok(Box::new(MockUnitService::from_json_file(path)?));
        }
        let config = load_config_from(self.config.as_deref())?;
        debug!(?config, "using unit service");
        let client = create_client(&config)?;
        Ok(Box::new(client.with_abort_signal(self.abort.clone())))
    }

    /// Configured fallback grade. Local files only get one from an explicit `--config`.
    pub fn default_grade(&self) -> Result<Option<u32>> {
        if self.input.is_some() && self.config.is_none() {
            return Ok(None);
        }
        Ok(load_config_from(self.config.as_deref())?.default_grade)
    }

    /// Grade a command should scope to: the explicit one, none with
    /// `--all-grades`, otherwise the configured default.
    pub fn grade_scope(&self, grade: Option<u32>, all_grades: bool) -> Result<Option<u32>> {
        match grade {
            Some(grade) => Ok(Some(grade)),
            None if all_grades => Ok(None),
            None => self.default_grade(),
        }
    }
}

/// Print a flat node list in the requested format.
pub fn print_nodes(nodes: &[&UnitTreeNode], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", examdesk_report::to_json(nodes)?),
        OutputFormat::Text | OutputFormat::Markdown => {
            for node in nodes {
                println!("{}", describe_node(node));
            }
            println!("{} node(s)", nodes.len());
        }
    }
    Ok(())
}
