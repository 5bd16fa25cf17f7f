//! examdesk CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use examdesk_client::AbortController;

mod commands;

use commands::{OutputFormat, ServiceSource};

#[derive(Parser)]
#[command(
    name = "examdesk",
    version,
    about = "Browse, search, and report on curriculum unit trees"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read units from a local JSON file instead of the unit service
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the unit tree as an indented outline
    Tree {
        /// Only units of this grade (defaults to the configured grade)
        #[arg(long)]
        grade: Option<u32>,

        /// Ignore the configured default grade
        #[arg(long, conflicts_with = "grade")]
        all_grades: bool,

        /// Only this subject's subtree
        #[arg(long)]
        subject: Option<String>,

        /// Include question payloads
        #[arg(long)]
        questions: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Look up a single unit by id
    Find {
        id: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Resolve selected unit ids to units, skipping non-unit nodes
    Select {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// List every node matching all given conditions
    Filter {
        #[arg(long)]
        grade: Option<u32>,

        /// Node type: subject, grade, category, unit
        #[arg(long = "type")]
        unit_type: Option<String>,

        /// Case-insensitive name substring
        #[arg(long)]
        search: Option<String>,

        /// Restrict to a subject before filtering
        #[arg(long)]
        subject: Option<String>,

        /// Apply the subject name match at every level, not only at the root
        #[arg(long, requires = "subject")]
        strict_subject: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Search units on the service
    Search {
        #[arg(long)]
        keyword: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        grade: Option<u32>,

        /// Ignore the configured default grade
        #[arg(long, conflicts_with = "grade")]
        all_grades: bool,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show unit coverage for an exam sheet
    Coverage {
        exam_sheet_id: String,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Also write a markdown report to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show question statistics for the given units, or for all units
    Stats {
        unit_ids: Vec<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examdesk=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();

    // Ctrl-C cancels any in-flight request instead of killing the process mid-write.
    let controller = AbortController::new();
    let on_interrupt = controller.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.abort();
        }
    });

    let source = ServiceSource {
        input: cli.input,
        config: cli.config,
        abort: controller.signal(),
    };

    let result = match cli.command {
        Commands::Tree {
            grade,
            all_grades,
            subject,
            questions,
            format,
        } => {
            commands::tree::execute(&source, grade, all_grades, subject, questions, format).await
        }
        Commands::Find { id, format } => commands::find::execute(&source, id, format).await,
        Commands::Select { ids, format } => commands::select::execute(&source, ids, format).await,
        Commands::Filter {
            grade,
            unit_type,
            search,
            subject,
            strict_subject,
            format,
        } => {
            commands::filter::execute(
                &source,
                grade,
                unit_type,
                search,
                subject,
                strict_subject,
                format,
            )
            .await
        }
        Commands::Search {
            keyword,
            subject,
            grade,
            all_grades,
            limit,
            offset,
            format,
        } => {
            commands::search::execute(
                &source, keyword, subject, grade, all_grades, limit, offset, format,
            )
            .await
        }
        Commands::Coverage {
            exam_sheet_id,
            format,
            output,
        } => commands::coverage::execute(&source, exam_sheet_id, format, output).await,
        Commands::Stats { unit_ids, format } => {
            commands::stats::execute(&source, unit_ids, format).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
