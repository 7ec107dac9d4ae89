//! vedascore CLI: quiz rendering, dashboards and page snapshots from the
//! command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use vedascore_core::tools::EditorTool;

mod commands;
mod console;

#[derive(Parser)]
#[command(
    name = "vedascore",
    version,
    about = "Client for the VedaScore coding-education platform"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use built-in sample data instead of a server
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter vedascore.toml
    Init,

    /// Render quiz markdown to HTML
    Quiz {
        /// Markdown file (stdin when omitted or "-")
        file: Option<PathBuf>,
    },

    /// List community posts
    Feed {
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// List student submissions (instructor)
    Submissions,

    /// Best attempt per student and assignment (instructor)
    Leaderboard,

    /// Delete a submission, hiding it locally if the server refuses
    Delete {
        submission_id: u64,

        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Check submissions for plagiarism (instructor)
    Plagiarism {
        /// Check a single submission
        #[arg(long, conflicts_with = "assignment")]
        submission: Option<u64>,

        /// Check every submission of an assignment
        #[arg(long, required_unless_present = "submission")]
        assignment: Option<u64>,
    },

    /// List live and past assignments (instructor)
    Assignments,

    /// Student assignments, deadlines and progress
    Student {
        /// Also print AI feedback
        #[arg(long)]
        feedback: bool,

        /// Keep refreshing the dashboard quiz until Ctrl-C
        #[arg(long)]
        watch: bool,
    },

    /// Student analytics
    Analytics {
        /// Print chart configs as JSON
        #[arg(long)]
        json: bool,

        /// Keep refreshing until Ctrl-C
        #[arg(long)]
        watch: bool,
    },

    /// Run an editor tool on a source file
    Tool {
        /// run, explain, check_errors, convert, check_plagiarism, optimize,
        /// document or debug
        tool: EditorTool,

        /// Source file
        file: PathBuf,

        /// Target language for convert
        #[arg(long)]
        to: Option<String>,
    },

    /// Render a page, apply actions, and write the result as HTML
    Page {
        /// community, instructor, student, analytics or editor
        page: commands::page::PageKind,

        /// Action to dispatch, e.g. "community.like post_id=3" (repeatable)
        #[arg(long = "action")]
        actions: Vec<String>,

        /// Output file (default: vedascore-<page>.html)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "vedascore=info"
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            ),
        )
        .init();

    let cli = Cli::parse();
    let source = commands::Source {
        config: cli.config,
        demo: cli.demo,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Quiz { file } => commands::quiz::execute(file),
        Commands::Feed { page } => commands::feed::execute(&source, page).await,
        Commands::Submissions => commands::submissions::execute(&source).await,
        Commands::Leaderboard => commands::submissions::leaderboard(&source).await,
        Commands::Delete { submission_id, yes } => {
            commands::delete::execute(&source, submission_id, yes).await
        }
        Commands::Plagiarism {
            submission,
            assignment,
        } => commands::plagiarism::execute(&source, submission, assignment).await,
        Commands::Assignments => commands::assignments::execute(&source).await,
        Commands::Student { feedback, watch } => {
            commands::student::execute(&source, feedback, watch).await
        }
        Commands::Analytics { json, watch } => {
            commands::analytics::execute(&source, json, watch).await
        }
        Commands::Tool { tool, file, to } => commands::tool::execute(&source, tool, file, to).await,
        Commands::Page {
            page,
            actions,
            output,
        } => commands::page::execute(&source, page, actions, output).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
