use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use gistbook::search::DEFAULT_LIMIT;

#[derive(Debug, Parser)]
#[command(
    name = "gistbook",
    about = "Category navigation and search for a catalogue of notebooks"
)]
pub struct Cli {
    /// Override the directory holding the catalogue artifacts
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the navigation tree and search documents artifacts
    Build(BuildArgs),
    /// Search the catalogue
    Search(SearchArgs),
    /// Show a document's breadcrumb, tags and table of contents
    Show(ShowArgs),
    /// Show catalogue statistics
    Stats(StatsArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Record source, shared by commands that read document records --

#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Convert notebooks found under this directory instead of reading the
    /// metadata file
    #[arg(long, conflicts_with = "metadata")]
    pub notebooks: Option<PathBuf>,

    /// Metadata file to read (defaults to notebooks-metadata.json in the
    /// data directory)
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Glob of notebook paths to skip, relative to --notebooks (repeatable)
    #[arg(long = "exclude", requires = "notebooks")]
    pub exclude: Vec<String>,
}

// -- Build --

#[derive(Debug, Parser)]
pub struct BuildArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Number of results to return
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
    pub count: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Show --

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Document id or route, e.g. statistics/distribution/weibull
    pub id: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Stats --

#[derive(Debug, Parser)]
pub struct StatsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "gistbook",
            &mut std::io::stdout(),
        );
    }
}
