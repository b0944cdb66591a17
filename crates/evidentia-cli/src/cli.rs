//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use evidentia_domain::Direction;
use evidentia_store::Backend;
use std::path::PathBuf;

/// Evidentia - Maintain a scored registry of scientific evidence.
#[derive(Debug, Parser)]
#[command(name = "evidentia")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Study store (JSON document, or SQLite for .db/.sqlite)
    #[arg(short, long, global = true, env = "EVIDENTIA_STORE")]
    pub store: Option<PathBuf>,

    /// Storage backend, overriding the one inferred from the store path
    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}

/// Storage backend options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum BackendArg {
    /// Single JSON document
    Json,
    /// SQLite database
    Sqlite,
}

impl From<BackendArg> for Backend {
    fn from(backend: BackendArg) -> Self {
        match backend {
            BackendArg::Json => Backend::Json,
            BackendArg::Sqlite => Backend::Sqlite,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an empty study store
    Init,

    /// Import a markdown study registry
    Import(ImportArgs),

    /// Import study references from an evidence page's JSON
    ImportRefs(ImportRefsArgs),

    /// Show the studies behind a claim, best first
    Query(QueryArgs),

    /// Print the claim summary index
    Summary,

    /// Rewrite the claim summary table inside a markdown registry
    ExportSummary(ExportSummaryArgs),

    /// Export citation data for a claim (or all claims)
    ExportRefs(ExportRefsArgs),

    /// List studies due for re-verification
    Stale,

    /// List claims that need more evidence
    Gaps(CategoryArgs),

    /// Mark a study as superseded by another
    Supersede(SupersedeArgs),

    /// Retract a study
    Retract(RetractArgs),

    /// Mark a study as verified this month
    Reverify(ReverifyArgs),

    /// List studies missing required fields
    EnrichAll,

    /// Add a study interactively (DOI-checked)
    Add,

    /// Show registry statistics
    Stats,

    /// Check every study's DOI against the resolver
    VerifyDois(CategoryArgs),
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// Markdown registry file
    pub file: PathBuf,
}

/// Arguments for the import-refs command.
#[derive(Debug, Parser)]
pub struct ImportRefsArgs {
    /// Page slug, e.g. `sleep` for `sleep.json`
    pub page: String,

    /// Directory holding the page JSON files
    #[arg(short, long, default_value = "evidence-pages")]
    pub dir: PathBuf,
}

/// Arguments for the query command.
#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Claim id, e.g. `protein→mortality` (`->` also accepted)
    pub claim: String,

    /// Only studies of this direction (+, −, ±)
    #[arg(short, long, value_parser = parse_direction, allow_hyphen_values = true)]
    pub direction: Option<Direction>,
}

/// Arguments for the export-summary command.
#[derive(Debug, Parser)]
pub struct ExportSummaryArgs {
    /// Markdown document containing the summary table
    #[arg(default_value = "study-registry.md")]
    pub file: PathBuf,
}

/// Arguments for the export-refs command.
#[derive(Debug, Parser)]
pub struct ExportRefsArgs {
    /// Claim id, or `all`
    pub claim: String,

    /// Emit JSON regardless of the output format
    #[arg(long)]
    pub json: bool,
}

/// Category filter shared by gaps and verify-dois.
#[derive(Debug, Parser)]
pub struct CategoryArgs {
    /// Restrict to one content category (e.g. sleep, protein)
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the supersede command.
#[derive(Debug, Parser)]
pub struct SupersedeArgs {
    /// Study being replaced
    pub old_id: String,

    /// Replacement study
    pub new_id: String,
}

/// Arguments for the retract command.
#[derive(Debug, Parser)]
pub struct RetractArgs {
    /// Study to retract
    pub study_id: String,

    /// Why it is retracted
    #[arg(short, long)]
    pub reason: String,
}

/// Arguments for the reverify command.
#[derive(Debug, Parser)]
pub struct ReverifyArgs {
    /// Study checked again
    pub study_id: String,
}

fn parse_direction(s: &str) -> std::result::Result<Direction, String> {
    Direction::parse(s).ok_or_else(|| format!("invalid direction '{}': expected +, −, or ±", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_direction_accepts_hyphen() {
        let cli = Cli::try_parse_from(["evidentia", "query", "protein->muscle", "-d", "-"]).unwrap();
        match cli.command {
            Command::Query(args) => {
                assert_eq!(args.claim, "protein->muscle");
                assert_eq!(args.direction, Some(Direction::Contradicts));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "evidentia",
            "stats",
            "--store",
            "registry.db",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("registry.db")));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }

    #[test]
    fn test_retract_requires_reason() {
        assert!(Cli::try_parse_from(["evidentia", "retract", "lee-2020-ab12"]).is_err());
    }
}
