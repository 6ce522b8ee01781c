//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// Full result as JSON
    Json,
}

/// CLI arguments for concord
#[derive(Parser, Debug)]
#[command(name = "concord")]
#[command(author, version, about = "Many samples in, one trustworthy answer (or several distinct ones) out")]
#[command(long_about = r#"
Concord turns N independent generations into structured output.

  extract   Self-consistency: parse every sample against a schema and
            aggregate into one answer with a confidence and review level
  mine      Exploration: quality-filter, cluster and rank the samples so
            minority answers survive as candidates
  schemas   List the registered schemas

Generations are served from a replay file (see --replay).

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./concord.toml      Project-level config
3. ~/.config/concord/config.toml   Global config
4. CONCORD_* environment variables (CONCORD_SAMPLING__SAMPLES=9)

Example:
  concord extract --schema risk --query "What is the main delivery risk?" --replay risk.json
  concord mine --schema recommendation --query "How do we cut costs?" --replay recs.json -v
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long, global = true)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate samples into one consensus answer
    Extract(RunArgs),
    /// Rank distinct answers across samples
    Mine(RunArgs),
    /// List registered schemas
    Schemas,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Registered schema name
    #[arg(short, long, value_name = "NAME", required_unless_present = "schema_file")]
    pub schema: Option<String>,

    /// JSON schema definition used instead of a registered one
    #[arg(long, value_name = "PATH", conflicts_with = "schema")]
    pub schema_file: Option<PathBuf>,

    /// The question every sample answers
    #[arg(short, long)]
    pub query: String,

    /// File whose contents are passed as context
    #[arg(long, value_name = "PATH")]
    pub context_file: Option<PathBuf>,

    /// Recorded generations to replay
    #[arg(long, value_name = "PATH")]
    pub replay: PathBuf,

    /// Number of samples to draw
    #[arg(short = 'n', long)]
    pub samples: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub format: OutputFormat,

    /// Suppress progress events
    #[arg(long)]
    pub quiet: bool,
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
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "concord", "extract", "--schema", "risk", "--query", "q", "--replay", "r.json", "-n",
            "7", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.schema.as_deref(), Some("risk"));
        assert_eq!(args.samples, Some(7));
        assert_eq!(args.format, OutputFormat::Summary);
    }

    #[test]
    fn test_schema_or_schema_file_required() {
        assert!(Cli::try_parse_from(["concord", "mine", "--query", "q", "--replay", "r.json"]).is_err());
        assert!(
            Cli::try_parse_from([
                "concord", "mine", "--schema-file", "s.json", "--query", "q", "--replay", "r.json",
                "--format", "json",
            ])
            .is_ok()
        );
    }
}
