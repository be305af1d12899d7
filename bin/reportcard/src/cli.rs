//! CLI argument assembly and top-level parser.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reportcard_observability::LogArgs;

/// reportcard - score leaderboard and repository metadata
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH", env = "REPORTCARD_CONFIG", global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Database configuration.
    #[command(flatten)]
    pub(crate) database: DatabaseArgs,

    /// Logging configuration.
    #[command(flatten)]
    pub(crate) logs: LogArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Create the metadata bucket.
    Init,
    /// Record an analysis score for a repository.
    Record(RecordArgs),
    /// Add a repository to the recently viewed list.
    View {
        /// Repository identifier.
        repo: String,
    },
    /// Print a repository's leaderboard score.
    Lookup {
        /// Repository identifier (matched exactly).
        repo: String,
    },
    /// Print the leaderboard, repository count and recent views.
    Stats {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for the 'record' command.
#[derive(Debug, Args)]
pub(crate) struct RecordArgs {
    /// Repository identifier.
    pub(crate) repo: String,

    /// Analysis score between 0 and 1.
    #[arg(long, value_parser = parse_score01)]
    pub(crate) score: f64,

    /// Number of files analyzed.
    #[arg(long)]
    pub(crate) files: u64,

    /// The repository has not been recorded before.
    #[arg(long)]
    pub(crate) new: bool,

    /// Commit the score belongs to; prints the pull request comment text.
    #[arg(long, value_name = "SHA")]
    pub(crate) commit: Option<String>,
}

/// Database command-line overrides.
#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "Database")]
pub(crate) struct DatabaseArgs {
    /// Database file path.
    #[arg(long = "db.path", value_name = "PATH", global = true)]
    pub(crate) path: Option<PathBuf>,

    /// Maximum time to wait for the database or its write lock.
    #[arg(long = "db.timeout", value_name = "MS", global = true)]
    pub(crate) timeout_ms: Option<u64>,

    /// Use an in-memory database (no persistence).
    #[arg(long = "db.memory", global = true)]
    pub(crate) memory: bool,
}

fn parse_score01(value: &str) -> Result<f64, String> {
    let score: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(format!("score must be between 0 and 1, got {score}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        let cli = Cli::try_parse_from([
            "reportcard",
            "--db.path",
            "/tmp/rc.redb",
            "record",
            "github.com/acme/widgets",
            "--score",
            "0.875",
            "--files",
            "240",
            "--new",
        ])
        .unwrap();

        assert_eq!(cli.database.path, Some(PathBuf::from("/tmp/rc.redb")));
        let Commands::Record(args) = cli.command else {
            panic!("expected record command");
        };
        assert_eq!(args.repo, "github.com/acme/widgets");
        assert_eq!(args.score, 0.875);
        assert_eq!(args.files, 240);
        assert!(args.new);
        assert!(args.commit.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["reportcard", "lookup", "repo", "--db.memory", "-vv"]).unwrap();
        assert!(cli.database.memory);
        assert_eq!(cli.logs.verbosity, 2);
    }

    #[test]
    fn test_score_out_of_range() {
        let result = Cli::try_parse_from([
            "reportcard",
            "record",
            "repo",
            "--score",
            "1.5",
            "--files",
            "100",
        ]);
        assert!(result.is_err());
    }
}
