//! Command dispatch.

use std::io::{self, Write};

use eyre::{Result, WrapErr};
use reportcard_meta::{MetaSnapshot, MetadataStore, UpsertOutcome, score_comment};
use reportcard_storage::{Database, MemoryDatabase};
use reportcard_storage_redb::RedbDatabase;
use tracing::info;

use crate::cli::{Cli, Commands, RecordArgs};
use crate::config::ReportcardConfig;

/// Load configuration, open the database and run the selected command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let mut config = ReportcardConfig::load(cli.config.as_deref())?;
    config.apply_args(&cli.database);

    let database = &config.database;
    let mut out = io::stdout().lock();

    if database.memory {
        let store = MetadataStore::new(MemoryDatabase::with_lock_timeout(database.timeout()));
        // Nothing persists between runs, so there is no separate `init` step.
        store.initialize()?;
        execute(&store, cli.command, &mut out)
    } else {
        let db = RedbDatabase::open(&database.path, database.timeout()).wrap_err_with(|| {
            format!("failed to open database: {}", database.path.display())
        })?;
        info!(path = %database.path.display(), "Opened database");
        execute(&MetadataStore::new(db), cli.command, &mut out)
    }
}

/// Run `command` against `store`, writing results to `out`.
fn execute<DB: Database, W: Write>(
    store: &MetadataStore<DB>,
    command: Commands,
    out: &mut W,
) -> Result<()> {
    match command {
        Commands::Init => {
            store.initialize()?;
            writeln!(out, "initialized")?;
        }
        Commands::Record(args) => record(store, args, out)?,
        Commands::View { repo } => {
            store
                .record_view(&repo)
                .wrap_err_with(|| format!("failed to record view of {repo}"))?;
        }
        Commands::Lookup { repo } => {
            writeln!(out, "{}", store.lookup(&repo))?;
        }
        Commands::Stats { json } => {
            let snapshot = store.snapshot()?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &snapshot)?;
                writeln!(out)?;
            } else {
                print_stats(&snapshot, out)?;
            }
        }
    }
    Ok(())
}

fn record<DB: Database, W: Write>(
    store: &MetadataStore<DB>,
    args: RecordArgs,
    out: &mut W,
) -> Result<()> {
    let outcome = store
        .record_score(&args.repo, args.score, args.files, args.new)
        .wrap_err_with(|| format!("failed to record score for {}", args.repo))?;

    let status = match outcome {
        UpsertOutcome::Inserted => "added to leaderboard",
        UpsertOutcome::Replaced => "leaderboard entry updated",
        UpsertOutcome::Rejected => "below leaderboard cutoff",
        UpsertOutcome::Ineligible => "too few files for leaderboard",
    };
    writeln!(out, "{}: {status}", args.repo)?;

    if let Some(commit) = &args.commit {
        writeln!(out, "{}", score_comment(commit, args.score))?;
    }
    Ok(())
}

fn print_stats<W: Write>(snapshot: &MetaSnapshot, out: &mut W) -> Result<()> {
    writeln!(out, "total repos: {}", snapshot.total_repos)?;

    writeln!(out, "top scores:")?;
    for (rank, record) in snapshot.top.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {:>6.2}  {}  ({} files)",
            rank + 1,
            record.score,
            record.key,
            record.file_count
        )?;
    }

    writeln!(out, "recently viewed:")?;
    for entry in &snapshot.recent {
        writeln!(out, "     {entry}")?;
    }
    Ok(())
}
