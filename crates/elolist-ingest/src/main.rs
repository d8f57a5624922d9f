//! `elolist` command-line entry point.
//!
//! Reads `elolist.toml` (or the path given with `--config`) layered under
//! `ELOLIST_*` environment variables, opens the SQLite store named by
//! `database_url`, and runs one command.

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use elolist_ingest::{DatabaseUrl, FederationAliases, Pipeline, Settings};
use elolist_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Monthly rating list loader")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "elolist.toml")]
  config: PathBuf,

  /// Print results as JSON instead of text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load this month's list into the store.
  Ingest {
    /// Read this text file instead of the staging directory. Nothing is
    /// archived.
    #[arg(long)]
    file: Option<PathBuf>,
  },
  /// Parse, clean, and validate a list without writing to the store.
  Check {
    #[arg(long)]
    file: Option<PathBuf>,
  },
  /// Load a `code,country,subregion,continent` CSV into the countries table.
  LoadCountries { path: PathBuf },
  /// Show player counts per age group.
  Summary {
    /// Month as `YYYY-MM`; defaults to the latest ingested month.
    #[arg(long, value_parser = parse_month)]
    month: Option<NaiveDate>,
  },
}

fn parse_month(s: &str) -> Result<NaiveDate, String> {
  NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
    .map_err(|_| format!("expected YYYY-MM, got {s:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings =
    Settings::load(Some(cli.config.as_path())).context("failed to load configuration")?;
  let aliases = FederationAliases::load(settings.aliases_path.as_deref())
    .context("failed to load federation alias table")?;

  let store = match settings.database()? {
    DatabaseUrl::File(path) => SqliteStore::open(&path)
      .await
      .with_context(|| format!("failed to open store at {path:?}"))?,
    DatabaseUrl::Memory => SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store")?,
  };

  let pipeline = Pipeline::new(store, settings, aliases);

  match cli.command {
    Command::Ingest { file } => {
      let run = match file {
        Some(path) => pipeline.run_file(&path).await,
        None => pipeline.run().await,
      }
      .context("ingest failed")?;
      if cli.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
      } else {
        println!("{run}");
      }
    }

    Command::Check { file } => {
      let batch = pipeline.check(file.as_deref()).await.context("check failed")?;
      if cli.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
      } else {
        println!("{batch}");
      }
    }

    Command::LoadCountries { path } => {
      let n = pipeline
        .load_countries(&path)
        .await
        .with_context(|| format!("failed to load countries from {path:?}"))?;
      println!("{n} countries loaded");
    }

    Command::Summary { month } => {
      let Some((month, counts)) = pipeline.age_summary(month).await? else {
        println!("store holds no monthly snapshots");
        return Ok(());
      };
      if cli.json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
      } else {
        println!("age groups for {}", month.format("%Y-%m"));
        for count in counts {
          println!("  {:<12} {}", count.group.label(), count.players);
        }
      }
    }
  }

  Ok(())
}
