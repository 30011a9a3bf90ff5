//! `rwhoisctl`: manage RWHOIS records and the whois server process.
//!
//! # Usage
//!
//! ```text
//! rwhoisctl add-org ORG-1 Acme "1 Rd" Town ST 00000 US 555 a@x.com
//! rwhoisctl update-org ORG-1 phone 999
//! rwhoisctl --data-dir /srv/rwhois delete-network NET-1 ipv4
//! rwhoisctl rebuild-indexes
//! ```
//!
//! Exits 0 on success and 1 on any failure, usage errors included.

mod commands;
mod service;
mod settings;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use commands::Command;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rwhoisctl", version, about = "Manage RWHOIS records and the whois server")]
struct Args {
  /// Path to a TOML config file; missing is fine.
  #[arg(short, long, value_name = "FILE", default_value = "rwhoisctl.toml", global = true)]
  config: PathBuf,

  /// Root of the record tree (overrides the config file).
  #[arg(long, value_name = "DIR", global = true)]
  data_dir: Option<PathBuf>,

  /// Indexer program to run after each change (overrides the config file).
  #[arg(long, value_name = "PROGRAM", global = true)]
  indexer: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  let args = match Args::try_parse() {
    Ok(args) => args,
    Err(e) => {
      let _ = e.print();
      // Help and version requests are not errors.
      return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
    }
  };

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  match run(args).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {e:#}");
      ExitCode::FAILURE
    }
  }
}

async fn run(args: Args) -> anyhow::Result<()> {
  // CLI flags override the config file, which overrides defaults.
  let mut settings = Settings::load(&args.config)?;
  if let Some(data_dir) = args.data_dir {
    settings.data_dir = data_dir;
  }
  if let Some(program) = args.indexer {
    settings.indexer.program = program;
  }
  commands::run(args.command, &settings).await
}
