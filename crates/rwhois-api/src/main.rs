//! rwhois-apid: JSON API server for an RWHOIS data directory.
//!
//! Settings come from `rwhois-apid.toml` (or `--config`) overlaid with
//! `RWHOIS_*` environment variables; nested keys use `__`, as in
//! `RWHOIS_INDEXER__PROGRAM`. `data_dir` is taken literally, so relative
//! paths resolve against the working directory.
//!
//! `rwhois-apid hash-password < password.txt` prints the argon2 PHC string
//! to put in `auth_password_hash`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, anyhow, ensure};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use rand_core::OsRng;
use rwhois_api::{AuthConfig, ServerConfig};
use rwhois_core::Directory;
use rwhois_store_fs::{ExternalIndexer, FsStore};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "RWHOIS record API server")]
struct Cli {
  /// TOML settings file; missing is fine when the environment covers it.
  #[arg(short, long, global = true, default_value = "rwhois-apid.toml")]
  config: PathBuf,

  #[command(subcommand)]
  mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
  /// Serve the record API (the default).
  Serve,
  /// Read a password from stdin and print its argon2 hash.
  HashPassword,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  match cli.mode.unwrap_or(Mode::Serve) {
    Mode::HashPassword => {
      println!("{}", hash_password(&mut std::io::stdin().lock())?);
      Ok(())
    }
    Mode::Serve => serve(load_config(&cli.config)?).await,
  }
}

fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("RWHOIS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .and_then(config::Config::try_deserialize)
    .with_context(|| format!("invalid settings from {} and RWHOIS_*", path.display()))
}

/// Hash the first line of `input`. Piped input without a newline works too.
fn hash_password(input: &mut impl std::io::Read) -> anyhow::Result<String> {
  let mut raw = String::new();
  input.read_to_string(&mut raw).context("failed to read password")?;
  let password = raw.lines().next().unwrap_or_default();
  ensure!(!password.is_empty(), "empty password");

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| anyhow!("argon2 error: {e}"))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = FsStore::init(&cfg.data_dir)
    .await
    .with_context(|| format!("failed to lay out data directory {}", cfg.data_dir.display()))?;
  let indexer = ExternalIndexer::new(&cfg.data_dir, cfg.indexer.clone());
  let directory = Arc::new(Directory::new(store, indexer));
  let auth = Arc::new(AuthConfig {
    username:      cfg.auth_username,
    password_hash: cfg.auth_password_hash,
  });

  let address = format!("{}:{}", cfg.host, cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!(data_dir = %cfg.data_dir.display(), "listening on http://{address}");

  axum::serve(listener, rwhois_api::api_router(directory, auth))
    .with_graceful_shutdown(async {
      if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutting down");
      }
    })
    .await
    .context("server error")
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHash, PasswordVerifier};

  use super::*;

  #[test]
  fn hashed_password_verifies() {
    let hash = hash_password(&mut "hunter2\n".as_bytes()).unwrap();
    let parsed = PasswordHash::new(&hash).unwrap();
    assert!(Argon2::default().verify_password(b"hunter2", &parsed).is_ok());
    assert!(Argon2::default().verify_password(b"hunter2\n", &parsed).is_err());
  }

  #[test]
  fn empty_password_is_refused() {
    assert!(hash_password(&mut "".as_bytes()).is_err());
    assert!(hash_password(&mut "\n".as_bytes()).is_err());
  }

  #[test]
  fn config_file_and_defaults_combine() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("rwhois-apid.toml");
    std::fs::write(
      &path,
      "data_dir = \"/srv/rwhois\"\nauth_username = \"admin\"\nauth_password_hash = \"x\"\n",
    )
    .unwrap();

    let cfg = load_config(&path).unwrap();
    assert_eq!(cfg.data_dir, PathBuf::from("/srv/rwhois"));
    assert_eq!(cfg.port, 4322);
    assert_eq!(cfg.auth_username, "admin");
  }
}
