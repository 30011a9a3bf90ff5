//! `rwhoisctl` configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the TOML file named by
//! `--config` (optional), `RWHOIS_*` environment variables (`__` separates
//! nested keys, e.g. `RWHOIS_SERVER__PID_FILE`), then the `--data-dir` and
//! `--indexer` flags applied by `main`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rwhois_store_fs::IndexerConfig;
use serde::Deserialize;

const INSTALL_ROOT: &str = "/usr/local/rwhoisd";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub data_dir: PathBuf,
  pub indexer:  IndexerConfig,
  pub server:   ServerSettings,
}

/// Where to find the external whois server and how to drive it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
  pub systemd_unit: String,
  pub init_script:  PathBuf,
  /// Server binary, used when no service manager is available.
  pub program:      PathBuf,
  pub config_file:  PathBuf,
  pub pid_file:     PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_dir: Path::new(INSTALL_ROOT).join("data"),
      indexer:  IndexerConfig::default(),
      server:   ServerSettings::default(),
    }
  }
}

impl Default for ServerSettings {
  fn default() -> Self {
    let root = Path::new(INSTALL_ROOT);
    Self {
      systemd_unit: "rwhoisd".to_string(),
      init_script:  PathBuf::from("/etc/init.d/rwhoisd"),
      program:      root.join("bin/rwhoisd"),
      config_file:  root.join("rwhoisd.conf"),
      pid_file:     root.join("rwhoisd.pid"),
    }
  }
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("RWHOIS")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}
