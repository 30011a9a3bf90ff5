//! Start, stop and query the external whois server.
//!
//! [`ServiceController::detect`] prefers systemd, then a SysV init script,
//! and finally runs the server binary directly with a pid file.

use std::{
  fmt,
  path::{Path, PathBuf},
  process::Stdio,
};

use anyhow::{Context as _, bail};
use tokio::process::Command;

use crate::settings::ServerSettings;

const SYSTEMD_RUNTIME_DIR: &str = "/run/systemd/system";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformService {
  Systemd { unit: String },
  InitScript { script: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceController {
  /// Delegate to the host's service manager.
  Platform(PlatformService),
  /// Spawn the server ourselves and track it through `pid_file`.
  DirectProcess {
    program:     PathBuf,
    config_file: PathBuf,
    pid_file:    PathBuf,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
  /// `pid` is only known when we started the process ourselves.
  Running { pid: Option<u32> },
  Stopped,
}

impl fmt::Display for ServiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Running { pid: Some(pid) } => write!(f, "running (pid {pid})"),
      Self::Running { pid: None } => f.write_str("running"),
      Self::Stopped => f.write_str("stopped"),
    }
  }
}

impl ServiceController {
  pub fn detect(settings: &ServerSettings) -> Self {
    Self::detect_with(Path::new(SYSTEMD_RUNTIME_DIR), settings)
  }

  fn detect_with(systemd_dir: &Path, settings: &ServerSettings) -> Self {
    if systemd_dir.is_dir() {
      return Self::Platform(PlatformService::Systemd {
        unit: settings.systemd_unit.clone(),
      });
    }
    if settings.init_script.is_file() {
      return Self::Platform(PlatformService::InitScript {
        script: settings.init_script.clone(),
      });
    }
    Self::DirectProcess {
      program:     settings.program.clone(),
      config_file: settings.config_file.clone(),
      pid_file:    settings.pid_file.clone(),
    }
  }

  pub async fn start(&self) -> anyhow::Result<()> {
    match self {
      Self::Platform(platform) => platform.run("start").await,
      Self::DirectProcess { program, config_file, pid_file } => {
        if let Some(pid) = read_pid(pid_file).await?
          && process_alive(pid).await
        {
          bail!("server already running (pid {pid})");
        }

        let child = Command::new(program)
          .arg("-c")
          .arg(config_file)
          .stdin(Stdio::null())
          .stdout(Stdio::null())
          .stderr(Stdio::null())
          .spawn()
          .with_context(|| format!("failed to start {}", program.display()))?;
        let pid = child.id().context("server exited immediately")?;

        tokio::fs::write(pid_file, format!("{pid}\n"))
          .await
          .with_context(|| format!("failed to write {}", pid_file.display()))?;
        tracing::info!(pid, program = %program.display(), "server started");
        Ok(())
      }
    }
  }

  pub async fn stop(&self) -> anyhow::Result<()> {
    match self {
      Self::Platform(platform) => platform.run("stop").await,
      Self::DirectProcess { pid_file, .. } => {
        let Some(pid) = read_pid(pid_file).await? else {
          bail!("server not running (no pid file at {})", pid_file.display());
        };
        if process_alive(pid).await {
          run("kill", &[pid.to_string().as_str()]).await?;
        } else {
          tracing::warn!(pid, "removing stale pid file");
        }
        tokio::fs::remove_file(pid_file)
          .await
          .with_context(|| format!("failed to remove {}", pid_file.display()))?;
        Ok(())
      }
    }
  }

  pub async fn restart(&self) -> anyhow::Result<()> {
    match self {
      Self::Platform(platform) => platform.run("restart").await,
      Self::DirectProcess { pid_file, .. } => {
        if read_pid(pid_file).await?.is_some() {
          self.stop().await?;
        }
        self.start().await
      }
    }
  }

  pub async fn status(&self) -> anyhow::Result<ServiceStatus> {
    let running = match self {
      Self::Platform(PlatformService::Systemd { unit }) => {
        succeeds("systemctl", &["is-active", "--quiet", unit.as_str()]).await?
      }
      Self::Platform(PlatformService::InitScript { script }) => {
        succeeds(&script.to_string_lossy(), &["status"]).await?
      }
      Self::DirectProcess { pid_file, .. } => {
        return Ok(match read_pid(pid_file).await? {
          Some(pid) if process_alive(pid).await => ServiceStatus::Running { pid: Some(pid) },
          _ => ServiceStatus::Stopped,
        });
      }
    };
    Ok(if running { ServiceStatus::Running { pid: None } } else { ServiceStatus::Stopped })
  }
}

impl PlatformService {
  async fn run(&self, action: &str) -> anyhow::Result<()> {
    match self {
      Self::Systemd { unit } => run("systemctl", &[action, unit.as_str()]).await,
      Self::InitScript { script } => run(&script.to_string_lossy(), &[action]).await,
    }
  }
}

async fn run(program: &str, args: &[&str]) -> anyhow::Result<()> {
  if !succeeds(program, args).await? {
    bail!("{program} {} failed", args.join(" "));
  }
  Ok(())
}

async fn succeeds(program: &str, args: &[&str]) -> anyhow::Result<bool> {
  let status = Command::new(program)
    .args(args)
    .stdin(Stdio::null())
    .status()
    .await
    .with_context(|| format!("failed to run {program}"))?;
  Ok(status.success())
}

async fn process_alive(pid: u32) -> bool {
  Command::new("kill")
    .arg("-0")
    .arg(pid.to_string())
    .stdin(Stdio::null())
    .stderr(Stdio::null())
    .status()
    .await
    .is_ok_and(|s| s.success())
}

async fn read_pid(pid_file: &Path) -> anyhow::Result<Option<u32>> {
  match tokio::fs::read_to_string(pid_file).await {
    Ok(raw) => raw
      .trim()
      .parse()
      .map(Some)
      .with_context(|| format!("malformed pid file {}", pid_file.display())),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e).with_context(|| format!("failed to read {}", pid_file.display())),
  }
}
