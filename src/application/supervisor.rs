//! # Availability Supervisor
//!
//! Makes sure the companion service is reachable before a plan runs. If the health
//! probe fails it launches the service as a detached background process and polls
//! until the service answers or the start-up window closes.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::config::CompanionConfig;
use crate::domain::traits::CompanionService;
use crate::infrastructure::mcp::SharedCompanion;

pub const COMPANION_BINARY: &str = "raze-mcp";

/// How to start the companion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Launcher {
    /// Launcher for `raze-mcp` serving `root` on `port`.
    pub fn companion(program: PathBuf, port: u16, root: &Path) -> Self {
        Self {
            program,
            args: vec![
                "--port".to_string(),
                port.to_string(),
                "--root".to_string(),
                root.display().to_string(),
            ],
        }
    }

    /// Configured launcher if present, else `raze-mcp` beside the running executable.
    pub fn locate(config: &CompanionConfig, port: u16, root: &Path) -> Option<Self> {
        if let Some(path) = &config.launcher {
            if path.is_file() {
                return Some(Self::companion(path.clone(), port, root));
            }
            tracing::warn!("Configured launcher {} does not exist", path.display());
            return None;
        }

        let install_dir = std::env::current_exe().ok()?.parent()?.to_path_buf();
        let candidate =
            install_dir.join(format!("{}{}", COMPANION_BINARY, std::env::consts::EXE_SUFFIX));
        candidate.is_file().then(|| Self::companion(candidate, port, root))
    }

    fn spawn_detached(&self) -> std::io::Result<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group: a Ctrl-C aimed at the CLI must not take the service down.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd.spawn()
    }
}

/// Owns the companion's availability, and the handle of any process it launched.
pub struct AvailabilitySupervisor {
    service: SharedCompanion,
    launcher: Option<Launcher>,
    poll_interval: Duration,
    startup_timeout: Duration,
    child: Mutex<Option<Child>>,
}

impl AvailabilitySupervisor {
    pub fn new(service: SharedCompanion, launcher: Option<Launcher>) -> Self {
        Self {
            service,
            launcher,
            poll_interval: Duration::from_millis(250),
            startup_timeout: Duration::from_millis(5000),
            child: Mutex::new(None),
        }
    }

    pub fn from_config(service: SharedCompanion, config: &CompanionConfig, root: &Path) -> Self {
        let launcher = Launcher::locate(config, service.port(), root);
        Self::new(service, launcher).with_timing(
            Duration::from_millis(config.poll_interval_ms),
            Duration::from_millis(config.startup_timeout_ms),
        )
    }

    pub fn with_timing(mut self, poll_interval: Duration, startup_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.startup_timeout = startup_timeout;
        self
    }

    pub fn launcher(&self) -> Option<&Launcher> {
        self.launcher.as_ref()
    }

    /// Probe, start the service if needed, probe again. Never errors.
    pub async fn ensure_available(&self) -> bool {
        if self.service.health().await {
            return true;
        }

        let Some(launcher) = &self.launcher else {
            tracing::warn!("Companion service is down and no launcher was found");
            return false;
        };

        match launcher.spawn_detached() {
            Ok(child) => {
                tracing::info!(
                    "Launched {} (pid {}) on port {}",
                    launcher.program.display(),
                    child.id(),
                    self.service.port()
                );
                if let Ok(mut slot) = self.child.lock() {
                    *slot = Some(child);
                }
            }
            Err(e) => {
                tracing::error!("Failed to launch {}: {}", launcher.program.display(), e);
                return false;
            }
        }

        self.wait_until_healthy().await
    }

    async fn wait_until_healthy(&self) -> bool {
        let deadline = tokio::time::Instant::now() + self.startup_timeout;
        loop {
            tokio::time::sleep(self.poll_interval).await;
            if self.service.health().await {
                tracing::info!("Companion service is up");
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(
                    "Companion service did not become healthy within {:?}",
                    self.startup_timeout
                );
                return false;
            }
        }
    }

    /// Whether this supervisor launched a process during its lifetime.
    pub fn launched(&self) -> bool {
        self.child.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Liveness of the launched process, queried through its handle.
    /// `None` if nothing was launched.
    pub fn launched_process_running(&self) -> Option<bool> {
        let mut slot = self.child.lock().ok()?;
        let child = slot.as_mut()?;
        Some(matches!(child.try_wait(), Ok(None)))
    }
}
