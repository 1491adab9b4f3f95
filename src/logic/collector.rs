//! Traffic Collection (delegated)
//!
//! Runs the external capture command for a fixed window, then stops it.
//! Capture correctness is the collector's business; this only supervises
//! the process.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::{Child, Command};

/// How long a stopped collector gets to flush and exit before it is killed
const STOP_GRACE: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("no collector command configured")]
    NotConfigured,

    #[error("could not start collector: {0}")]
    Spawn(std::io::Error),

    #[error("collector exited early with {0}")]
    Failed(String),

    #[error("could not stop collector: {0}")]
    Stop(std::io::Error),

    #[error("could not start runtime: {0}")]
    Runtime(std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// Collector finished on its own within the window
    Exited,
    /// Window elapsed and the collector was stopped
    Stopped,
}

/// Run `command` for at most `duration`.
pub async fn collect(command: &[String], duration: Duration) -> Result<CollectionOutcome, CollectorError> {
    let (program, args) = command.split_first().ok_or(CollectorError::NotConfigured)?;

    log::info!("Collecting traffic for {}s with: {}", duration.as_secs(), command.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(CollectorError::Spawn)?;

    let waited = tokio::time::timeout(duration, child.wait()).await;
    match waited {
        Ok(Ok(status)) if status.success() => {
            log::info!("Collector exited before the window closed");
            Ok(CollectionOutcome::Exited)
        }
        Ok(Ok(status)) => Err(CollectorError::Failed(status.to_string())),
        Ok(Err(e)) => Err(CollectorError::Failed(e.to_string())),
        Err(_) => {
            stop(&mut child).await?;
            log::info!("Packet collection complete");
            Ok(CollectionOutcome::Stopped)
        }
    }
}

/// SIGTERM first so the collector can flush its output; kill if it lingers.
async fn stop(child: &mut Child) -> Result<(), CollectorError> {
    if terminate(child) {
        match tokio::time::timeout(STOP_GRACE, child.wait()).await {
            Ok(Ok(_)) => return Ok(()),
            Ok(Err(e)) => return Err(CollectorError::Stop(e)),
            Err(_) => log::warn!("Collector ignored SIGTERM after {}s, killing", STOP_GRACE.as_secs()),
        }
    }
    child.kill().await.map_err(CollectorError::Stop)
}

#[cfg(unix)]
fn terminate(child: &Child) -> bool {
    match child.id() {
        // SAFETY: plain signal delivery to a pid we spawned and have not reaped
        Some(pid) => unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) == 0 },
        None => false,
    }
}

#[cfg(not(unix))]
fn terminate(_child: &Child) -> bool {
    false
}

/// Blocking wrapper for the sequential pipeline
pub fn collect_blocking(command: &[String], duration: Duration) -> Result<CollectionOutcome, CollectorError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CollectorError::Runtime)?;

    rt.block_on(collect(command, duration))
}
