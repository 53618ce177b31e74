//! Chromium process supervisor.
//!
//! This module provides [`ChromiumSupervisor`], which owns the lifecycle of
//! exactly one headless Chromium process and exposes its remote-debugging
//! endpoint to the render pipeline.
//!
//! # Overview
//!
//! The supervisor provides:
//! - **Lazy start**: the engine spawns on the first [`ensure_running`] call
//! - **Warm reuse**: the process is kept alive between requests, because
//!   engine startup cost dominates render latency
//! - **Lazy death detection**: an engine that crashed is noticed on the next
//!   liveness or ensure call and respawned; there is no background watchdog
//! - **Bounded stop**: graceful termination with a grace period, then
//!   force-kill
//!
//! # State machine
//!
//! ```text
//! Stopped ──ensure_running──▶ Starting ──warm-up ok──▶ Running
//!    ▲                           │                        │
//!    │◀───────spawn failure──────┘                        │
//!    │◀──────────process died (detected lazily)───────────┤
//!    │                                                    ▼
//!    └──────────────── Stopped ◀──grace/kill── Stopping ──┘
//! ```
//!
//! # Concurrency
//!
//! All state transitions are serialized under a single mutex, including the
//! warm-up delay. Two concurrent [`ensure_running`] calls on a stopped
//! supervisor therefore spawn exactly one process: the second caller blocks
//! on the lock, then observes the running engine and returns the same
//! endpoint. Render traffic itself never takes this lock.
//!
//! # Ownership
//!
//! The supervisor is an explicitly constructed, explicitly owned service
//! object: create it at application startup, share it as
//! `Arc<ChromiumSupervisor>`, and call [`stop`] from the host's own teardown
//! sequence. `Drop` stops the engine as a backstop so a dropped supervisor
//! never leaks the child process, but explicit shutdown is the contract.
//!
//! [`ensure_running`]: ChromiumSupervisor::ensure_running
//! [`stop`]: ChromiumSupervisor::stop

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::SupervisorConfig;
use crate::error::{RenderError, Result};
use crate::locator::EngineLocator;

// ============================================================================
// Connection endpoint
// ============================================================================

/// Local address the engine's remote-debugging interface listens on.
///
/// Valid only while the supervisor reports the engine running. No
/// authentication; trust is bounded to localhost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEndpoint {
    host: String,
    port: u16,
}

impl ConnectionEndpoint {
    pub(crate) fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    /// The debug port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base HTTP URL of the DevTools endpoint, e.g. `http://127.0.0.1:9222`.
    pub fn http_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// URL of the version document carrying the WebSocket debugger URL.
    pub fn json_version_url(&self) -> String {
        format!("{}/json/version", self.http_url())
    }
}

impl std::fmt::Display for ConnectionEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.http_url())
    }
}

// ============================================================================
// Engine state
// ============================================================================

/// Lifecycle state of the supervised engine process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No engine process exists.
    Stopped,
    /// Spawn issued, warm-up interval not yet elapsed.
    Starting,
    /// Process confirmed live after warm-up.
    Running,
    /// Termination requested, grace period in progress.
    Stopping,
}

/// Health report for external status queries.
///
/// Produced by [`ChromiumSupervisor::status`], which never fails: internal
/// errors are converted into the `error` status.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EngineStatusReport {
    /// `running`, `stopped`, or `error`.
    pub status: &'static str,
    /// Debug port, present only while running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

// ============================================================================
// Spawn arguments
// ============================================================================

/// Fixed argument list the engine is spawned with.
///
/// Headless operation, the remote-debugging port, and disabled sandboxing,
/// background networking, auto-update, and telemetry. Required for reliable
/// operation in constrained and containerized environments. The start page
/// is `about:blank`; every render opens its own tab.
pub fn engine_args(debug_port: u16) -> Vec<String> {
    vec![
        "--headless=new".to_string(),
        "--disable-gpu".to_string(),
        format!("--remote-debugging-port={}", debug_port),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-setuid-sandbox".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-extensions".to_string(),
        "--disable-sync".to_string(),
        "--disable-translate".to_string(),
        "--metrics-recording-only".to_string(),
        "--no-first-run".to_string(),
        "--safebrowsing-disable-auto-update".to_string(),
        "--disable-client-side-phishing-detection".to_string(),
        "--disable-component-update".to_string(),
        "--disable-domain-reliability".to_string(),
        "--disable-features=TranslateUI".to_string(),
        "--hide-scrollbars".to_string(),
        "--mute-audio".to_string(),
        "about:blank".to_string(),
    ]
}

// ============================================================================
// Supervisor
// ============================================================================

/// Internal mutable state, serialized under the supervisor's mutex.
struct EngineProcess {
    state: EngineState,
    child: Option<Child>,
    /// Resolved once per process lifetime; kept for log context.
    executable: Option<PathBuf>,
}

/// Supervisor owning at most one headless Chromium process.
///
/// # Example
///
/// ```rust,ignore
/// use chromeprint::{ChromiumSupervisor, SupervisorConfig, SystemEngineLocator};
///
/// let supervisor = ChromiumSupervisor::new(
///     SupervisorConfig::default(),
///     Box::new(SystemEngineLocator::with_defaults()),
/// );
///
/// let endpoint = supervisor.ensure_running()?;
/// println!("DevTools at {}", endpoint);
///
/// // ... render traffic ...
///
/// supervisor.stop(); // host teardown
/// ```
pub struct ChromiumSupervisor {
    config: SupervisorConfig,
    locator: Box<dyn EngineLocator>,
    inner: Mutex<EngineProcess>,
}

impl ChromiumSupervisor {
    /// Create a supervisor in the `Stopped` state. No process is spawned
    /// until the first [`ensure_running`](Self::ensure_running) call.
    pub fn new(config: SupervisorConfig, locator: Box<dyn EngineLocator>) -> Self {
        log::debug!(
            "Initializing supervisor (port {}, warmup {:?}, grace {:?})",
            config.debug_port,
            config.warmup,
            config.shutdown_grace
        );
        Self {
            config,
            locator,
            inner: Mutex::new(EngineProcess {
                state: EngineState::Stopped,
                child: None,
                executable: None,
            }),
        }
    }

    /// Wrap the supervisor in an `Arc` for sharing with the pipeline and
    /// status endpoints.
    pub fn into_shared(self) -> Arc<ChromiumSupervisor> {
        Arc::new(self)
    }

    /// The supervisor configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// The fixed local endpoint the engine listens on.
    ///
    /// Valid only while [`is_running`](Self::is_running) is true.
    pub fn endpoint(&self) -> ConnectionEndpoint {
        ConnectionEndpoint::new(self.config.host.clone(), self.config.debug_port)
    }

    /// Ensure the engine process is running and return its endpoint.
    ///
    /// Spawns the engine lazily if it is absent or has exited, then blocks
    /// for the fixed warm-up interval before confirming liveness.
    /// Idempotent: if the engine is already live this returns immediately
    /// without spawning.
    ///
    /// The warm-up wait happens under the state lock, so concurrent callers
    /// on a stopped supervisor serialize: exactly one spawns, the rest
    /// observe the running engine.
    ///
    /// # Errors
    ///
    /// - [`RenderError::EngineResolution`] when the locator has no executable
    /// - [`RenderError::ProcessStart`] when the spawn fails or the process
    ///   exits before the warm-up interval elapses
    pub fn ensure_running(&self) -> Result<ConnectionEndpoint> {
        let mut inner = self.inner.lock().unwrap();

        // Lazy death detection: a live child means we are done.
        if Self::child_is_live(&mut inner) {
            log::trace!("Engine already running");
            return Ok(self.endpoint());
        }

        inner.state = EngineState::Starting;

        let executable = match self.locator.resolve() {
            Ok(path) => path,
            Err(e) => {
                inner.state = EngineState::Stopped;
                log::error!("Engine resolution failed: {}", e);
                return Err(e);
            }
        };

        log::info!(
            "Starting Chromium: {} (debug port {})",
            executable.display(),
            self.config.debug_port
        );

        let spawn_result = Command::new(&executable)
            .args(engine_args(self.config.debug_port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let child = match spawn_result {
            Ok(child) => child,
            Err(e) => {
                inner.state = EngineState::Stopped;
                log::error!("Failed to spawn {}: {}", executable.display(), e);
                return Err(RenderError::ProcessStart(format!(
                    "spawn of {} failed: {}",
                    executable.display(),
                    e
                )));
            }
        };

        inner.child = Some(child);
        inner.executable = Some(executable);

        // Fixed warm-up: the debug port accepts connections deterministically
        // shortly after spawn. Held under the lock so a concurrent caller
        // cannot race a second spawn.
        std::thread::sleep(self.config.warmup);

        match inner.child.as_mut().unwrap().try_wait() {
            Ok(None) => {
                inner.state = EngineState::Running;
                log::info!("Chromium started on port {}", self.config.debug_port);
                Ok(self.endpoint())
            }
            Ok(Some(status)) => {
                inner.child = None;
                inner.state = EngineState::Stopped;
                log::error!("Chromium exited during warm-up: {}", status);
                Err(RenderError::ProcessStart(format!(
                    "engine exited during warm-up with {}",
                    status
                )))
            }
            Err(e) => {
                inner.child = None;
                inner.state = EngineState::Stopped;
                log::error!("Could not poll engine after spawn: {}", e);
                Err(RenderError::ProcessStart(format!(
                    "could not poll engine after spawn: {}",
                    e
                )))
            }
        }
    }

    /// Current lifecycle state of the supervised engine.
    ///
    /// Refreshes liveness first, so a crashed engine reports `Stopped`
    /// rather than a stale `Running`. `Starting` and `Stopping` are only
    /// observable from other threads while a transition is in flight.
    pub fn state(&self) -> EngineState {
        let mut inner = self.inner.lock().unwrap();
        Self::child_is_live(&mut inner);
        inner.state
    }

    /// Non-blocking liveness check: the process exists and has not exited.
    ///
    /// Does not verify the debug port accepts connections. A crashed engine
    /// is detected here (or in `ensure_running`) and transitions the state
    /// to `Stopped`.
    pub fn is_running(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        Self::child_is_live(&mut inner)
    }

    /// Stop the engine: request graceful termination, wait up to the
    /// configured grace period, then force-kill.
    ///
    /// Internal state is cleared afterwards even when termination errored.
    /// Idempotent: a stopped supervisor is a no-op.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();

        let Some(mut child) = inner.child.take() else {
            log::trace!("stop() on a stopped supervisor, nothing to do");
            inner.state = EngineState::Stopped;
            return;
        };

        inner.state = EngineState::Stopping;
        log::info!("Stopping Chromium process");

        request_graceful_termination(&mut child);

        if !wait_with_grace(&mut child, self.config.shutdown_grace) {
            log::warn!("Chromium did not terminate gracefully, forcing kill");
            if let Err(e) = child.kill() {
                log::warn!("Force-kill failed (process may already be gone): {}", e);
            }
            // Reap so the child does not linger as a zombie.
            if let Err(e) = child.wait() {
                log::warn!("Could not reap engine process: {}", e);
            }
        }

        inner.state = EngineState::Stopped;
        inner.executable = None;
    }

    /// Health report for external status endpoints.
    ///
    /// Never fails: lock poisoning and liveness-poll errors are reported as
    /// the `error` status.
    pub fn status(&self) -> EngineStatusReport {
        let Ok(mut inner) = self.inner.lock() else {
            return EngineStatusReport {
                status: "error",
                port: None,
            };
        };

        if Self::child_is_live(&mut inner) {
            EngineStatusReport {
                status: "running",
                port: Some(self.config.debug_port),
            }
        } else {
            EngineStatusReport {
                status: "stopped",
                port: None,
            }
        }
    }

    /// Poll the child, clearing state if it has exited. Caller holds the lock.
    fn child_is_live(inner: &mut EngineProcess) -> bool {
        let Some(child) = inner.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                log::warn!("Engine process exited unexpectedly: {}", status);
                inner.child = None;
                inner.state = EngineState::Stopped;
                false
            }
            Err(e) => {
                log::warn!("Engine liveness poll failed, treating as dead: {}", e);
                inner.child = None;
                inner.state = EngineState::Stopped;
                false
            }
        }
    }
}

impl Drop for ChromiumSupervisor {
    /// Backstop only: hosts should call [`stop`](Self::stop) from their own
    /// teardown. Dropping still reclaims the child so it cannot outlive the
    /// supervisor.
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Termination helpers
// ============================================================================

/// Ask the engine to terminate gracefully.
///
/// SIGTERM on Unix; elsewhere there is no graceful channel, so the grace
/// wait simply gives the process a chance to exit on its own before the
/// force-kill.
fn request_graceful_termination(child: &mut Child) {
    #[cfg(unix)]
    {
        let pid = child.id() as libc::pid_t;
        // Safety: plain kill(2) on a pid we own; failure is handled below
        // by the force-kill path.
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc != 0 {
            log::warn!(
                "SIGTERM to engine pid {} failed: {}",
                pid,
                std::io::Error::last_os_error()
            );
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child;
    }
}

/// Wait up to `grace` for the child to exit. Returns true if it did.
fn wait_with_grace(child: &mut Child, grace: Duration) -> bool {
    let deadline = Instant::now() + grace;
    let poll = Duration::from_millis(100);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("Engine exited within grace period: {}", status);
                return true;
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    return false;
                }
                std::thread::sleep(poll);
            }
            Err(e) => {
                log::warn!("Grace-period poll failed: {}", e);
                return false;
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::mock::MockEngineLocator;

    fn stopped_supervisor() -> ChromiumSupervisor {
        ChromiumSupervisor::new(
            SupervisorConfig::default(),
            Box::new(MockEngineLocator::always_fails("no engine in tests")),
        )
    }

    #[test]
    fn test_endpoint_shape() {
        let supervisor = stopped_supervisor();
        let endpoint = supervisor.endpoint();
        assert_eq!(endpoint.http_url(), "http://127.0.0.1:9222");
        assert_eq!(endpoint.json_version_url(), "http://127.0.0.1:9222/json/version");
        assert_eq!(endpoint.port(), 9222);
    }

    #[test]
    fn test_stop_on_never_started_is_noop() {
        let supervisor = stopped_supervisor();
        supervisor.stop();
        supervisor.stop();
        assert!(!supervisor.is_running());
    }

    #[test]
    fn test_ensure_running_propagates_resolution_failure() {
        let supervisor = stopped_supervisor();
        let err = supervisor.ensure_running().unwrap_err();
        assert!(matches!(err, RenderError::EngineResolution(_)));
        // Failure leaves the machine in Stopped, not Starting.
        assert!(!supervisor.is_running());
        assert_eq!(supervisor.status().status, "stopped");
    }

    #[test]
    fn test_spawn_of_unrunnable_path_is_process_start_failure() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let supervisor = ChromiumSupervisor::new(
            SupervisorConfig::default(),
            // Exists but is not executable, so spawn (or warm-up) fails.
            Box::new(MockEngineLocator::with_path(file.path())),
        );
        let err = supervisor.ensure_running().unwrap_err();
        assert!(matches!(err, RenderError::ProcessStart(_)));
        assert!(!supervisor.is_running());
    }

    #[test]
    fn test_state_tracks_lifecycle_edges() {
        let supervisor = stopped_supervisor();
        assert_eq!(supervisor.state(), EngineState::Stopped);

        // Resolution failure returns the machine to Stopped, not Starting.
        let _ = supervisor.ensure_running();
        assert_eq!(supervisor.state(), EngineState::Stopped);

        supervisor.stop();
        assert_eq!(supervisor.state(), EngineState::Stopped);
    }

    #[test]
    fn test_status_never_running_without_child() {
        let supervisor = stopped_supervisor();
        let report = supervisor.status();
        assert_eq!(report.status, "stopped");
        assert_eq!(report.port, None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let report = EngineStatusReport {
            status: "running",
            port: Some(9222),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"status":"running","port":9222}"#);

        let report = EngineStatusReport {
            status: "stopped",
            port: None,
        };
        assert_eq!(serde_json::to_string(&report).unwrap(), r#"{"status":"stopped"}"#);
    }

    #[test]
    fn test_engine_args_carry_port_and_headless() {
        let args = engine_args(9333);
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("about:blank"));
    }
}
