//! Integration tests for the Chromium process supervisor.
//!
//! These tests exercise the real spawn/stop machinery against stub shell
//! scripts, so they run without Chromium installed. Unix-only where a stub
//! process is involved.

mod common;

use std::time::Duration;

use chromeprint::locator::mock::MockEngineLocator;
use chromeprint::{ChromiumSupervisor, EngineState, RenderError, SupervisorConfigBuilder};

fn quick_config() -> chromeprint::SupervisorConfig {
    SupervisorConfigBuilder::new()
        .warmup(Duration::from_millis(150))
        .shutdown_grace(Duration::from_secs(2))
        .build()
        .unwrap()
}

/// Resolution failure surfaces before any process is spawned.
#[test]
fn test_resolution_failure_leaves_supervisor_stopped() {
    let supervisor = ChromiumSupervisor::new(
        quick_config(),
        Box::new(MockEngineLocator::always_fails("not installed")),
    );

    let err = supervisor.ensure_running().unwrap_err();
    assert!(matches!(err, RenderError::EngineResolution(_)));
    assert!(!supervisor.is_running());
    assert_eq!(supervisor.status().status, "stopped");
}

#[cfg(unix)]
mod with_stub_engine {
    use super::*;
    use crate::common::{long_lived_engine, stub_engine};

    /// Full lifecycle: lazy start, running status with port, bounded stop.
    #[test]
    fn test_start_status_stop_lifecycle() {
        let (_dir, path) = long_lived_engine();
        let locator = MockEngineLocator::with_path(&path);
        let supervisor = ChromiumSupervisor::new(quick_config(), Box::new(locator));

        assert!(!supervisor.is_running());

        let endpoint = supervisor.ensure_running().unwrap();
        assert_eq!(endpoint.port(), 9222);
        assert!(supervisor.is_running());
        assert_eq!(supervisor.state(), EngineState::Running);

        let report = supervisor.status();
        assert_eq!(report.status, "running");
        assert_eq!(report.port, Some(9222));

        supervisor.stop();
        assert!(!supervisor.is_running());
        assert_eq!(supervisor.state(), EngineState::Stopped);
        assert_eq!(supervisor.status().status, "stopped");
    }

    /// A second ensure call reuses the live process: the locator is only
    /// consulted once and the endpoint is identical.
    #[test]
    fn test_ensure_running_is_idempotent() {
        let (_dir, path) = long_lived_engine();
        let locator = MockEngineLocator::with_path(&path);
        let resolves = locator.counter();
        let supervisor = ChromiumSupervisor::new(quick_config(), Box::new(locator));

        let first = supervisor.ensure_running().unwrap();
        let second = supervisor.ensure_running().unwrap();

        assert_eq!(first, second);
        assert_eq!(resolves.load(std::sync::atomic::Ordering::SeqCst), 1);

        supervisor.stop();
    }

    /// Two threads racing ensure_running on a stopped supervisor spawn
    /// exactly one process and both get the same endpoint.
    #[test]
    fn test_concurrent_ensure_spawns_once() {
        let (_dir, path) = long_lived_engine();
        let locator = MockEngineLocator::with_path(&path);
        let resolves = locator.counter();
        let supervisor = ChromiumSupervisor::new(quick_config(), Box::new(locator));

        let endpoints = std::thread::scope(|scope| {
            let a = scope.spawn(|| supervisor.ensure_running());
            let b = scope.spawn(|| supervisor.ensure_running());
            (a.join().unwrap(), b.join().unwrap())
        });

        let first = endpoints.0.unwrap();
        let second = endpoints.1.unwrap();
        assert_eq!(first, second);
        assert_eq!(resolves.load(std::sync::atomic::Ordering::SeqCst), 1);

        supervisor.stop();
    }

    /// An engine that exits during warm-up is a start failure, and the
    /// supervisor returns to stopped rather than sticking in starting.
    #[test]
    fn test_exit_during_warmup_is_start_failure() {
        let (_dir, path) = stub_engine("exit 0");
        let supervisor = ChromiumSupervisor::new(
            quick_config(),
            Box::new(MockEngineLocator::with_path(&path)),
        );

        let err = supervisor.ensure_running().unwrap_err();
        assert!(matches!(err, RenderError::ProcessStart(_)));
        assert_eq!(supervisor.status().status, "stopped");
    }

    /// A crash after startup is detected lazily, and the next ensure call
    /// respawns.
    #[test]
    fn test_crashed_engine_is_detected_and_respawned() {
        // Lives through the warm-up, then exits on its own.
        let (_dir, path) = stub_engine("sleep 0.4");
        let locator = MockEngineLocator::with_path(&path);
        let resolves = locator.counter();
        let supervisor = ChromiumSupervisor::new(
            SupervisorConfigBuilder::new()
                .warmup(Duration::from_millis(100))
                .build()
                .unwrap(),
            Box::new(locator),
        );

        supervisor.ensure_running().unwrap();
        assert!(supervisor.is_running());

        // Wait for the stub to die, then observe lazy detection.
        std::thread::sleep(Duration::from_millis(700));
        assert!(!supervisor.is_running());
        assert_eq!(supervisor.status().status, "stopped");

        supervisor.ensure_running().unwrap();
        assert!(supervisor.is_running());
        assert_eq!(resolves.load(std::sync::atomic::Ordering::SeqCst), 2);

        supervisor.stop();
    }

    /// stop() is idempotent and safe to repeat after the engine is gone.
    #[test]
    fn test_stop_is_idempotent() {
        let (_dir, path) = long_lived_engine();
        let supervisor = ChromiumSupervisor::new(
            quick_config(),
            Box::new(MockEngineLocator::with_path(&path)),
        );

        supervisor.ensure_running().unwrap();
        supervisor.stop();
        supervisor.stop();
        assert!(!supervisor.is_running());
    }
}
