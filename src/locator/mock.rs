//! Mock engine locator for testing.
//!
//! Available when the `test-utils` feature is enabled or during testing.
//! Lets tests drive the supervisor and pipeline without Chromium installed:
//! point the locator at a stub executable, or make resolution fail to
//! exercise the [`EngineResolution`](crate::RenderError::EngineResolution)
//! path.
//!
//! # Example
//!
//! ```rust,ignore
//! use chromeprint::locator::mock::MockEngineLocator;
//!
//! // Resolution always fails
//! let locator = MockEngineLocator::always_fails("chromium not installed");
//!
//! // Resolves to a stub script; counts resolutions
//! let locator = MockEngineLocator::with_path("/tmp/stub-engine.sh");
//! assert_eq!(locator.resolve_count(), 0);
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{RenderError, Result};
use super::EngineLocator;

/// Mock locator that resolves to a fixed path or always fails.
///
/// Tracks the number of `resolve()` calls so tests can verify how many
/// times the supervisor actually spawned (resolution happens once per
/// spawn).
pub struct MockEngineLocator {
    path: Option<PathBuf>,
    error_message: String,
    resolve_count: Arc<AtomicUsize>,
}

impl MockEngineLocator {
    /// Create a mock that resolves to the given path without checking it.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
            error_message: String::new(),
            resolve_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock whose resolution always fails with the given message.
    pub fn always_fails<S: Into<String>>(message: S) -> Self {
        Self {
            path: None,
            error_message: message.into(),
            resolve_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `resolve()` calls seen so far.
    pub fn resolve_count(&self) -> usize {
        self.resolve_count.load(Ordering::SeqCst)
    }

    /// Clone of the internal counter, for tracking after the locator has
    /// been moved into a supervisor.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.resolve_count)
    }
}

impl EngineLocator for MockEngineLocator {
    fn resolve(&self) -> Result<PathBuf> {
        self.resolve_count.fetch_add(1, Ordering::SeqCst);
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Err(RenderError::EngineResolution(self.error_message.clone())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
