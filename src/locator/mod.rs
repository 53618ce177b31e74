//! Engine locator implementations.
//!
//! This module provides the [`EngineLocator`] trait and implementations for
//! resolving the Chromium executable the supervisor spawns.
//!
//! # Overview
//!
//! The locator abstracts binary resolution, allowing:
//! - Explicit paths (deployment-pinned binaries)
//! - PATH and well-known-location discovery
//! - Mock locators for testing without Chromium installed
//!
//! # Available locators
//!
//! | Locator | Description |
//! |---------|-------------|
//! | [`SystemEngineLocator`] | Explicit path or system discovery |
//! | [`mock::MockEngineLocator`] | For testing (feature-gated) |
//!
//! # Custom locator
//!
//! Implement [`EngineLocator`] to plug in your own provisioning logic, e.g.
//! a download-on-demand installer:
//!
//! ```rust,ignore
//! use chromeprint::{EngineLocator, Result};
//! use std::path::PathBuf;
//!
//! struct DownloadingLocator { cache_dir: PathBuf }
//!
//! impl EngineLocator for DownloadingLocator {
//!     fn resolve(&self) -> Result<PathBuf> {
//!         // fetch-or-reuse a pinned Chromium build under cache_dir
//!         todo!()
//!     }
//! }
//! ```

mod system;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use system::SystemEngineLocator;

use crate::error::Result;
use std::path::PathBuf;

/// Resolves a path to the Chromium executable.
///
/// The supervisor consults the locator once per process spawn. Provisioning
/// (downloading, unpacking) is the locator's concern; the supervisor only
/// needs a runnable path back.
///
/// # Thread safety
///
/// `Send + Sync` is required because the locator is shared with the
/// supervisor across request threads.
pub trait EngineLocator: Send + Sync {
    /// Resolve the engine executable.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EngineResolution`](crate::RenderError::EngineResolution)
    /// when no runnable executable can be produced.
    fn resolve(&self) -> Result<PathBuf>;
}
