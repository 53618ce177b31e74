//! # chromeprint
//!
//! HTML-to-PDF rendering backed by a supervised headless Chromium process,
//! with transparent fallback to `wkhtmltopdf`.
//!
//! This crate keeps one warm Chromium process alive across requests, drives
//! it over the DevTools remote-debugging connection to print HTML to PDF,
//! and diverts to a secondary renderer whenever the browser path fails, so
//! callers either get a PDF or a single terminal error.
//!
//! ## Features
//!
//! - **Process supervision**: lazy start, warm reuse, crash detection, and
//!   bounded graceful shutdown of a single Chromium instance
//! - **Print-faithful rendering**: print-media emulation, background
//!   graphics, named paper formats and custom millimetre dimensions
//! - **Transparent fallback**: classified browser-path failures divert to
//!   `wkhtmltopdf` with the same options; callers cannot tell which path
//!   produced the PDF
//! - **Generator gating**: the service facade only owns requests addressed
//!   to the `"chromium"` generator, so hosts can stack PDF backends
//! - **Trait seams for testing**: engine locator, fallback renderer, and
//!   print-format store are traits with mock implementations behind the
//!   `test-utils` feature
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Host application                 │
//! │     (HTTP handlers, batch jobs, CLI)        │
//! └───────────────────┬─────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────────┐
//! │        service (generator gating)           │
//! └───────────────────┬─────────────────────────┘
//!                     ▼
//! ┌─────────────────────────────────────────────┐
//! │              RenderPipeline                 │
//! │  options mapping · markup stripping ·       │
//! │  DevTools session · fallback dispatch       │
//! └─────────┬───────────────────────┬───────────┘
//!           │                       │ on classified failure
//!           ▼                       ▼
//! ┌───────────────────┐   ┌─────────────────────┐
//! │ ChromiumSupervisor│   │  FallbackRenderer   │
//! │  (one warm engine │   │   (wkhtmltopdf)     │
//! │   process)        │   └─────────────────────┘
//! └───────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chromeprint::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let supervisor = ChromiumSupervisor::new(
//!         SupervisorConfig::default(),
//!         Box::new(SystemEngineLocator::with_defaults()),
//!     )
//!     .into_shared();
//!
//!     let pipeline = RenderPipeline::new(
//!         Arc::clone(&supervisor),
//!         Box::new(WkhtmltopdfRenderer::discover()?),
//!     );
//!
//!     let output = pipeline.render(
//!         "<h1>Invoice #42</h1>",
//!         "Invoice",
//!         LayoutOptions::default(),
//!         None,
//!     )?;
//!     std::fs::write("invoice.pdf", output.bytes().unwrap_or_default())?;
//!
//!     supervisor.stop(); // host teardown
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Configuration
//!
//! With the `env-config` feature, the supervisor configuration can be read
//! from an `app.env` file in the working directory or from the process
//! environment:
//!
//! ```rust,no_run
//! # #[cfg(feature = "env-config")]
//! # fn main() -> chromeprint::Result<()> {
//! let config = chromeprint::config::env::from_env()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "env-config"))]
//! # fn main() {}
//! ```
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `CHROME_PATH` | String | auto | Custom Chromium binary path |
//! | `CHROME_DEBUG_PORT` | u16 | 9222 | Remote-debugging port |
//! | `CHROME_WARMUP_SECONDS` | u64 | 3 | Warm-up delay after spawn |
//! | `CHROME_SHUTDOWN_GRACE_SECONDS` | u64 | 5 | Grace before force-kill |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `env-config` | Environment-based configuration (default) |
//! | `test-utils` | Mock locator and fallback renderer for testing |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, RenderError>`](Result).
//! Browser-path failures are classified: resolution, start, connection, and
//! render failures trigger the fallback; only [`RenderError::Fallback`],
//! carrying both underlying errors, reaches the caller when rendering truly
//! failed.
//!
//! ```rust,ignore
//! match pipeline.render(html, "Invoice", options, None) {
//!     Ok(output) => { /* PDF from either path */ }
//!     Err(RenderError::Fallback { browser, fallback }) => {
//!         eprintln!("browser: {browser}; fallback: {fallback}");
//!     }
//!     Err(e) => eprintln!("render failed: {e}"),
//! }
//! ```
//!
//! ## Testing
//!
//! For testing without Chromium or wkhtmltopdf, enable the `test-utils`
//! feature and use the mocks:
//!
//! ```rust,ignore
//! use chromeprint::fallback::mock::MockFallbackRenderer;
//! use chromeprint::locator::mock::MockEngineLocator;
//!
//! let supervisor = ChromiumSupervisor::new(
//!     SupervisorConfig::default(),
//!     Box::new(MockEngineLocator::always_fails("no engine")),
//! ).into_shared();
//! let pipeline = RenderPipeline::new(
//!     supervisor,
//!     Box::new(MockFallbackRenderer::returning(b"%PDF-mock".to_vec())),
//! );
//! ```

#![doc(html_root_url = "https://docs.rs/chromeprint/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod fallback;
pub mod formats;
pub mod locator;
pub mod options;
pub mod pipeline;
pub mod prelude;
pub mod service;
pub mod supervisor;

// ============================================================================
// Re-exports (Public API)
// ============================================================================

// Core types
pub use config::{SupervisorConfig, SupervisorConfigBuilder};
pub use error::{RenderError, Result};
pub use fallback::{FallbackRenderer, WkhtmltopdfRenderer};
pub use formats::{InMemoryFormatStore, NoFormatStore, PrintFormatStore};
pub use locator::{EngineLocator, SystemEngineLocator};
pub use options::{map_layout_options, LayoutOptions, NativeRenderOptions, Orientation, PageSize};
pub use pipeline::{RenderOutput, RenderPipeline};
pub use service::{
    check_status, generate_pdf, generate_pdf_async, RenderRequest, GENERATOR_NAME,
};
pub use supervisor::{
    engine_args, ChromiumSupervisor, ConnectionEndpoint, EngineState, EngineStatusReport,
};

// Feature-gated re-exports
#[cfg(feature = "env-config")]
pub use config::env::{chrome_path_from_env, from_env};

// ============================================================================
// Convenience type aliases
// ============================================================================

/// Shared supervisor handle, as held by the pipeline and status endpoints.
///
/// # Example
///
/// ```rust,ignore
/// use chromeprint::SharedSupervisor;
///
/// let supervisor: SharedSupervisor = supervisor.into_shared();
/// ```
pub type SharedSupervisor = std::sync::Arc<ChromiumSupervisor>;
