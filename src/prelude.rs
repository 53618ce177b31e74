//! Convenient imports for common usage patterns.
//!
//! Re-exports the types most call sites need, so one import gets you
//! started:
//!
//! ```rust,ignore
//! use chromeprint::prelude::*;
//! ```
//!
//! # Example
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
//!     let request = RenderRequest {
//!         html: "<h1>Hello</h1>".to_string(),
//!         ..Default::default()
//!     };
//!     if let Some(result) = generate_pdf(&pipeline, &request) {
//!         let output = result?;
//!         // ... use output
//!     }
//!
//!     supervisor.stop();
//!     Ok(())
//! }
//! ```

// Core types
pub use crate::config::{SupervisorConfig, SupervisorConfigBuilder};
pub use crate::error::{RenderError, Result};
pub use crate::fallback::{FallbackRenderer, WkhtmltopdfRenderer};
pub use crate::formats::{InMemoryFormatStore, NoFormatStore, PrintFormatStore};
pub use crate::locator::{EngineLocator, SystemEngineLocator};
pub use crate::options::{
    map_layout_options, LayoutOptions, NativeRenderOptions, Orientation, PageSize,
};
pub use crate::pipeline::{RenderOutput, RenderPipeline};
pub use crate::service::{check_status, generate_pdf, generate_pdf_async, RenderRequest};
pub use crate::supervisor::{ChromiumSupervisor, ConnectionEndpoint, EngineStatusReport};

// Feature-gated exports
#[cfg(feature = "env-config")]
pub use crate::config::env::{chrome_path_from_env, from_env};

// Re-export Arc for convenience (the supervisor is shared as Arc)
pub use std::sync::Arc;
