//! Generation service facade.
//!
//! The host application routes every PDF request through this module. It
//! adds generator selection on top of [`RenderPipeline`]: the facade owns
//! requests whose configured generator names this engine and declines the
//! rest, so a host carrying several PDF backends can consult them in order.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Host application                    │
//! │        (HTTP handlers, batch jobs, CLI, ...)         │
//! └──────────────────────────┬───────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              This module (service.rs)                │
//! │   generate_pdf / generate_pdf_async / check_status   │
//! │        generator == "chromium"? ──no──▶ None         │
//! └──────────────────────────┬───────────────────────────┘
//!                            │ yes
//!                            ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                   RenderPipeline                     │
//! │          (browser path, fallback renderer)           │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Blocking Behavior
//!
//! [`generate_pdf`] blocks the calling thread for the full render. In an
//! async context use [`generate_pdf_async`], which moves the render onto
//! the blocking thread pool:
//!
//! ```rust,ignore
//! // ✅ Correct in async code
//! let result = generate_pdf_async(pipeline, request).await;
//!
//! // ❌ Wrong: stalls the async runtime for seconds
//! let result = generate_pdf(&pipeline, &request);
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::Result;
use crate::options::LayoutOptions;
use crate::pipeline::{RenderOutput, RenderPipeline};
use crate::supervisor::{ChromiumSupervisor, EngineStatusReport};

/// Generator selector this engine answers to.
///
/// Requests carrying any other selector are declined (the facade returns
/// `None`) so the host can route them to another backend.
pub const GENERATOR_NAME: &str = "chromium";

// ============================================================================
// Request type
// ============================================================================

/// One PDF generation request.
///
/// # Example
///
/// ```rust,ignore
/// use chromeprint::service::{generate_pdf, RenderRequest};
///
/// let request = RenderRequest {
///     html: "<h1>Invoice #42</h1>".to_string(),
///     format_id: "Invoice".to_string(),
///     ..Default::default()
/// };
///
/// match generate_pdf(&pipeline, &request) {
///     Some(Ok(output)) => { /* PDF produced */ }
///     Some(Err(e)) => { /* both render paths failed */ }
///     None => { /* request is for a different generator */ }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    /// Document markup to render.
    pub html: String,
    /// Print-format identifier, used for stored per-format defaults and
    /// log context.
    #[serde(default)]
    pub format_id: String,
    /// Generator selector; defaults to [`GENERATOR_NAME`].
    #[serde(default = "default_generator")]
    pub generator: String,
    /// Page layout. Defaults to portrait A4 with zero margins.
    #[serde(flatten)]
    pub options: LayoutOptions,
    /// Write the PDF here instead of returning bytes.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

fn default_generator() -> String {
    GENERATOR_NAME.to_string()
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            html: String::new(),
            format_id: String::new(),
            generator: default_generator(),
            options: LayoutOptions::default(),
            output: None,
        }
    }
}

// ============================================================================
// Service functions
// ============================================================================

/// Generate a PDF, if this engine owns the request.
///
/// Returns `None` without side effects when `request.generator` is not
/// [`GENERATOR_NAME`]; no engine is started and no fallback runs.
/// Otherwise the request goes through the full pipeline and the result is
/// wrapped in `Some`.
///
/// **This function blocks the calling thread.** Use
/// [`generate_pdf_async`] from async code.
pub fn generate_pdf(
    pipeline: &RenderPipeline,
    request: &RenderRequest,
) -> Option<Result<RenderOutput>> {
    if request.generator != GENERATOR_NAME {
        log::debug!(
            "Declining request for generator {:?} (this engine is {:?})",
            request.generator,
            GENERATOR_NAME
        );
        return None;
    }

    Some(pipeline.render(
        &request.html,
        &request.format_id,
        request.options.clone(),
        request.output.as_deref(),
    ))
}

/// Async wrapper around [`generate_pdf`].
///
/// Moves the blocking render onto tokio's blocking thread pool. A panic in
/// the render task is surfaced as a configuration error rather than
/// propagated.
pub async fn generate_pdf_async(
    pipeline: Arc<RenderPipeline>,
    request: RenderRequest,
) -> Option<Result<RenderOutput>> {
    let handle =
        tokio::task::spawn_blocking(move || generate_pdf(&pipeline, &request));

    match handle.await {
        Ok(result) => result,
        Err(e) => {
            log::error!("❌ Render task failed to complete: {}", e);
            Some(Err(crate::error::RenderError::Configuration(format!(
                "render task failed: {}",
                e
            ))))
        }
    }
}

/// Health report for the supervised engine.
///
/// Never fails; suitable for status endpoints and readiness probes. The
/// report serializes as `{"status": "running", "port": 9222}` with the
/// port omitted unless running. Takes a plain reference, so it works with
/// both shared (`Arc`) and locally owned supervisors.
pub fn check_status(supervisor: &ChromiumSupervisor) -> EngineStatusReport {
    supervisor.status()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupervisorConfig;
    use crate::fallback::mock::MockFallbackRenderer;
    use crate::locator::mock::MockEngineLocator;

    fn pipeline_with_failing_engine() -> RenderPipeline {
        let supervisor = ChromiumSupervisor::new(
            SupervisorConfig::default(),
            Box::new(MockEngineLocator::always_fails("no engine in tests")),
        )
        .into_shared();
        RenderPipeline::new(
            supervisor,
            Box::new(MockFallbackRenderer::returning(b"%PDF-mock".to_vec())),
        )
    }

    #[test]
    fn test_other_generator_is_declined() {
        let pipeline = pipeline_with_failing_engine();
        let request = RenderRequest {
            html: "<p>doc</p>".to_string(),
            generator: "ghostscript".to_string(),
            ..Default::default()
        };
        assert!(generate_pdf(&pipeline, &request).is_none());
    }

    #[test]
    fn test_owned_generator_is_rendered() {
        let pipeline = pipeline_with_failing_engine();
        let request = RenderRequest {
            html: "<p>doc</p>".to_string(),
            ..Default::default()
        };
        // Engine resolution fails, so the mock fallback produces the PDF.
        let output = generate_pdf(&pipeline, &request).unwrap().unwrap();
        assert_eq!(output.bytes(), Some(&b"%PDF-mock"[..]));
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: RenderRequest =
            serde_json::from_str(r#"{"html": "<p>x</p>"}"#).unwrap();
        assert_eq!(request.generator, GENERATOR_NAME);
        assert_eq!(request.format_id, "");
        assert!(request.output.is_none());
    }

    #[test]
    fn test_request_carries_flattened_layout() {
        let request: RenderRequest = serde_json::from_str(
            r#"{"html": "<p>x</p>", "generator": "chromium", "page_size": "A3", "margin_top": 5.0}"#,
        )
        .unwrap();
        assert_eq!(request.options.page_size, crate::options::PageSize::A3);
        assert_eq!(request.options.margin_top, 5.0);
    }

    #[tokio::test]
    async fn test_async_wrapper_matches_blocking_path() {
        let pipeline = Arc::new(pipeline_with_failing_engine());
        let request = RenderRequest {
            html: "<p>doc</p>".to_string(),
            generator: "other".to_string(),
            ..Default::default()
        };
        assert!(generate_pdf_async(pipeline, request).await.is_none());
    }

    #[test]
    fn test_check_status_reports_stopped() {
        // Works on a locally owned supervisor, no Arc required.
        let supervisor = ChromiumSupervisor::new(
            SupervisorConfig::default(),
            Box::new(MockEngineLocator::always_fails("none")),
        );
        assert_eq!(check_status(&supervisor).status, "stopped");

        // And through a shared handle, via deref.
        let shared = supervisor.into_shared();
        assert_eq!(check_status(&shared).status, "stopped");
    }
}
