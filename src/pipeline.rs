//! Render pipeline: one HTML-to-PDF request from start to finish.
//!
//! This module contains [`RenderPipeline`], which orchestrates a single
//! render: ensure the supervised engine is running, open a DevTools session
//! against its endpoint, drive one tab through content load, print-media
//! emulation, and `Page.printToPDF`, and on any classified failure divert
//! to the fallback renderer — transparently to the caller.
//!
//! # Flow
//!
//! ```text
//! render(html, format_id, options)
//!   │
//!   ├─ merge stored orientation default (PrintFormatStore)
//!   ├─ strip preview-only markup
//!   ├─ supervisor.ensure_running() ──failure──────────────┐
//!   ├─ discover ws URL (/json/version) ──failure──────────┤
//!   ├─ Browser::connect ──failure─────────────────────────┤
//!   ├─ tab: load data URL, emulate print, printToPDF ──┐  │
//!   │    (tab closed in all outcomes)          failure─┤  │
//!   ▼                                                  ▼  ▼
//! PDF bytes                                     FallbackRenderer
//!                                                (exactly once)
//! ```
//!
//! # Blocking behavior
//!
//! **These functions block the calling thread.** In an async context, wrap
//! calls in a blocking task (`tokio::task::spawn_blocking`) or use
//! [`generate_pdf_async`](crate::service::generate_pdf_async).
//!
//! # Concurrency
//!
//! Renders are independent: each request gets its own DevTools connection
//! and tab, so concurrent renders proceed in parallel against the one
//! shared engine process. The supervisor lock is only touched by
//! `ensure_running`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::{Browser, Tab};

use crate::error::{RenderError, Result};
use crate::fallback::FallbackRenderer;
use crate::formats::{NoFormatStore, PrintFormatStore};
use crate::options::{map_layout_options, LayoutOptions, NativeRenderOptions};
use crate::supervisor::{ChromiumSupervisor, ConnectionEndpoint};

// ============================================================================
// Constants
// ============================================================================

/// Upper bound for DevTools operations on one tab (navigation, evaluation,
/// the print call). A stalled page load fails the request — and diverts to
/// the fallback — instead of hanging it.
const SESSION_TIMEOUT_SECS: u64 = 30;

/// Bound on the `/json/version` endpoint discovery request.
const ENDPOINT_DISCOVERY_TIMEOUT_SECS: u64 = 5;

/// Opening tag of the preview-only action banner stripped before rendering.
///
/// The banner carries interactive Print/Download buttons meant for the HTML
/// preview; it must never appear in the produced PDF.
const PREVIEW_BANNER_OPEN: &str = r#"<div class="action-banner print-hide">"#;

/// The banner's closing tag.
const PREVIEW_BANNER_CLOSE: &str = "</div>";

// ============================================================================
// Output
// ============================================================================

/// Result of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    /// PDF bytes, returned in memory.
    Bytes(Vec<u8>),
    /// The caller-supplied path the PDF was written to.
    File(PathBuf),
}

impl RenderOutput {
    /// The PDF bytes, when the render returned them in memory.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            RenderOutput::Bytes(bytes) => Some(bytes),
            RenderOutput::File(_) => None,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Orchestrates render requests against a shared [`ChromiumSupervisor`],
/// with a [`FallbackRenderer`] for when the browser path fails.
///
/// # Example
///
/// ```rust,ignore
/// use chromeprint::*;
///
/// let supervisor = ChromiumSupervisor::new(
///     SupervisorConfig::default(),
///     Box::new(SystemEngineLocator::with_defaults()),
/// ).into_shared();
///
/// let pipeline = RenderPipeline::new(
///     Arc::clone(&supervisor),
///     Box::new(WkhtmltopdfRenderer::discover()?),
/// );
///
/// let output = pipeline.render("<h1>Invoice</h1>", "Invoice", LayoutOptions::default(), None)?;
/// ```
pub struct RenderPipeline {
    supervisor: Arc<ChromiumSupervisor>,
    fallback: Box<dyn FallbackRenderer>,
    formats: Box<dyn PrintFormatStore>,
}

impl RenderPipeline {
    /// Create a pipeline with no per-print-format stored configuration.
    pub fn new(supervisor: Arc<ChromiumSupervisor>, fallback: Box<dyn FallbackRenderer>) -> Self {
        Self {
            supervisor,
            fallback,
            formats: Box::new(NoFormatStore),
        }
    }

    /// Attach a per-print-format configuration store.
    pub fn with_format_store(mut self, formats: Box<dyn PrintFormatStore>) -> Self {
        self.formats = formats;
        self
    }

    /// The supervisor this pipeline renders against.
    pub fn supervisor(&self) -> &Arc<ChromiumSupervisor> {
        &self.supervisor
    }

    /// Render `html` to a PDF.
    ///
    /// Tries the browser path first; any failure classified as
    /// fallback-triggering (see [`RenderError::triggers_fallback`]) invokes
    /// the fallback renderer exactly once with the original HTML and
    /// options. When `output` is given the bytes are written there and the
    /// path is returned instead.
    ///
    /// # Errors
    ///
    /// [`RenderError::Fallback`] when both paths failed, carrying both
    /// errors. [`RenderError::Io`] when the render succeeded but the output
    /// path could not be written.
    pub fn render(
        &self,
        html: &str,
        format_id: &str,
        mut options: LayoutOptions,
        output: Option<&Path>,
    ) -> Result<RenderOutput> {
        // Stored default applies only when the caller left orientation open.
        if options.orientation.is_none() {
            options.orientation = self.formats.orientation_default(format_id);
            if let Some(orientation) = options.orientation {
                log::debug!(
                    "Using stored orientation {:?} for print format {:?}",
                    orientation,
                    format_id
                );
            }
        }

        let native = map_layout_options(&options);
        let started = Instant::now();

        let browser_result = self.try_browser_render(html, &native);
        self.settle(browser_result, html, format_id, &options, output, started)
    }

    /// Resolve a browser-path outcome into the caller's result: finish a
    /// success, divert classified failures to the fallback renderer, pass
    /// terminal errors through.
    fn settle(
        &self,
        browser_result: Result<Vec<u8>>,
        html: &str,
        format_id: &str,
        options: &LayoutOptions,
        output: Option<&Path>,
        started: Instant,
    ) -> Result<RenderOutput> {
        match browser_result {
            Ok(bytes) => {
                log::info!(
                    "✅ PDF rendered via Chromium for format {:?} ({} bytes in {:?})",
                    format_id,
                    bytes.len(),
                    started.elapsed()
                );
                finish(bytes, output)
            }
            Err(e) if e.triggers_fallback() => {
                log::warn!(
                    "Browser path failed for format {:?} at stage {}: {}, using fallback renderer",
                    format_id,
                    e.stage(),
                    e
                );
                match self.fallback.render(html, options, output) {
                    Ok(result) => {
                        log::info!(
                            "✅ PDF rendered via fallback for format {:?} ({:?} total)",
                            format_id,
                            started.elapsed()
                        );
                        Ok(result)
                    }
                    Err(fallback_err) => {
                        log::error!(
                            "❌ Fallback renderer also failed for format {:?}: {}",
                            format_id,
                            fallback_err
                        );
                        Err(RenderError::Fallback {
                            browser: Box::new(e),
                            fallback: Box::new(fallback_err),
                        })
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// The browser path: ensure engine, connect, drive one tab.
    fn try_browser_render(&self, html: &str, native: &NativeRenderOptions) -> Result<Vec<u8>> {
        let endpoint = self.supervisor.ensure_running()?;

        let ws_url = discover_websocket_url(&endpoint)?;
        let browser = Browser::connect(ws_url).map_err(|e| {
            RenderError::Connection(format!("could not attach to {}: {}", endpoint, e))
        })?;

        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::Render(format!("could not open rendering surface: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(SESSION_TIMEOUT_SECS));

        // Scoped acquisition: the tab is closed whatever happens below.
        // The connection itself is torn down when `browser` drops.
        let result = drive_surface(&tab, html, native);
        close_surface_safely(&tab);
        result
    }
}

/// Load the HTML, apply print-media emulation, and print.
fn drive_surface(tab: &Tab, html: &str, native: &NativeRenderOptions) -> Result<Vec<u8>> {
    let stripped = strip_preview_markup(html);

    // Data URL keeps the load local: no web server, no file on disk.
    let data_url = format!(
        "data:text/html;charset=utf-8,{}",
        urlencoding::encode(&stripped)
    );
    log::trace!("Loading content ({} bytes of HTML)", stripped.len());

    let nav_start = Instant::now();
    tab.navigate_to(&data_url)
        .map_err(|e| RenderError::Render(format!("content load failed: {}", e)))?
        .wait_until_navigated()
        .map_err(|e| RenderError::Render(format!("content load timed out: {}", e)))?;
    log::debug!("Content loaded in {:?}", nav_start.elapsed());

    // @media print rules must be in effect before printing.
    tab.call_method(Emulation::SetEmulatedMedia {
        media: Some("print".to_string()),
        features: None,
    })
    .map_err(|e| RenderError::Render(format!("print-media emulation failed: {}", e)))?;

    let pdf_start = Instant::now();
    let pdf = tab
        .print_to_pdf(Some(native.to_cdp()))
        .map_err(|e| RenderError::Render(format!("printToPDF failed: {}", e)))?;
    log::debug!("PDF produced in {:?} ({} bytes)", pdf_start.elapsed(), pdf.len());

    Ok(pdf)
}

/// Close a tab, ignoring errors.
///
/// The render outcome is already decided by the time this runs; a close
/// failure must not turn a produced PDF into an error, and on the failure
/// path the engine reclaims the tab when the connection drops.
fn close_surface_safely(tab: &Tab) {
    if let Err(e) = tab.close(true) {
        log::warn!("Could not close rendering surface (continuing): {}", e);
    }
}

/// Fetch the WebSocket debugger URL from the engine's `/json/version`
/// document.
fn discover_websocket_url(endpoint: &ConnectionEndpoint) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(ENDPOINT_DISCOVERY_TIMEOUT_SECS))
        .build()
        .map_err(|e| RenderError::Connection(format!("could not build HTTP client: {}", e)))?;

    let version: serde_json::Value = client
        .get(endpoint.json_version_url())
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(|e| {
            RenderError::Connection(format!("version query against {} failed: {}", endpoint, e))
        })?;

    version
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            RenderError::Connection(format!(
                "{} returned no webSocketDebuggerUrl",
                endpoint.json_version_url()
            ))
        })
}

/// Remove preview-only action banners by literal pattern removal.
///
/// Each `<div class="action-banner print-hide">` is dropped through its
/// first subsequent `</div>`. An unterminated banner is left in place
/// rather than truncating the document.
fn strip_preview_markup(html: &str) -> String {
    let mut remaining = html;
    let mut result = String::with_capacity(html.len());

    while let Some(open) = remaining.find(PREVIEW_BANNER_OPEN) {
        let after_open = open + PREVIEW_BANNER_OPEN.len();
        match remaining[after_open..].find(PREVIEW_BANNER_CLOSE) {
            Some(close) => {
                result.push_str(&remaining[..open]);
                remaining = &remaining[after_open + close + PREVIEW_BANNER_CLOSE.len()..];
            }
            None => break,
        }
    }

    result.push_str(remaining);
    result
}

/// Return bytes in memory, or write them to the caller-supplied path.
fn finish(bytes: Vec<u8>, output: Option<&Path>) -> Result<RenderOutput> {
    match output {
        Some(path) => {
            std::fs::write(path, &bytes)?;
            log::debug!("PDF written to {}", path.display());
            Ok(RenderOutput::File(path.to_path_buf()))
        }
        None => Ok(RenderOutput::Bytes(bytes)),
    }
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

    fn mock_pipeline(fallback: MockFallbackRenderer) -> RenderPipeline {
        let supervisor = ChromiumSupervisor::new(
            SupervisorConfig::default(),
            Box::new(MockEngineLocator::always_fails("no engine in tests")),
        )
        .into_shared();
        RenderPipeline::new(supervisor, Box::new(fallback))
    }

    /// A render-stage failure (session established, print call failed)
    /// diverts to the fallback exactly once.
    #[test]
    fn test_render_stage_failure_diverts_to_fallback() {
        let fallback = MockFallbackRenderer::returning(b"%PDF-diverted".to_vec());
        let calls = fallback.counter();
        let pipeline = mock_pipeline(fallback);

        let output = pipeline
            .settle(
                Err(RenderError::Render("printToPDF failed: tab crashed".into())),
                "<p>x</p>",
                "Invoice",
                &LayoutOptions::default(),
                None,
                Instant::now(),
            )
            .unwrap();

        assert_eq!(output.bytes(), Some(&b"%PDF-diverted"[..]));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    /// Unclassified errors are terminal and never reach the fallback.
    #[test]
    fn test_io_error_does_not_divert() {
        let fallback = MockFallbackRenderer::returning(b"%PDF-x".to_vec());
        let calls = fallback.counter();
        let pipeline = mock_pipeline(fallback);

        let err = pipeline
            .settle(
                Err(RenderError::Io(std::io::Error::other("disk gone"))),
                "<p>x</p>",
                "Invoice",
                &LayoutOptions::default(),
                None,
                Instant::now(),
            )
            .unwrap_err();

        assert!(matches!(err, RenderError::Io(_)));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_strip_removes_banner() {
        let html = r#"<body><div class="action-banner print-hide"><button>Print</button></div><p>Doc</p></body>"#;
        let stripped = strip_preview_markup(html);
        assert_eq!(stripped, "<body><p>Doc</p></body>");
        assert!(!stripped.contains("action-banner"));
    }

    #[test]
    fn test_strip_removes_every_occurrence() {
        let html = concat!(
            r#"<div class="action-banner print-hide">a</div>"#,
            "<p>one</p>",
            r#"<div class="action-banner print-hide">b</div>"#,
            "<p>two</p>",
        );
        assert_eq!(strip_preview_markup(html), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_strip_leaves_clean_html_untouched() {
        let html = "<html><body><h1>Report</h1></body></html>";
        assert_eq!(strip_preview_markup(html), html);
    }

    #[test]
    fn test_strip_keeps_unterminated_banner() {
        let html = r#"<p>x</p><div class="action-banner print-hide">no close"#;
        assert_eq!(strip_preview_markup(html), html);
    }

    #[test]
    fn test_strip_is_literal_not_class_matching() {
        // Only the exact preview-banner markup is removed.
        let html = r#"<div class="print-hide action-banner">kept</div>"#;
        assert_eq!(strip_preview_markup(html), html);
    }

    #[test]
    fn test_finish_in_memory() {
        let out = finish(vec![1, 2, 3], None).unwrap();
        assert_eq!(out.bytes(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_finish_writes_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let out = finish(b"%PDF-".to_vec(), Some(&path)).unwrap();
        assert_eq!(out, RenderOutput::File(path.clone()));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-");
    }
}
