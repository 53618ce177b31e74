//! Fallback renderer.
//!
//! When the browser path fails at any stage, the pipeline hands the original
//! HTML and options to an independent PDF renderer that does not depend on
//! the supervised engine. The renderer is a black box behind the
//! [`FallbackRenderer`] trait; the bundled implementation shells out to the
//! `wkhtmltopdf` CLI, mapping the same option shape onto its parameter
//! names.
//!
//! By contract, callers cannot distinguish browser-rendered from
//! fallback-rendered output; only a failure of *both* paths surfaces as an
//! error.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{RenderError, Result};
use crate::options::{LayoutOptions, Orientation, PageSize};
use crate::pipeline::RenderOutput;

/// Renders HTML to PDF without the supervised browser engine.
///
/// Implementations receive the original (unstripped) HTML and the abstract
/// layout options, and either return PDF bytes or write them to the given
/// output path.
pub trait FallbackRenderer: Send + Sync {
    /// Render `html` to a PDF.
    ///
    /// # Errors
    ///
    /// Any error here is wrapped by the pipeline into the terminal
    /// [`RenderError::Fallback`] alongside the browser-path error.
    fn render(
        &self,
        html: &str,
        options: &LayoutOptions,
        output: Option<&Path>,
    ) -> Result<RenderOutput>;
}

// ============================================================================
// wkhtmltopdf
// ============================================================================

/// Fallback renderer driving the `wkhtmltopdf` CLI.
///
/// The HTML is written to a temporary `.html` file, the layout options are
/// mapped onto wkhtmltopdf flags, and the PDF is read from stdout (or
/// written directly to the requested output path).
///
/// # Example
///
/// ```rust,ignore
/// use chromeprint::WkhtmltopdfRenderer;
///
/// // Discover the binary on PATH
/// let renderer = WkhtmltopdfRenderer::discover()?;
///
/// // Or pin it
/// let renderer = WkhtmltopdfRenderer::with_binary("/usr/local/bin/wkhtmltopdf");
/// ```
pub struct WkhtmltopdfRenderer {
    binary: PathBuf,
}

impl WkhtmltopdfRenderer {
    /// Locate `wkhtmltopdf` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Configuration`] when the binary is not
    /// installed; construct the pipeline with a different
    /// [`FallbackRenderer`] in that case.
    pub fn discover() -> Result<Self> {
        let binary = which::which("wkhtmltopdf").map_err(|e| {
            RenderError::Configuration(format!("wkhtmltopdf not found on PATH: {}", e))
        })?;
        log::debug!("Found wkhtmltopdf: {}", binary.display());
        Ok(Self { binary })
    }

    /// Use a specific `wkhtmltopdf` binary.
    pub fn with_binary<P: Into<PathBuf>>(binary: P) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn build_command(&self, options: &LayoutOptions, input: &Path, output: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--quiet").arg("--enable-local-file-access");

        let orientation = match options.effective_orientation() {
            Orientation::Landscape => "Landscape",
            Orientation::Portrait => "Portrait",
        };
        cmd.args(["--orientation", orientation]);

        if options.page_size == PageSize::Custom {
            let (width, height) = custom_dimensions(options);
            cmd.args(["--page-width", &format!("{}mm", width)]);
            cmd.args(["--page-height", &format!("{}mm", height)]);
        } else {
            cmd.args(["--page-size", wkhtmltopdf_size_name(options.page_size)]);
        }

        cmd.args(["--margin-top", &format!("{}mm", options.margin_top)]);
        cmd.args(["--margin-right", &format!("{}mm", options.margin_right)]);
        cmd.args(["--margin-bottom", &format!("{}mm", options.margin_bottom)]);
        cmd.args(["--margin-left", &format!("{}mm", options.margin_left)]);

        cmd.arg(input).arg(output);
        cmd
    }
}

impl FallbackRenderer for WkhtmltopdfRenderer {
    fn render(
        &self,
        html: &str,
        options: &LayoutOptions,
        output: Option<&Path>,
    ) -> Result<RenderOutput> {
        let mut input = tempfile::Builder::new()
            .prefix("chromeprint-fallback-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| RenderError::Render(format!("could not create input file: {}", e)))?;
        input
            .write_all(html.as_bytes())
            .and_then(|_| input.flush())
            .map_err(|e| RenderError::Render(format!("could not write input file: {}", e)))?;

        let output_arg = match output {
            Some(path) => path.to_string_lossy().into_owned(),
            None => "-".to_string(), // PDF on stdout
        };

        log::debug!(
            "Invoking wkhtmltopdf ({} bytes of HTML, output: {})",
            html.len(),
            output_arg
        );

        let result = self
            .build_command(options, input.path(), &output_arg)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| RenderError::Render(format!("could not spawn wkhtmltopdf: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(RenderError::Render(format!(
                "wkhtmltopdf failed ({}): {}",
                result.status,
                stderr.trim()
            )));
        }

        match output {
            Some(path) => Ok(RenderOutput::File(path.to_path_buf())),
            None => Ok(RenderOutput::Bytes(result.stdout)),
        }
    }
}

/// wkhtmltopdf's name for a named page size.
fn wkhtmltopdf_size_name(size: PageSize) -> &'static str {
    match size {
        PageSize::A4 => "A4",
        PageSize::A3 => "A3",
        PageSize::A5 => "A5",
        PageSize::Letter => "Letter",
        PageSize::Legal => "Legal",
        PageSize::Tabloid => "Tabloid",
        PageSize::Ledger => "Ledger",
        // Callers with Custom take the explicit-dimensions branch.
        PageSize::Custom => "A4",
    }
}

fn custom_dimensions(options: &LayoutOptions) -> (f64, f64) {
    (
        options.page_width.unwrap_or(210.0),
        options.page_height.unwrap_or(297.0),
    )
}

// ============================================================================
// Mock fallback for testing
// ============================================================================

/// Mock fallback renderer for testing without wkhtmltopdf.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fallback that returns fixed bytes (or always fails) and counts calls.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use chromeprint::fallback::mock::MockFallbackRenderer;
    ///
    /// let fallback = MockFallbackRenderer::returning(b"%PDF-mock".to_vec());
    /// let calls = fallback.counter();
    /// ```
    pub struct MockFallbackRenderer {
        bytes: Option<Vec<u8>>,
        error_message: String,
        call_count: Arc<AtomicUsize>,
    }

    impl MockFallbackRenderer {
        /// Mock that succeeds with the given bytes.
        pub fn returning(bytes: Vec<u8>) -> Self {
            Self {
                bytes: Some(bytes),
                error_message: String::new(),
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Mock whose renders always fail with the given message.
        pub fn always_fails<S: Into<String>>(message: S) -> Self {
            Self {
                bytes: None,
                error_message: message.into(),
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Number of render calls seen so far.
        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Clone of the call counter, for tracking after the mock has been
        /// moved into a pipeline.
        pub fn counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.call_count)
        }
    }

    impl FallbackRenderer for MockFallbackRenderer {
        fn render(
            &self,
            _html: &str,
            _options: &LayoutOptions,
            output: Option<&Path>,
        ) -> Result<RenderOutput> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match &self.bytes {
                Some(bytes) => match output {
                    Some(path) => {
                        std::fs::write(path, bytes)?;
                        Ok(RenderOutput::File(path.to_path_buf()))
                    }
                    None => Ok(RenderOutput::Bytes(bytes.clone())),
                },
                None => Err(RenderError::Render(self.error_message.clone())),
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
