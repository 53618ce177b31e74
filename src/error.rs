//! Error types for the render pipeline and process supervisor.
//!
//! This module provides [`RenderError`], a unified error type covering every
//! stage of PDF generation, and a convenient [`Result`] type alias.
//!
//! # Fallback classification
//!
//! The pipeline does not treat failures as a generic catch-all. Each variant
//! is explicitly classified via [`RenderError::triggers_fallback`]: stages up
//! to and including the render call divert to the fallback renderer, while
//! [`RenderError::Fallback`] is terminal and carries both the browser-path
//! error and the fallback error for diagnosis.
//!
//! # Example
//!
//! ```rust
//! use chromeprint::{RenderError, Result};
//!
//! fn render() -> Result<Vec<u8>> {
//!     Err(RenderError::ProcessStart("engine exited during warm-up".to_string()))
//! }
//!
//! match render() {
//!     Ok(pdf) => println!("Generated {} bytes", pdf.len()),
//!     Err(e) if e.triggers_fallback() => println!("diverting to fallback: {}", e),
//!     Err(e) => eprintln!("terminal: {}", e),
//! }
//! ```

/// Errors that can occur while supervising the engine or rendering a PDF.
///
/// Variants correspond to the stages of a render request. Every variant up
/// to and including [`Render`](Self::Render) diverts the request to the
/// fallback renderer; [`Fallback`](Self::Fallback) is the single terminal
/// failure a caller can observe from a render request.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No Chromium executable could be resolved.
    ///
    /// Raised by the engine locator before any process is spawned. Fatal to
    /// the browser path of the current request, non-fatal to the system.
    #[error("no Chromium executable available: {0}")]
    EngineResolution(String),

    /// The engine process could not be spawned, or exited before the
    /// warm-up interval elapsed.
    #[error("Chromium failed to start: {0}")]
    ProcessStart(String),

    /// A DevTools session could not be established against a supposedly
    /// live engine process.
    ///
    /// Covers both the `/json/version` endpoint discovery and the WebSocket
    /// connection itself.
    #[error("DevTools connection failed: {0}")]
    Connection(String),

    /// The session was established but the render itself failed.
    ///
    /// Covers tab creation, content loading, print-media emulation, and the
    /// `Page.printToPDF` call.
    #[error("PDF render failed: {0}")]
    Render(String),

    /// The fallback renderer also failed. Terminal.
    ///
    /// Carries the original browser-path error alongside the fallback
    /// error so both ends of the failure can be diagnosed from one value.
    #[error("fallback renderer failed: {fallback} (browser path failed first: {browser})")]
    Fallback {
        /// The error that diverted the request to the fallback path.
        browser: Box<RenderError>,
        /// The fallback renderer's own failure.
        fallback: Box<RenderError>,
    },

    /// Invalid configuration or builder input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An I/O failure outside the render itself, e.g. writing the output
    /// file. Does not divert to the fallback.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Whether this failure diverts the request to the fallback renderer.
    ///
    /// New variants must be deliberately classified here; the pipeline's
    /// fallback branch matches on this instead of catching everything.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            RenderError::EngineResolution(_)
                | RenderError::ProcessStart(_)
                | RenderError::Connection(_)
                | RenderError::Render(_)
        )
    }

    /// Short stable name of the failing stage, for log context.
    pub fn stage(&self) -> &'static str {
        match self {
            RenderError::EngineResolution(_) => "engine-resolution",
            RenderError::ProcessStart(_) => "process-start",
            RenderError::Connection(_) => "connection",
            RenderError::Render(_) => "render",
            RenderError::Fallback { .. } => "fallback",
            RenderError::Configuration(_) => "configuration",
            RenderError::Io(_) => "io",
        }
    }
}

/// Convenience conversion from [`String`] to [`RenderError::Configuration`].
impl From<String> for RenderError {
    fn from(msg: String) -> Self {
        RenderError::Configuration(msg)
    }
}

/// Convenience conversion from `&str` to [`RenderError::Configuration`].
impl From<&str> for RenderError {
    fn from(msg: &str) -> Self {
        RenderError::Configuration(msg.to_string())
    }
}

/// Result type alias using [`RenderError`].
pub type Result<T> = std::result::Result<T, RenderError>;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Every pre-fallback stage diverts; terminal and ambient errors do not.
    #[test]
    fn test_fallback_classification() {
        assert!(RenderError::EngineResolution("x".into()).triggers_fallback());
        assert!(RenderError::ProcessStart("x".into()).triggers_fallback());
        assert!(RenderError::Connection("x".into()).triggers_fallback());
        assert!(RenderError::Render("x".into()).triggers_fallback());

        let terminal = RenderError::Fallback {
            browser: Box::new(RenderError::Render("a".into())),
            fallback: Box::new(RenderError::Render("b".into())),
        };
        assert!(!terminal.triggers_fallback());
        assert!(!RenderError::Configuration("x".into()).triggers_fallback());
        assert!(!RenderError::Io(std::io::Error::other("x")).triggers_fallback());
    }

    /// Terminal errors carry both sides of the failure in their message.
    #[test]
    fn test_fallback_error_carries_both_contexts() {
        let err = RenderError::Fallback {
            browser: Box::new(RenderError::ProcessStart("exited early".into())),
            fallback: Box::new(RenderError::Render("wkhtmltopdf exit 1".into())),
        };
        let msg = err.to_string();
        assert!(msg.contains("exited early"));
        assert!(msg.contains("wkhtmltopdf exit 1"));
    }

    #[test]
    fn test_error_conversion() {
        let error: RenderError = "test error".into();
        assert!(matches!(error, RenderError::Configuration(_)));

        let error: RenderError = "another error".to_string().into();
        assert!(matches!(error, RenderError::Configuration(_)));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(RenderError::Connection("x".into()).stage(), "connection");
        assert_eq!(
            RenderError::EngineResolution("x".into()).stage(),
            "engine-resolution"
        );
    }

    /// RenderError must be Send + Sync so it can cross spawn_blocking.
    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + std::error::Error>() {}
        assert_send_sync::<RenderError>();
    }
}
