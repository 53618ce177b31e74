//! System Chromium discovery.

use std::path::PathBuf;

use crate::error::{RenderError, Result};
use super::EngineLocator;

/// Candidate binary names probed on `PATH`, most specific first.
const PATH_CANDIDATES: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Well-known absolute install locations probed after `PATH`.
///
/// | Platform | Paths |
/// |----------|-------|
/// | Linux | `/usr/bin/google-chrome`, `/usr/bin/chromium`, `/snap/bin/chromium` |
/// | macOS | `/Applications/Google Chrome.app/Contents/MacOS/Google Chrome`, Chromium equivalent |
/// | Windows | `C:\Program Files\Google\Chrome\Application\chrome.exe` (both program-files roots) |
const KNOWN_LOCATIONS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

/// Locator that resolves Chromium from an explicit path or the system.
///
/// With an explicit path the locator only verifies the file exists. In
/// auto-detect mode it probes `PATH` via the `which` crate, then the
/// well-known install locations.
///
/// # Example
///
/// ```rust,ignore
/// use chromeprint::SystemEngineLocator;
///
/// // Auto-detect
/// let locator = SystemEngineLocator::with_defaults();
///
/// // Pinned binary
/// let locator = SystemEngineLocator::with_path("/usr/bin/chromium");
/// ```
pub struct SystemEngineLocator {
    explicit_path: Option<PathBuf>,
}

impl SystemEngineLocator {
    /// Create a locator that auto-detects an installed Chromium.
    pub fn with_defaults() -> Self {
        log::debug!("Creating SystemEngineLocator with auto-detect");
        Self {
            explicit_path: None,
        }
    }

    /// Create a locator pinned to a specific binary path.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        log::debug!("Creating SystemEngineLocator with pinned path: {}", path.display());
        Self {
            explicit_path: Some(path),
        }
    }

    /// Create a locator from the `CHROME_PATH` environment variable,
    /// falling back to auto-detect when it is unset.
    #[cfg(feature = "env-config")]
    pub fn from_env() -> Self {
        match crate::config::env::chrome_path_from_env() {
            Some(path) => Self::with_path(path),
            None => Self::with_defaults(),
        }
    }

    fn discover() -> Option<PathBuf> {
        for name in PATH_CANDIDATES {
            if let Ok(path) = which::which(name) {
                log::debug!("Found Chromium on PATH: {}", path.display());
                return Some(path);
            }
        }
        for location in KNOWN_LOCATIONS {
            let path = PathBuf::from(location);
            if path.is_file() {
                log::debug!("Found Chromium at known location: {}", path.display());
                return Some(path);
            }
        }
        None
    }
}

impl EngineLocator for SystemEngineLocator {
    fn resolve(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit_path {
            return if path.is_file() {
                Ok(path.clone())
            } else {
                Err(RenderError::EngineResolution(format!(
                    "pinned path does not exist: {}",
                    path.display()
                )))
            };
        }

        Self::discover().ok_or_else(|| {
            RenderError::EngineResolution(
                "no Chromium found on PATH or in well-known locations".to_string(),
            )
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_missing_path_is_resolution_failure() {
        let locator = SystemEngineLocator::with_path("/definitely/not/a/browser");
        let err = locator.resolve().unwrap_err();
        assert!(matches!(err, RenderError::EngineResolution(_)));
        assert_eq!(err.stage(), "engine-resolution");
    }

    #[test]
    fn test_pinned_existing_file_resolves() {
        // Any file that exists works; the locator does not execute it.
        let file = tempfile::NamedTempFile::new().unwrap();
        let locator = SystemEngineLocator::with_path(file.path());
        assert_eq!(locator.resolve().unwrap(), file.path());
    }
}
