//! Supervisor configuration.
//!
//! This module provides [`SupervisorConfig`] and its validating builder,
//! plus an optional environment-based loader (behind the `env-config`
//! feature) that reads from an `app.env` file or the process environment.
//!
//! # Example
//!
//! ```rust
//! use chromeprint::SupervisorConfigBuilder;
//! use std::time::Duration;
//!
//! let config = SupervisorConfigBuilder::new()
//!     .debug_port(9223)
//!     .warmup(Duration::from_secs(2))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.debug_port, 9223);
//! ```

use std::time::Duration;

/// Configuration for the Chromium process supervisor.
///
/// All waits in the supervisor are bounded by these values; none of them
/// blocks indefinitely.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Host the engine's debug port binds to. Localhost-only trust
    /// boundary; the DevTools endpoint carries no authentication.
    pub host: String,

    /// Fixed remote-debugging port the engine listens on.
    pub debug_port: u16,

    /// Fixed delay after spawn before the debug port is assumed
    /// connectable.
    ///
    /// A fixed delay is used instead of an active readiness poll: the port
    /// accepts connections deterministically shortly after spawn, and the
    /// process is kept warm across requests so the cost is paid once.
    pub warmup: Duration,

    /// How long `stop()` waits for graceful termination before force-killing.
    pub shutdown_grace: Duration,
}

impl Default for SupervisorConfig {
    /// Default configuration: `127.0.0.1:9222`, 3 s warm-up, 5 s grace.
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            debug_port: 9222,
            warmup: Duration::from_secs(3),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// Builder for [`SupervisorConfig`] with validation at build time.
///
/// # Example
///
/// ```rust
/// use chromeprint::SupervisorConfigBuilder;
/// use std::time::Duration;
///
/// let config = SupervisorConfigBuilder::new()
///     .host("localhost")
///     .debug_port(9222)
///     .shutdown_grace(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct SupervisorConfigBuilder {
    host: Option<String>,
    debug_port: Option<u16>,
    warmup: Option<Duration>,
    shutdown_grace: Option<Duration>,
}

impl SupervisorConfigBuilder {
    /// Create a builder seeded with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host the debug port binds to.
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the remote-debugging port.
    pub fn debug_port(mut self, port: u16) -> Self {
        self.debug_port = Some(port);
        self
    }

    /// Set the fixed warm-up delay after spawn.
    pub fn warmup(mut self, warmup: Duration) -> Self {
        self.warmup = Some(warmup);
        self
    }

    /// Set the grace period `stop()` waits before force-killing.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = Some(grace);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a message when the port is zero, the host is empty, or the
    /// warm-up exceeds 60 seconds (almost certainly a unit mistake).
    pub fn build(self) -> std::result::Result<SupervisorConfig, String> {
        let defaults = SupervisorConfig::default();
        let config = SupervisorConfig {
            host: self.host.unwrap_or(defaults.host),
            debug_port: self.debug_port.unwrap_or(defaults.debug_port),
            warmup: self.warmup.unwrap_or(defaults.warmup),
            shutdown_grace: self.shutdown_grace.unwrap_or(defaults.shutdown_grace),
        };

        if config.debug_port == 0 {
            return Err("debug_port must be non-zero".to_string());
        }
        if config.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        if config.warmup > Duration::from_secs(60) {
            return Err(format!(
                "warmup of {}s exceeds the 60s sanity bound",
                config.warmup.as_secs()
            ));
        }

        Ok(config)
    }
}

// ============================================================================
// Environment-based configuration (feature-gated)
// ============================================================================

/// Environment-based configuration loading.
///
/// Reads from an `app.env` file in the working directory (preferred over
/// `.env` for cross-platform visibility) or from the process environment.
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `CHROME_PATH` | String | auto | Custom Chromium binary path |
/// | `CHROME_DEBUG_PORT` | u16 | 9222 | Remote-debugging port |
/// | `CHROME_WARMUP_SECONDS` | u64 | 3 | Warm-up delay after spawn |
/// | `CHROME_SHUTDOWN_GRACE_SECONDS` | u64 | 5 | Grace before force-kill |
#[cfg(feature = "env-config")]
pub mod env {
    use super::*;
    use crate::error::{RenderError, Result};

    /// Name of the environment file loaded before reading variables.
    pub const ENV_FILE_NAME: &str = "app.env";

    /// Load the `app.env` file if present.
    ///
    /// Missing files are not an error; system environment variables still
    /// apply.
    pub fn load_env_file() -> Option<std::path::PathBuf> {
        match dotenvy::from_filename(ENV_FILE_NAME) {
            Ok(path) => {
                log::debug!("Loaded environment from {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::debug!("No {} file loaded: {}", ENV_FILE_NAME, e);
                None
            }
        }
    }

    /// Build a [`SupervisorConfig`] from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Configuration`] when a variable is present but
    /// unparseable, or when the resulting configuration fails validation.
    pub fn from_env() -> Result<SupervisorConfig> {
        load_env_file();

        let mut builder = SupervisorConfigBuilder::new();

        if let Some(port) = parse_var::<u16>("CHROME_DEBUG_PORT")? {
            builder = builder.debug_port(port);
        }
        if let Some(secs) = parse_var::<u64>("CHROME_WARMUP_SECONDS")? {
            builder = builder.warmup(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var::<u64>("CHROME_SHUTDOWN_GRACE_SECONDS")? {
            builder = builder.shutdown_grace(Duration::from_secs(secs));
        }

        builder.build().map_err(RenderError::Configuration)
    }

    /// Read `CHROME_PATH` from the environment, if set and non-empty.
    pub fn chrome_path_from_env() -> Option<String> {
        load_env_file();
        std::env::var("CHROME_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
    }

    fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        match std::env::var(name) {
            Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
                RenderError::Configuration(format!("invalid {}: {} ({})", name, raw, e))
            }),
            Err(_) => Ok(None),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
