//! Per-print-format stored configuration.
//!
//! The host application persists a per-print-format orientation default;
//! the pipeline consults it once per request to seed [`LayoutOptions`]
//! when the caller does not specify orientation explicitly. The store is an
//! external collaborator, so it is modeled as a trait with an in-memory
//! implementation for hosts (and tests) that keep the mapping locally.
//!
//! [`LayoutOptions`]: crate::LayoutOptions

use std::collections::HashMap;

use crate::options::Orientation;

/// Read access to per-print-format stored defaults.
pub trait PrintFormatStore: Send + Sync {
    /// The stored orientation default for a print format, if any.
    fn orientation_default(&self, format_id: &str) -> Option<Orientation>;
}

/// Store with no entries; every lookup misses.
///
/// The pipeline's default when the host has no persisted configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFormatStore;

impl PrintFormatStore for NoFormatStore {
    fn orientation_default(&self, _format_id: &str) -> Option<Orientation> {
        None
    }
}

/// In-memory map from print-format id to orientation default.
///
/// # Example
///
/// ```rust
/// use chromeprint::{InMemoryFormatStore, PrintFormatStore, Orientation};
///
/// let mut store = InMemoryFormatStore::new();
/// store.set("Wide Invoice", Orientation::Landscape);
///
/// assert_eq!(store.orientation_default("Wide Invoice"), Some(Orientation::Landscape));
/// assert_eq!(store.orientation_default("Unknown"), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryFormatStore {
    orientations: HashMap<String, Orientation>,
}

impl InMemoryFormatStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the orientation default for a print format.
    pub fn set<S: Into<String>>(&mut self, format_id: S, orientation: Orientation) {
        self.orientations.insert(format_id.into(), orientation);
    }
}

impl PrintFormatStore for InMemoryFormatStore {
    fn orientation_default(&self, format_id: &str) -> Option<Orientation> {
        self.orientations.get(format_id).copied()
    }
}
