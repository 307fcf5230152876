//! Automation engine seam.
//!
//! The session manager drives a browser exclusively through the traits in
//! this module:
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`Engine`] | Launches a browser bound to a profile directory |
//! | [`Browser`] | A live browser instance: page creation, enumeration, teardown |
//! | [`Page`] | A single tab: screenshot capture and close |
//!
//! The real implementation is [`ChromiumEngine`]; tests script the lifecycle
//! through a fake.

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// Chromium engine: process spawn + DevTools protocol.
pub mod chromium;

/// Scripted engine for lifecycle tests.
#[cfg(test)]
pub mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use chromium::ChromiumEngine;

// ============================================================================
// LaunchSpec
// ============================================================================

/// Everything an engine needs to launch a browser for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Absolute path to the persistent profile directory.
    pub profile_dir: PathBuf,

    /// Run the browser without a GUI.
    pub headless: bool,
}

impl LaunchSpec {
    /// Creates a launch spec.
    #[inline]
    #[must_use]
    pub fn new(profile_dir: impl Into<PathBuf>, headless: bool) -> Self {
        Self {
            profile_dir: profile_dir.into(),
            headless,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Launches browser instances.
///
/// Implementations own the engine-level resources (binary path, protocol
/// plumbing); each successful [`launch`](Engine::launch) hands the caller an
/// exclusive [`Browser`] handle whose drop tears the instance down.
#[async_trait]
pub trait Engine: Send + Sync {
    /// The browser handle type produced by this engine.
    type Browser: Browser;

    /// Launches a browser bound to the spec's profile directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or the engine
    /// cannot attach to it.
    async fn launch(&self, spec: &LaunchSpec) -> Result<Self::Browser>;
}

// ============================================================================
// Browser
// ============================================================================

/// A live browser instance.
#[async_trait]
pub trait Browser: Send + Sync {
    /// The page handle type produced by this browser.
    type Page: Page;

    /// Opens a new page (tab) and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be created.
    async fn new_page(&self) -> Result<Self::Page>;

    /// Returns handles for all open pages, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the page list cannot be read.
    async fn pages(&self) -> Result<Vec<Self::Page>>;

    /// Closes the browser instance and releases its resources.
    ///
    /// # Errors
    ///
    /// Returns an error if teardown fails; the underlying process is still
    /// reclaimed on drop.
    async fn close(&self) -> Result<()>;
}

// ============================================================================
// Page
// ============================================================================

/// A single browser tab.
#[async_trait]
pub trait Page: Send + Sync {
    /// Captures the page as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture fails.
    async fn capture_png(&self) -> Result<Vec<u8>>;

    /// Closes this page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be closed.
    async fn close(&self) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::LaunchSpec;

    #[test]
    fn test_launch_spec_new() {
        let spec = LaunchSpec::new("/tmp/profile", true);
        assert_eq!(spec.profile_dir, std::path::PathBuf::from("/tmp/profile"));
        assert!(spec.headless);
    }
}
