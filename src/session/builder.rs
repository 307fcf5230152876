//! Builder pattern for session configuration.
//!
//! Provides a fluent API for configuring and creating [`Session`] instances.
//!
//! # Example
//!
//! ```no_run
//! use chromium_session::{ChromiumEngine, Session};
//!
//! # fn example() -> chromium_session::Result<()> {
//! let engine = ChromiumEngine::discover()?;
//! let session = Session::builder(engine)
//!     .profile("alice")
//!     .headless()
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::engine::Engine;
use crate::error::{Error, Result};

use super::core::Session;
use super::options::SessionOptions;
use super::paths::{DEFAULT_SCREENSHOTS_ROOT, DEFAULT_SESSIONS_ROOT, SessionPaths};

// ============================================================================
// SessionBuilder
// ============================================================================

/// Builder for configuring a [`Session`] instance.
///
/// Use [`Session::builder()`] to create a new builder.
#[derive(Debug)]
pub struct SessionBuilder<E: Engine> {
    /// The automation engine that will launch the browser.
    engine: E,
    /// Profile name; `None` selects the default profile.
    profile_name: Option<String>,
    /// Launch options.
    options: SessionOptions,
    /// Root directory for profile directories.
    sessions_root: PathBuf,
    /// Root directory for screenshot directories.
    screenshots_root: PathBuf,
}

// ============================================================================
// SessionBuilder Implementation
// ============================================================================

impl<E: Engine> SessionBuilder<E> {
    /// Creates a new session builder around an engine.
    #[inline]
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            profile_name: None,
            options: SessionOptions::new(),
            sessions_root: PathBuf::from(DEFAULT_SESSIONS_ROOT),
            screenshots_root: PathBuf::from(DEFAULT_SCREENSHOTS_ROOT),
        }
    }

    /// Sets the profile name the session persists under.
    ///
    /// Absent or empty names select the `"default"` profile.
    #[inline]
    #[must_use]
    pub fn profile(mut self, name: impl Into<String>) -> Self {
        self.profile_name = Some(name.into());
        self
    }

    /// Enables headless mode.
    #[inline]
    #[must_use]
    pub fn headless(mut self) -> Self {
        self.options = self.options.with_headless();
        self
    }

    /// Sets whether the browser runs headless.
    #[inline]
    #[must_use]
    pub fn headless_if(mut self, headless: bool) -> Self {
        self.options.headless = headless;
        self
    }

    /// Sets the page-load timeout.
    #[inline]
    #[must_use]
    pub fn page_load_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_page_load_timeout(timeout);
        self
    }

    /// Sets the settle delay applied before tab normalization.
    #[inline]
    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.options = self.options.with_settle_delay(delay);
        self
    }

    /// Overrides the root directory profiles are stored under.
    #[inline]
    #[must_use]
    pub fn sessions_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sessions_root = root.into();
        self
    }

    /// Overrides the root directory screenshots are stored under.
    #[inline]
    #[must_use]
    pub fn screenshots_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.screenshots_root = root.into();
        self
    }

    /// Builds the session.
    ///
    /// Synchronous: sanitizes the profile name, derives the profile and
    /// screenshot directories, and creates the screenshot directory before
    /// any asynchronous work begins.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidProfileName`](crate::Error::InvalidProfileName) if
    ///   the profile name fails sanitization
    /// - [`Error::Config`](crate::Error::Config) if the options are invalid
    /// - [`Error::Profile`](crate::Error::Profile) if the screenshot
    ///   directory cannot be created
    pub fn build(self) -> Result<Session<E>> {
        self.options.validate().map_err(Error::config)?;

        let paths = SessionPaths::derive(
            &self.sessions_root,
            &self.screenshots_root,
            self.profile_name.as_deref(),
        )?;
        paths.ensure_screenshot_dir()?;

        if self.options.headless {
            info!("Running in headless mode");
        }

        Ok(Session::new(self.engine, self.options, paths))
    }
}

// ============================================================================
// Tests
// ============================================================================
