//! Session lifecycle management.
//!
//! A [`Session`] supervises one persistent, stateful browsing session: it
//! launches a browser bound to a durable profile directory, keeps exactly
//! one page active, captures screenshots into a session-scoped directory,
//! and tears the browser down on success or failure.
//!
//! # Example
//!
//! ```no_run
//! use chromium_session::{ChromiumEngine, Session};
//!
//! # async fn example() -> chromium_session::Result<()> {
//! let engine = ChromiumEngine::discover()?;
//! let mut session = Session::builder(engine)
//!     .profile("alice")
//!     .headless()
//!     .build()?;
//!
//! session.start().await;
//! session.screenshot("landing").await?;
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info};

use crate::engine::{Browser, Engine, LaunchSpec, Page};
use crate::error::{Error, Result};

use super::builder::SessionBuilder;
use super::options::SessionOptions;
use super::paths::SessionPaths;

// ============================================================================
// Session
// ============================================================================

/// A persistent browsing session.
///
/// The session is constructed synchronously (path derivation + screenshot
/// directory creation) and owns at most one live browser handle at a time.
/// Lifecycle methods take `&mut self`; concurrent starts are impossible by
/// construction.
pub struct Session<E: Engine> {
    /// The automation engine that launches the browser.
    engine: E,

    /// Launch options.
    options: SessionOptions,

    /// Derived profile and screenshot locations.
    paths: SessionPaths,

    /// Live browser handle, present between a successful launch and close.
    browser: Option<E::Browser>,

    /// The single active page.
    page: Option<<E::Browser as Browser>::Page>,
}

// ============================================================================
// Session - Construction
// ============================================================================

impl<E: Engine> Session<E> {
    /// Creates a configuration builder for a session.
    #[inline]
    #[must_use]
    pub fn builder(engine: E) -> SessionBuilder<E> {
        SessionBuilder::new(engine)
    }

    /// Creates a session from already-validated parts.
    pub(crate) fn new(engine: E, options: SessionOptions, paths: SessionPaths) -> Self {
        debug!(
            profile = %paths.profile_name(),
            profile_dir = %paths.profile_dir().display(),
            screenshot_dir = %paths.screenshot_dir().display(),
            "Session created"
        );

        Self {
            engine,
            options,
            paths,
            browser: None,
            page: None,
        }
    }
}

// ============================================================================
// Session - Accessors
// ============================================================================

impl<E: Engine> Session<E> {
    /// Returns the sanitized profile name.
    #[inline]
    #[must_use]
    pub fn profile_name(&self) -> &str {
        self.paths.profile_name()
    }

    /// Returns the persistent profile directory.
    #[inline]
    #[must_use]
    pub fn profile_dir(&self) -> &Path {
        self.paths.profile_dir()
    }

    /// Returns the screenshot directory.
    #[inline]
    #[must_use]
    pub fn screenshot_dir(&self) -> &Path {
        self.paths.screenshot_dir()
    }

    /// Returns the launch options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Returns `true` if a browser is currently alive.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.browser.is_some()
    }
}

// ============================================================================
// Session - Lifecycle
// ============================================================================

impl<E: Engine> Session<E> {
    /// Starts the session, never surfacing an error.
    ///
    /// Runs the launch sequence; on any failure the error is logged, a
    /// best-effort [`close`](Session::close) is attempted, and a secondary
    /// cleanup failure is logged separately. Intended for long-running,
    /// unattended callers whose only failure signal is the log stream.
    /// Callers that need to branch on outcome use
    /// [`try_start`](Session::try_start).
    pub async fn start(&mut self) {
        // try_start has already logged both the failure and any cleanup
        // failure by the time it returns.
        let _ = self.try_start().await;
    }

    /// Starts the session, returning a tagged result.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionActive`] if a browser is already alive
    /// - [`Error::Launch`] wrapping the failure if the launch sequence
    ///   fails; the close path has already run exactly once by then
    pub async fn try_start(&mut self) -> Result<()> {
        if self.browser.is_some() {
            return Err(Error::SessionActive);
        }

        match self.run_launch().await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "Session launch failed, closing the browser");
                if let Err(close_err) = self.close().await {
                    error!(error = %close_err, "Error while closing the browser");
                }
                Err(Error::launch(e))
            }
        }
    }

    /// The ordered launch sequence.
    ///
    /// Launch the browser, open the first page under the configured
    /// page-load timeout, let the browser's own initial tabs settle, then
    /// close every page except the first.
    async fn run_launch(&mut self) -> Result<()> {
        info!(
            profile = %self.paths.profile_name(),
            headless = self.options.headless,
            "Launching browser"
        );

        let spec = LaunchSpec::new(self.paths.profile_dir(), self.options.headless);
        let browser = self.engine.launch(&spec).await?;
        self.browser = Some(browser);

        // Reborrow the stored handle so a mid-sequence failure leaves it
        // reachable for the close path.
        let Some(browser) = self.browser.as_ref() else {
            return Err(Error::NoActivePage);
        };

        let timeout_ms = self.options.page_load_timeout.as_millis() as u64;
        let page = timeout(self.options.page_load_timeout, browser.new_page())
            .await
            .map_err(|_| Error::timeout("open initial page", timeout_ms))??;
        self.page = Some(page);

        // The page count must be observed only after the browser's own
        // initial tabs have had time to open.
        sleep(self.options.settle_delay).await;

        let mut pages = browser.pages().await?.into_iter();
        if let Some(first) = pages.next() {
            let extras: Vec<_> = pages.collect();
            if !extras.is_empty() {
                info!(closing = extras.len(), "Multiple initial tabs, keeping the first");
                for extra in extras {
                    extra.close().await?;
                }
            }
            self.page = Some(first);
        }

        Ok(())
    }

    /// Closes the browser if one is alive.
    ///
    /// Idempotent: closing an already-closed session is a no-op. On the
    /// `start` error path this is invoked exactly once and its failure is
    /// logged, never propagated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cleanup`] wrapping the teardown failure.
    pub async fn close(&mut self) -> Result<()> {
        self.page = None;

        let Some(browser) = self.browser.take() else {
            return Ok(());
        };

        info!(profile = %self.paths.profile_name(), "Closing browser");
        browser.close().await.map_err(Error::cleanup)
    }
}

// ============================================================================
// Session - Helpers
// ============================================================================

impl<E: Engine> Session<E> {
    /// Suspends for a uniformly-random whole-second duration in
    /// `[min_secs, max_secs]`, both ends inclusive.
    ///
    /// A pacing primitive: callers interleave it with their automation
    /// steps to avoid fixed, detectable timing patterns. Degenerate ranges
    /// (`min_secs >= max_secs`) sleep exactly `min_secs`.
    pub async fn wait(&self, min_secs: u64, max_secs: u64) {
        sleep(Duration::from_secs(pick_wait_secs(min_secs, max_secs))).await;
    }

    /// Suspends for exactly one second.
    pub async fn pause(&self) {
        self.wait(1, 1).await;
    }

    /// Captures the active page to `<screenshot dir>/<name>.png`.
    ///
    /// Overwrites an existing file of the same name (last write wins) and
    /// returns the written path.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActivePage`] if called before launch or after close
    /// - capture or IO errors from the engine / filesystem
    pub async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        let Some(page) = self.page.as_ref() else {
            return Err(Error::NoActivePage);
        };

        let bytes = page.capture_png().await?;
        let path = self.paths.screenshot_dir().join(format!("{name}.png"));
        fs::write(&path, bytes)?;

        debug!(path = %path.display(), "Screenshot saved");
        Ok(path)
    }
}

// ============================================================================
// Private Helpers
// ============================================================================

/// Picks a whole-second wait from `[min, max]` inclusive.
fn pick_wait_secs(min: u64, max: u64) -> u64 {
    if max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    }
}

// ============================================================================
// Tests
// ============================================================================
