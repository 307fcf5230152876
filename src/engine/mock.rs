//! Scripted engine for lifecycle tests.
//!
//! Simulates a browser that opens a configurable number of its own initial
//! tabs and can be told to fail at launch, page creation, or teardown.
//! Shared [`MockState`] counters let tests assert how often the close path
//! ran and which pages survived.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::{Browser, Engine, LaunchSpec, Page};

// ============================================================================
// Constants
// ============================================================================

/// PNG payload returned by every mock capture (signature + marker bytes).
pub const TINY_PNG: &[u8] = b"\x89PNG\r\n\x1a\nmock";

// ============================================================================
// MockState
// ============================================================================

/// Observation state shared between a [`MockEngine`] and the test.
#[derive(Debug, Default)]
pub struct MockState {
    launches: AtomicUsize,
    browser_closes: AtomicUsize,
    pages: Mutex<Vec<MockPage>>,
    last_spec: Mutex<Option<LaunchSpec>>,
}

impl MockState {
    /// Number of successful launches.
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Number of times `Browser::close` was invoked.
    pub fn browser_closes(&self) -> usize {
        self.browser_closes.load(Ordering::SeqCst)
    }

    /// Creation-order indices of the pages still open.
    pub fn open_page_indices(&self) -> Vec<usize> {
        self.pages
            .lock()
            .iter()
            .filter(|p| p.is_open())
            .map(|p| p.index)
            .collect()
    }

    /// The spec passed to the most recent launch.
    pub fn last_spec(&self) -> Option<LaunchSpec> {
        self.last_spec.lock().clone()
    }
}

// ============================================================================
// MockEngine
// ============================================================================

/// Scripted [`Engine`] implementation.
#[derive(Debug, Default)]
pub struct MockEngine {
    initial_tabs: usize,
    fail_launch: bool,
    fail_new_page: bool,
    fail_close: bool,
    state: Arc<MockState>,
}

impl MockEngine {
    /// Engine whose browser opens `count` tabs of its own at launch.
    #[must_use]
    pub fn with_initial_tabs(count: usize) -> Self {
        Self {
            initial_tabs: count,
            ..Self::default()
        }
    }

    /// Engine whose launch fails.
    #[must_use]
    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    /// Engine whose page creation fails.
    #[must_use]
    pub fn failing_new_page() -> Self {
        Self {
            fail_new_page: true,
            ..Self::default()
        }
    }

    /// Makes browser teardown fail as well.
    #[must_use]
    pub fn and_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Returns the shared observation state.
    #[must_use]
    pub fn state(&self) -> Arc<MockState> {
        Arc::clone(&self.state)
    }
}

#[async_trait]
impl Engine for MockEngine {
    type Browser = MockBrowser;

    async fn launch(&self, spec: &LaunchSpec) -> Result<Self::Browser> {
        *self.state.last_spec.lock() = Some(spec.clone());

        if self.fail_launch {
            return Err(Error::process_launch_failed(IoError::other(
                "injected launch failure",
            )));
        }

        // A real engine materializes the user-data directory on launch.
        std::fs::create_dir_all(&spec.profile_dir)?;

        {
            let mut pages = self.state.pages.lock();
            pages.clear();
            for index in 0..self.initial_tabs {
                pages.push(MockPage::new(index));
            }
        }

        self.state.launches.fetch_add(1, Ordering::SeqCst);

        Ok(MockBrowser {
            fail_new_page: self.fail_new_page,
            fail_close: self.fail_close,
            state: Arc::clone(&self.state),
        })
    }
}

// ============================================================================
// MockBrowser
// ============================================================================

/// Browser handle produced by [`MockEngine`].
#[derive(Debug)]
pub struct MockBrowser {
    fail_new_page: bool,
    fail_close: bool,
    state: Arc<MockState>,
}

#[async_trait]
impl Browser for MockBrowser {
    type Page = MockPage;

    async fn new_page(&self) -> Result<Self::Page> {
        if self.fail_new_page {
            return Err(Error::connection("injected page failure"));
        }

        let mut pages = self.state.pages.lock();
        let page = MockPage::new(pages.len());
        pages.push(page.clone());
        Ok(page)
    }

    async fn pages(&self) -> Result<Vec<Self::Page>> {
        Ok(self
            .state
            .pages
            .lock()
            .iter()
            .filter(|p| p.is_open())
            .cloned()
            .collect())
    }

    async fn close(&self) -> Result<()> {
        self.state.browser_closes.fetch_add(1, Ordering::SeqCst);

        if self.fail_close {
            return Err(Error::connection("injected close failure"));
        }

        for page in self.state.pages.lock().iter() {
            page.open.store(false, Ordering::SeqCst);
        }
        Ok(())
    }
}

// ============================================================================
// MockPage
// ============================================================================

/// Page handle produced by [`MockBrowser`].
#[derive(Debug, Clone)]
pub struct MockPage {
    /// Creation-order index within the browser.
    pub index: usize,
    open: Arc<AtomicBool>,
}

impl MockPage {
    fn new(index: usize) -> Self {
        Self {
            index,
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Returns `true` while the page has not been closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Page for MockPage {
    async fn capture_png(&self) -> Result<Vec<u8>> {
        if !self.is_open() {
            return Err(Error::protocol("capture on closed page"));
        }
        Ok(TINY_PNG.to_vec())
    }

    async fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_launch_opens_initial_tabs() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let engine = MockEngine::with_initial_tabs(3);
        let spec = LaunchSpec::new(tmp.path().join("profile"), true);

        let browser = engine.launch(&spec).await.expect("launch");
        assert_eq!(browser.pages().await.expect("pages").len(), 3);
        assert_eq!(engine.state().last_spec(), Some(spec));
    }

    #[tokio::test]
    async fn test_pages_keep_creation_order() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let engine = MockEngine::with_initial_tabs(2);
        let spec = LaunchSpec::new(tmp.path().join("profile"), false);

        let browser = engine.launch(&spec).await.expect("launch");
        browser.new_page().await.expect("new page");

        let indices: Vec<usize> = browser
            .pages()
            .await
            .expect("pages")
            .iter()
            .map(|p| p.index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_closed_pages_disappear_from_listing() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let engine = MockEngine::with_initial_tabs(2);
        let spec = LaunchSpec::new(tmp.path().join("profile"), false);

        let browser = engine.launch(&spec).await.expect("launch");
        let pages = browser.pages().await.expect("pages");
        pages[1].close().await.expect("close page");

        assert_eq!(engine.state().open_page_indices(), vec![0]);
    }
}
