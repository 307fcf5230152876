//! Session launch options.
//!
//! Options that shape a session's launch sequence: display mode, the
//! page-open timeout, and the settle delay inserted before the tab count is
//! normalized.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default page-load timeout in seconds.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 10;

/// Default settle delay before tab normalization.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

// ============================================================================
// SessionOptions
// ============================================================================

/// Session launch configuration.
///
/// Controls how the browser is launched and how long lifecycle steps may
/// take. Path-related configuration lives on the session builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Run the browser without a GUI.
    pub headless: bool,

    /// Maximum time to wait for the initial page to open.
    pub page_load_timeout: Duration,

    /// Pause after launch so the browser's own initial tabs finish opening
    /// before the page count is checked.
    pub settle_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl SessionOptions {
    /// Creates a new options instance with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            headless: false,
            page_load_timeout: Duration::from_secs(DEFAULT_PAGE_LOAD_TIMEOUT_SECS),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Creates options configured for headless mode.
    #[inline]
    #[must_use]
    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::new()
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SessionOptions {
    /// Enables headless mode.
    #[inline]
    #[must_use]
    pub fn with_headless(mut self) -> Self {
        self.headless = true;
        self
    }

    /// Sets the page-load timeout.
    #[inline]
    #[must_use]
    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    /// Sets the settle delay applied before tab normalization.
    #[inline]
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl SessionOptions {
    /// Returns `true` if headless mode is enabled.
    #[inline]
    #[must_use]
    pub const fn is_headless(&self) -> bool {
        self.headless
    }

    /// Validates the options configuration.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.page_load_timeout.is_zero() {
            return Err("Page-load timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_default() {
        let options = SessionOptions::new();
        assert!(!options.headless);
        assert_eq!(options.page_load_timeout, Duration::from_secs(10));
        assert_eq!(options.settle_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_headless_constructor() {
        let options = SessionOptions::headless();
        assert!(options.is_headless());
        assert_eq!(options.page_load_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder_chain() {
        let options = SessionOptions::new()
            .with_headless()
            .with_page_load_timeout(Duration::from_secs(30))
            .with_settle_delay(Duration::from_millis(250));

        assert!(options.headless);
        assert_eq!(options.page_load_timeout, Duration::from_secs(30));
        assert_eq!(options.settle_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_validate_valid() {
        assert!(SessionOptions::new().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let options = SessionOptions::new().with_page_load_timeout(Duration::ZERO);
        assert!(options.validate().is_err());
    }
}
