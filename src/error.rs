//! Error types for chromium-session.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use chromium_session::{Result, Error};
//!
//! async fn example(session: &mut Session<ChromiumEngine>) -> Result<()> {
//!     session.try_start().await?;
//!     session.screenshot("landing").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::Profile`], [`Error::InvalidProfileName`] |
//! | Launch | [`Error::BrowserNotFound`], [`Error::ProcessLaunchFailed`], [`Error::Launch`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`] |
//! | Lifecycle | [`Error::NoActivePage`], [`Error::SessionActive`], [`Error::Cleanup`] |
//! | Execution | [`Error::Timeout`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging. The tagged
/// [`Error::Launch`] and [`Error::Cleanup`] wrappers let callers branch on
/// which phase of the session lifecycle failed.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when settings are missing or invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Profile error.
    ///
    /// Returned when profile or screenshot directory setup fails.
    #[error("Profile error: {message}")]
    Profile {
        /// Description of the profile error.
        message: String,
    },

    /// Profile name failed sanitization.
    ///
    /// Names containing path separators, `..` components, or absolute paths
    /// are rejected before any filesystem work.
    #[error("Invalid profile name: {name:?}")]
    InvalidProfileName {
        /// The rejected profile name.
        name: String,
    },

    // ========================================================================
    // Launch Errors
    // ========================================================================
    /// Browser binary not found at path.
    #[error("Browser not found at: {path}")]
    BrowserNotFound {
        /// Path where the browser was expected.
        path: PathBuf,
    },

    /// Failed to launch the browser process.
    #[error("Failed to launch browser: {message}")]
    ProcessLaunchFailed {
        /// Description of the launch failure.
        message: String,
    },

    /// The launch sequence failed.
    ///
    /// Tagged wrapper produced by `Session::try_start` so callers can
    /// distinguish a failed launch from a cleanup failure.
    #[error("Launch failed: {source}")]
    Launch {
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// DevTools connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// DevTools connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected response.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// No active page.
    ///
    /// Returned when a page operation (e.g. `screenshot`) is invoked before
    /// launch completes or after the session is closed.
    #[error("No active page")]
    NoActivePage,

    /// A browser is already active on this session.
    ///
    /// Returned when `start` is invoked while a previous launch is still
    /// alive. At most one browser handle exists per session.
    #[error("Session already has an active browser")]
    SessionActive,

    /// Browser teardown failed.
    ///
    /// Tagged wrapper produced by `Session::close`. Never fatal on the
    /// `start` path; callers of `close` can branch on it.
    #[error("Cleanup failed: {source}")]
    Cleanup {
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a profile error.
    #[inline]
    pub fn profile(message: impl Into<String>) -> Self {
        Self::Profile {
            message: message.into(),
        }
    }

    /// Creates an invalid profile name error.
    #[inline]
    pub fn invalid_profile_name(name: impl Into<String>) -> Self {
        Self::InvalidProfileName { name: name.into() }
    }

    /// Creates a browser not found error.
    #[inline]
    pub fn browser_not_found(path: impl Into<PathBuf>) -> Self {
        Self::BrowserNotFound { path: path.into() }
    }

    /// Creates a process launch failed error.
    #[inline]
    pub fn process_launch_failed(err: IoError) -> Self {
        Self::ProcessLaunchFailed {
            message: err.to_string(),
        }
    }

    /// Wraps a failure from the launch sequence.
    #[inline]
    pub fn launch(source: Error) -> Self {
        Self::Launch {
            source: Box::new(source),
        }
    }

    /// Wraps a failure from browser teardown.
    #[inline]
    pub fn cleanup(source: Error) -> Self {
        Self::Cleanup {
            source: Box::new(source),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this error came out of the launch sequence.
    #[inline]
    #[must_use]
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            Self::Launch { .. } | Self::ProcessLaunchFailed { .. } | Self::BrowserNotFound { .. }
        )
    }

    /// Returns `true` if this error came out of browser teardown.
    #[inline]
    #[must_use]
    pub fn is_cleanup_failure(&self) -> bool {
        matches!(self, Self::Cleanup { .. })
    }

    /// Returns `true` if this is a lifecycle precondition failure.
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NoActivePage | Self::SessionActive)
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
