//! Session management module.
//!
//! This module provides the session lifecycle core.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Session`] | Supervises one persistent browsing session |
//! | [`SessionBuilder`] | Fluent configuration builder |
//! | [`SessionOptions`] | Launch options (headless, timeouts) |
//! | [`SessionPaths`] | Derived profile and screenshot locations |
//!
//! # Example
//!
//! ```no_run
//! use chromium_session::{ChromiumEngine, Session};
//!
//! # async fn example() -> chromium_session::Result<()> {
//! let engine = ChromiumEngine::discover()?;
//! let mut session = Session::builder(engine).profile("alice").build()?;
//!
//! session.start().await;
//! session.screenshot("landing").await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for session configuration.
pub mod builder;

/// Core session lifecycle implementation.
pub mod core;

/// Session launch options.
pub mod options;

/// Path derivation and profile-name sanitization.
pub mod paths;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SessionBuilder;
pub use core::Session;
pub use options::SessionOptions;
pub use paths::{SessionPaths, sanitize_profile_name};
